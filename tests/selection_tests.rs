#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use morphogen::simulation::brain::Brain;
use morphogen::simulation::error::EvolutionError;
use morphogen::simulation::genome::Genome;
use morphogen::simulation::individual::Individual;
use morphogen::simulation::selection::{SelectionPolicy, rank, select, select_top};
use morphogen::simulation::stats::{EvolutionStats, GenerationStats};

fn scored(values: &[f32]) -> Vec<Individual> {
    values
        .iter()
        .map(|&f| Individual::with_fitness(Genome::starter(), Brain::new(), f))
        .collect()
}

#[test]
fn test_select_top_three() {
    let population = scored(&[5.0, 3.0, 3.0, 8.0, 1.0, 9.0, 2.0, 3.0, 7.0, 6.0]);

    let best = select_top(&population, 3).unwrap();
    let fitness: Vec<f32> = best.iter().filter_map(|i| i.fitness).collect();

    assert_eq!(fitness, vec![9.0, 8.0, 7.0]);
    assert_eq!(
        select(&population, SelectionPolicy::TopK(3)).unwrap(),
        vec![5, 3, 8]
    );
}

#[test]
fn test_ties_keep_population_order() {
    let population = scored(&[1.0, 2.0, 2.0, 2.0, 0.0]);

    assert_eq!(rank(&population).unwrap(), vec![1, 2, 3, 0, 4]);
    assert_eq!(
        select(&population, SelectionPolicy::TopK(2)).unwrap(),
        vec![1, 2]
    );
}

#[test]
fn test_top_k_larger_than_population() {
    let population = scored(&[1.0, 2.0]);

    assert_eq!(
        select(&population, SelectionPolicy::TopK(10)).unwrap(),
        vec![1, 0]
    );
}

#[test]
fn test_threshold_and_fraction_policies() {
    let population = scored(&[5.0, 3.0, 3.0, 8.0, 1.0, 9.0, 2.0, 3.0, 7.0, 6.0]);

    assert_eq!(
        select(&population, SelectionPolicy::Threshold(5.0)).unwrap(),
        vec![5, 3, 8, 9, 0]
    );
    assert!(
        select(&population, SelectionPolicy::Threshold(100.0))
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        select(&population, SelectionPolicy::TopFraction(0.25)).unwrap(),
        vec![5, 3, 8]
    );
    assert_eq!(
        select(&population, SelectionPolicy::TopFraction(0.01)).unwrap(),
        vec![5]
    );
}

#[test]
fn test_unevaluated_individual_is_rejected() {
    let mut population = scored(&[1.0, 2.0, 3.0]);
    population[1].fitness = None;

    assert_eq!(
        rank(&population),
        Err(EvolutionError::Unevaluated { index: 1 })
    );
}

#[test]
fn test_non_finite_fitness_is_rejected() {
    let population = scored(&[1.0, f32::NAN]);

    assert!(matches!(
        select_top(&population, 1),
        Err(EvolutionError::NonFiniteFitness { index: 1, .. })
    ));
}

#[test]
fn test_generation_summary_and_history() {
    let population = scored(&[2.0, 4.0, 6.0]);
    let summary = GenerationStats::summarize(3, &population, 2);

    assert_eq!(summary.generation, 3);
    assert_eq!(summary.best, 6.0);
    assert_eq!(summary.worst, 2.0);
    assert_eq!(summary.mean, 4.0);
    assert_eq!(summary.survivors, 2);
    assert_eq!(summary.mean_rules, 5.0);

    let mut stats = EvolutionStats::new(2);
    for (generation, best) in [(0, 1.0), (1, 5.0), (2, 3.0)] {
        let mut s = summary.clone();
        s.generation = generation;
        s.best = best;
        stats.record(s);
    }

    assert_eq!(stats.history.len(), 2);
    assert_eq!(stats.latest().map(|s| s.generation), Some(2));
    assert_eq!(stats.best_ever(), Some(5.0));
    assert_eq!(stats.improvement(), -2.0);
}

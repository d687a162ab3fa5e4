//! Building the next generation from ranked survivors.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use super::brain::Brain;
use super::individual::Individual;
use super::mutation::{crossover_genomes, mutate_genome};
use super::params::Params;

/// Fills a new population of `params.population_size` from `survivors`.
///
/// With elitism the survivors come first, copied unchanged (fitness cleared).
/// Every remaining slot is an offspring of a uniformly chosen survivor, or of
/// two survivors with probability `crossover_rate`. Offspring brains are
/// always mutated with `brain_mutation`; genomes only when `mutate_genomes`
/// is set, otherwise they pass through untouched.
///
/// Returns an empty vector if there are no survivors.
pub fn next_generation<R: Rng + ?Sized>(
    survivors: &[Individual],
    params: &Params,
    rng: &mut R,
) -> Vec<Individual> {
    let size = params.population_size;
    let mut next = Vec::with_capacity(size);
    if survivors.is_empty() {
        return next;
    }

    if params.elitism {
        next.extend(survivors.iter().take(size).map(Individual::offspring));
    }

    let mut crossovers = 0usize;
    while next.len() < size {
        let child = if survivors.len() >= 2 && rng.random::<f32>() < params.crossover_rate {
            crossovers += 1;
            crossover_child(survivors, params, rng)
        } else {
            clone_child(survivors, params, rng)
        };
        next.push(child);
    }

    debug!(
        survivors = survivors.len(),
        offspring = next.len(),
        crossovers,
        "next generation built"
    );
    next
}

fn clone_child<R: Rng + ?Sized>(survivors: &[Individual], params: &Params, rng: &mut R) -> Individual {
    let idx = rng.random_range(0..survivors.len());
    let mut child = survivors[idx].offspring();
    mutate_child(&mut child, params, rng);
    child
}

fn crossover_child<R: Rng + ?Sized>(survivors: &[Individual], params: &Params, rng: &mut R) -> Individual {
    let mut parents = survivors.choose_multiple(rng, 2);
    let (Some(parent1), Some(parent2)) = (parents.next(), parents.next()) else {
        return clone_child(survivors, params, rng);
    };

    let weight1 = rng.random::<f32>();
    let brain = Brain::crossover(&parent1.brain, &parent2.brain, weight1);
    let genome = if params.mutate_genomes {
        crossover_genomes(&parent1.genome, &parent2.genome, rng)
    } else {
        parent1.genome.clone()
    };

    let mut child = Individual::new(genome, brain);
    mutate_child(&mut child, params, rng);
    child
}

fn mutate_child<R: Rng + ?Sized>(child: &mut Individual, params: &Params, rng: &mut R) {
    child.brain.mutate(&params.brain_mutation, rng);
    if params.mutate_genomes {
        child.genome = mutate_genome(&child.genome, &params.genome_mutation, rng);
    }
}

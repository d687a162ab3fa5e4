//! Generational loop: evaluate, select, reproduce.
//!
//! A generation must be fully evaluated before [`Evolution::advance`] will
//! build the next one. Evaluation grows every individual's organism in
//! parallel; organisms share nothing, so each rayon task owns its organism
//! exclusively for the whole growth run.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{info, warn};

use super::brain::Brain;
use super::error::EvolutionError;
use super::growth::GrowthEngine;
use super::individual::Individual;
use super::organism::Organism;
use super::params::Params;
use super::population::Population;
use super::reproduction;
use super::selection;
use super::stats::{EvolutionStats, GenerationStats};

/// Drives a population through generations.
#[derive(Debug, Clone)]
pub struct Evolution {
    params: Params,
    engine: GrowthEngine,
    population: Population,
    stats: EvolutionStats,
    rng: StdRng,
}

impl Evolution {
    /// Seeds generation zero from the starter genome.
    pub fn new(params: Params) -> Result<Self, EvolutionError> {
        checked(&params)?;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let population = Population::seed(&params, &mut rng)?;
        Ok(Self::assemble(params, population, rng))
    }

    /// Continues from an existing population, e.g. one loaded from disk.
    pub fn from_population(params: Params, population: Population) -> Result<Self, EvolutionError> {
        checked(&params)?;
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        // mix in the generation so a resumed run does not replay generation zero
        let rng = StdRng::seed_from_u64(params.seed ^ u64::from(population.generation));
        Ok(Self::assemble(params, population, rng))
    }

    fn assemble(params: Params, population: Population, rng: StdRng) -> Self {
        Self {
            engine: params.engine(),
            stats: EvolutionStats::new(params.history),
            params,
            population,
            rng,
        }
    }

    /// Parameters of the run.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Mutable access, for assigning fitness from outside.
    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    /// Generation summaries so far.
    pub fn stats(&self) -> &EvolutionStats {
        &self.stats
    }

    /// Current generation number.
    pub fn generation(&self) -> u32 {
        self.population.generation
    }

    /// Grows one organism per individual for `params.growth_ticks`.
    ///
    /// Organism ids are population indices. Runs in parallel; the result is
    /// identical to a sequential run because growth is deterministic.
    pub fn develop_all(&self) -> Result<Vec<Organism>, EvolutionError> {
        let engine = &self.engine;
        let params = &self.params;
        self.population
            .individuals
            .par_iter()
            .enumerate()
            .map(|(index, individual)| develop(index, individual, engine, params))
            .collect()
    }

    /// Grows every organism and scores it with `fitness`.
    ///
    /// With `rebind_after_growth` each brain is also bound to the grown body's
    /// ports and the bound brain replaces the individual's brain.
    pub fn evaluate<F>(&mut self, fitness: F) -> Result<(), EvolutionError>
    where
        F: Fn(&Organism, &Brain) -> f32 + Sync,
    {
        let engine = &self.engine;
        let params = &self.params;
        let scored: Vec<(f32, Option<Brain>)> = self
            .population
            .individuals
            .par_iter()
            .enumerate()
            .map(|(index, individual)| -> Result<(f32, Option<Brain>), EvolutionError> {
                let organism = develop(index, individual, engine, params)?;
                if params.rebind_after_growth {
                    let mut brain = individual.brain.clone();
                    brain.bind(&organism.ports());
                    Ok((fitness(&organism, &brain), Some(brain)))
                } else {
                    Ok((fitness(&organism, &individual.brain), None))
                }
            })
            .collect::<Result<_, _>>()?;

        for (individual, (score, brain)) in self.population.individuals.iter_mut().zip(scored) {
            individual.set_fitness(score);
            if let Some(brain) = brain {
                individual.brain = brain;
            }
        }
        Ok(())
    }

    /// Ranks the evaluated population, records statistics and replaces it
    /// with the next generation.
    pub fn advance(&mut self) -> Result<&GenerationStats, EvolutionError> {
        if let Some(index) = self
            .population
            .individuals
            .iter()
            .position(|i| !i.is_evaluated())
        {
            warn!(
                generation = self.population.generation,
                index, "advance called before evaluation finished"
            );
            return Err(EvolutionError::Unevaluated { index });
        }

        let ranked = selection::select(&self.population.individuals, self.params.selection)?;
        if ranked.is_empty() {
            return Err(EvolutionError::NoSurvivors);
        }
        let survivors: Vec<Individual> = ranked
            .iter()
            .map(|&idx| self.population.individuals[idx].clone())
            .collect();

        let summary = GenerationStats::summarize(
            self.population.generation,
            &self.population.individuals,
            survivors.len(),
        );
        info!(
            generation = summary.generation,
            best = summary.best,
            mean = summary.mean,
            survivors = summary.survivors,
            mean_rules = summary.mean_rules,
            "generation complete"
        );
        self.stats.record(summary);

        let next = reproduction::next_generation(&survivors, &self.params, &mut self.rng);
        self.population.replace(next);

        self.stats
            .latest()
            .ok_or(EvolutionError::EmptyPopulation)
    }

    /// Evaluates the current generation and advances to the next.
    pub fn run_generation<F>(&mut self, fitness: F) -> Result<&GenerationStats, EvolutionError>
    where
        F: Fn(&Organism, &Brain) -> f32 + Sync,
    {
        self.evaluate(fitness)?;
        self.advance()
    }
}

fn checked(params: &Params) -> Result<(), EvolutionError> {
    params.validate().inspect_err(|err| warn!(%err, "rejected parameters"))
}

fn develop(
    index: usize,
    individual: &Individual,
    engine: &GrowthEngine,
    params: &Params,
) -> Result<Organism, EvolutionError> {
    let mut organism = individual.develop(index, params.initial_energy);
    organism
        .grow_for(engine, params.growth_ticks)
        .map_err(|source| EvolutionError::Growth { index, source })?;
    Ok(organism)
}

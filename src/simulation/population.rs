//! A generation of individuals.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::brain::Brain;
use super::error::{EvolutionError, PersistError};
use super::genome::Genome;
use super::individual::Individual;
use super::organism::Organism;
use super::params::Params;

/// All individuals of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Generation counter, zero for the seeded population.
    pub generation: u32,
    /// Individuals in population order.
    pub individuals: Vec<Individual>,
}

impl Population {
    /// Wraps a list of individuals as generation zero.
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self {
            generation: 0,
            individuals,
        }
    }

    /// Seeds generation zero from the starter genome.
    ///
    /// A prototype organism is grown for `params.growth_ticks` first so every
    /// starter brain is wired to the body the starter genome actually
    /// produces. Brains differ only in their random hidden biases.
    pub fn seed<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<Self, EvolutionError> {
        let genome = Genome::starter();
        let mut prototype = Organism::new(0, genome.clone(), params.initial_energy);
        prototype
            .grow_for(&params.engine(), params.growth_ticks)
            .map_err(|source| EvolutionError::Growth { index: 0, source })?;
        let ports = prototype.ports();

        let individuals = (0..params.population_size)
            .map(|_| Individual::new(genome.clone(), Brain::starter(&ports, rng)))
            .collect();
        Ok(Self::new(individuals))
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Returns `true` if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Returns `true` once every individual has a fitness.
    pub fn is_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    /// Assigns one fitness value per individual, in population order.
    pub fn assign_fitness(&mut self, values: &[f32]) -> Result<(), EvolutionError> {
        if values.len() != self.individuals.len() {
            return Err(EvolutionError::FitnessCount {
                expected: self.individuals.len(),
                got: values.len(),
            });
        }
        for (individual, &value) in self.individuals.iter_mut().zip(values) {
            individual.set_fitness(value);
        }
        Ok(())
    }

    /// Replaces the individuals with the next generation.
    pub fn replace(&mut self, next: Vec<Individual>) {
        self.individuals = next;
        self.generation += 1;
    }

    /// Writes the population as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a population from JSON.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

//! The unit of selection: a genome and a brain plus a fitness score.

use serde::{Deserialize, Serialize};

use super::brain::Brain;
use super::genome::Genome;
use super::organism::Organism;

/// One evolvable (genome, brain) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Growth rules for the body.
    pub genome: Genome,
    /// Controller wired to the body's ports.
    pub brain: Brain,
    /// Externally supplied score; `None` until evaluated.
    pub fitness: Option<f32>,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(genome: Genome, brain: Brain) -> Self {
        Self {
            genome,
            brain,
            fitness: None,
        }
    }

    /// Creates an individual with a known fitness.
    pub fn with_fitness(genome: Genome, brain: Brain, fitness: f32) -> Self {
        Self {
            genome,
            brain,
            fitness: Some(fitness),
        }
    }

    /// Records the fitness for this generation.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }

    /// Returns `true` once a fitness has been assigned.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// An unevaluated copy for the next generation.
    #[must_use]
    pub fn offspring(&self) -> Self {
        Self::new(self.genome.clone(), self.brain.clone())
    }

    /// Spawns a fresh organism from this individual's genome: a lone core at
    /// the origin, age zero and no cooldown history.
    pub fn develop(&self, id: usize, energy: f32) -> Organism {
        Organism::new(id, self.genome.clone(), energy)
    }
}

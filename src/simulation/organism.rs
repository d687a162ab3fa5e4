//! Organism state: a body graph, the genome that grows it, an energy pool and
//! an age counter.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::body::{BodyGraph, BodyPorts};
use super::error::GrowthError;
use super::genome::Genome;
use super::growth::{GrowthEngine, GrowthOutcome};
use super::schedule::GrowthState;

/// A growing organism.
///
/// Owns exactly one body, one genome and one energy pool. All energy debits go
/// through [`Organism::try_spend`], so the pool never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    /// Identifier, unique within a population.
    pub id: usize,
    /// Physical form.
    pub body: BodyGraph,
    /// Growth rules; read-only while the organism lives.
    pub genome: Genome,
    /// Age in ticks.
    pub age: u64,
    /// Per-rule cooldown bookkeeping.
    pub growth: GrowthState,
    energy: f32,
}

impl Organism {
    /// Creates an organism with only a core node at the origin.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier
    /// * `genome` - Growth rules
    /// * `energy` - Starting energy; negative values are clamped to zero
    pub fn new(id: usize, genome: Genome, energy: f32) -> Self {
        Self::with_body(id, genome, energy, BodyGraph::at_origin())
    }

    /// Creates an organism with the core at `pos`.
    pub fn at(id: usize, genome: Genome, energy: f32, pos: Array1<f32>) -> Self {
        Self::with_body(id, genome, energy, BodyGraph::new(pos))
    }

    /// Creates an organism around an existing body.
    pub fn with_body(id: usize, genome: Genome, energy: f32, body: BodyGraph) -> Self {
        Self {
            id,
            body,
            genome,
            age: 0,
            growth: GrowthState::new(),
            energy: energy.max(0.0),
        }
    }

    /// Current energy.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Checks if the organism still has energy.
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// Deducts `amount` if the pool covers it.
    ///
    /// Returns `false` and leaves the pool untouched otherwise.
    pub fn try_spend(&mut self, amount: f32) -> bool {
        if amount < 0.0 || amount > self.energy {
            return false;
        }
        self.energy -= amount;
        true
    }

    /// Increases energy up to `max_energy`.
    pub fn gain_energy(&mut self, amount: f32, max_energy: f32) {
        self.energy = (self.energy + amount.max(0.0)).min(max_energy);
    }

    /// Identifiers the brain binds to.
    pub fn ports(&self) -> BodyPorts {
        self.body.ports()
    }

    /// Advances the organism by one tick: age first, then one growth step.
    pub fn step(&mut self, engine: &GrowthEngine) -> Result<GrowthOutcome, GrowthError> {
        self.age += 1;
        engine.tick(self)
    }

    /// Runs `ticks` steps and returns how many of them grew something.
    pub fn grow_for(&mut self, engine: &GrowthEngine, ticks: u64) -> Result<usize, GrowthError> {
        let mut grown = 0;
        for _ in 0..ticks {
            if self.step(engine)?.grew() {
                grown += 1;
            }
        }
        Ok(grown)
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::anchor::AnchorMode;
use super::error::{EvolutionError, PersistError};
use super::growth::{GrowthEngine, MAX_ATTEMPTS};
use super::mutation::{BrainMutation, GenomeMutation};
use super::schedule::SchedulePolicy;
use super::selection::SelectionPolicy;

/// Simulation parameters that control growth and evolution.
///
/// Missing fields in a JSON file fall back to [`Params::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Individuals per generation.
    pub population_size: usize,
    /// Survivor selection policy.
    pub selection: SelectionPolicy,
    /// Energy each organism starts its evaluation with.
    pub initial_energy: f32,
    /// Growth ticks run per organism before fitness is measured.
    pub growth_ticks: u64,
    /// Growth attempts per tick.
    pub max_attempts: u32,
    /// Rule scheduling policy.
    pub schedule: SchedulePolicy,
    /// Anchor interpretation.
    pub anchors: AnchorMode,
    /// Brain mutation rate and magnitude.
    pub brain_mutation: BrainMutation,
    /// Genome mutation rates and magnitudes; used only with `mutate_genomes`.
    pub genome_mutation: GenomeMutation,
    /// Mutate genomes of offspring as well as brains.
    /// Off by default: morphology is then inherited unchanged.
    pub mutate_genomes: bool,
    /// Probability that an offspring comes from two survivors instead of one.
    pub crossover_rate: f32,
    /// Carry survivors over unchanged before filling with offspring.
    pub elitism: bool,
    /// Bind new actuator/sensor nodes into the brain after growth.
    pub rebind_after_growth: bool,
    /// Seed for every random draw of a run.
    pub seed: u64,
    /// Generations of statistics kept in memory.
    pub history: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 25,
            selection: SelectionPolicy::TopK(5),
            initial_energy: 16.0,
            growth_ticks: 120,
            max_attempts: MAX_ATTEMPTS,
            schedule: SchedulePolicy::DeterministicKey,
            anchors: AnchorMode::CoreOnly,
            brain_mutation: BrainMutation::default(),
            genome_mutation: GenomeMutation::default(),
            mutate_genomes: false,
            crossover_rate: 0.0,
            elitism: true,
            rebind_after_growth: false,
            seed: 0xFACA_DE00_0123_4567,
            history: 100,
        }
    }
}

impl Params {
    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        let invalid = |msg: String| Err(EvolutionError::InvalidParams(msg));
        let probability = |p: f32| (0.0..=1.0).contains(&p);

        if self.population_size == 0 {
            return invalid("population_size must be positive".into());
        }
        match self.selection {
            SelectionPolicy::TopK(0) => return invalid("selection keeps no survivors".into()),
            SelectionPolicy::TopFraction(f) if !(f > 0.0 && f <= 1.0) => {
                return invalid(format!("selection fraction {f} outside (0, 1]"));
            }
            SelectionPolicy::Threshold(t) if !t.is_finite() => {
                return invalid(format!("selection threshold {t} is not finite"));
            }
            _ => {}
        }
        if !(self.initial_energy.is_finite() && self.initial_energy >= 0.0) {
            return invalid(format!("initial_energy {} must be non-negative", self.initial_energy));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be positive".into());
        }
        if self.history == 0 {
            return invalid("history must keep at least one generation".into());
        }
        let brain = &self.brain_mutation;
        let genome = &self.genome_mutation;
        for (name, p) in [
            ("brain_mutation.p_weight", brain.p_weight),
            ("brain_mutation.p_bias", brain.p_bias),
            ("genome_mutation.p_jitter", genome.p_jitter),
            ("genome_mutation.p_add_rule", genome.p_add_rule),
            ("genome_mutation.p_remove_rule", genome.p_remove_rule),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !probability(p) {
                return invalid(format!("{name} = {p} is not a probability"));
            }
        }
        if !(brain.sigma.is_finite() && brain.sigma >= 0.0) {
            return invalid(format!("brain_mutation.sigma {} must be non-negative", brain.sigma));
        }
        Ok(())
    }

    /// Growth engine configured from these parameters.
    pub fn engine(&self) -> GrowthEngine {
        GrowthEngine {
            schedule: self.schedule,
            anchors: self.anchors,
            max_attempts: self.max_attempts,
        }
    }

    /// Writes the parameters as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads parameters from JSON.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

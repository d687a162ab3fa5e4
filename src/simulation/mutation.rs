//! Mutation and crossover operators for brains and genomes.
//!
//! Genome operators never modify their input; they return a fresh genome so
//! the parent generation stays intact. Every operator keeps the invariants
//! the growth engine relies on: at least one rule, non-empty templates,
//! positive lengths and a non-negative cost.

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::genome::{AnchorSelector, Genome, GrowthRule};

/// Extra jitter applied to a duplicated rule so it diverges from its source.
pub const CLONE_JITTER_SCALE: f32 = 1.4;

/// Lower bounds kept by genome jitter.
const MIN_LENGTH: f32 = 4.0;
const MIN_RADIUS: f32 = 1.0;
const MIN_COST: f32 = 0.05;
const MIN_COOLDOWN: u64 = 1;

/// Brain mutation rate and magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainMutation {
    /// Per-synapse probability of perturbing the weight.
    pub p_weight: f32,
    /// Per-hidden-neuron probability of perturbing the bias.
    pub p_bias: f32,
    /// Standard deviation of the Gaussian perturbation.
    pub sigma: f32,
}

impl BrainMutation {
    /// Mutation that changes nothing.
    pub fn off() -> Self {
        Self {
            p_weight: 0.0,
            p_bias: 0.0,
            sigma: 0.0,
        }
    }

    /// Returns `true` if applying this mutation cannot change a brain.
    pub fn is_noop(&self) -> bool {
        (self.p_weight <= 0.0 && self.p_bias <= 0.0) || self.sigma <= 0.0
    }
}

impl Default for BrainMutation {
    fn default() -> Self {
        Self {
            p_weight: 0.12,
            p_bias: 0.10,
            sigma: 0.30,
        }
    }
}

/// Genome mutation rates and magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeMutation {
    /// Per-rule probability of jittering its parameters.
    pub p_jitter: f32,
    /// Probability of duplicating a rule with a fresh anchor.
    pub p_add_rule: f32,
    /// Probability of dropping a rule (never the last one).
    pub p_remove_rule: f32,
    /// Bud angle noise, radians.
    pub angle_sigma: f32,
    /// Bud length noise.
    pub length_sigma: f32,
    /// Bud radius noise.
    pub radius_sigma: f32,
    /// Rule cost noise.
    pub cost_sigma: f32,
    /// Rule cooldown noise, ticks.
    pub cooldown_sigma: f32,
    /// Global energy threshold noise.
    pub threshold_sigma: f32,
    /// Global growth interval noise, ticks.
    pub interval_sigma: f32,
}

impl GenomeMutation {
    /// Mutation that changes nothing.
    pub fn off() -> Self {
        Self {
            p_jitter: 0.0,
            p_add_rule: 0.0,
            p_remove_rule: 0.0,
            angle_sigma: 0.0,
            length_sigma: 0.0,
            radius_sigma: 0.0,
            cost_sigma: 0.0,
            cooldown_sigma: 0.0,
            threshold_sigma: 0.0,
            interval_sigma: 0.0,
        }
    }
}

impl Default for GenomeMutation {
    fn default() -> Self {
        Self {
            p_jitter: 0.35,
            p_add_rule: 0.12,
            p_remove_rule: 0.10,
            angle_sigma: 0.18,
            length_sigma: 6.0,
            radius_sigma: 0.6,
            cost_sigma: 0.25,
            cooldown_sigma: 2.0,
            threshold_sigma: 0.4,
            interval_sigma: 1.5,
        }
    }
}

/// Draws from `N(0, sigma)`; zero for a non-positive or non-finite sigma.
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, sigma: f32) -> f32 {
    if !(sigma.is_finite() && sigma > 0.0) {
        return 0.0;
    }
    Normal::new(0.0, sigma).map_or(0.0, |normal| normal.sample(rng))
}

fn jitter_ticks<R: Rng + ?Sized>(rng: &mut R, ticks: u64, sigma: f32, min: u64) -> u64 {
    let jittered = (ticks as f32 + gauss(rng, sigma)).round();
    (jittered.max(0.0) as u64).max(min)
}

fn jitter_rule<R: Rng + ?Sized>(rule: &mut GrowthRule, params: &GenomeMutation, scale: f32, rng: &mut R) {
    for bud in &mut rule.template {
        bud.angle += gauss(rng, params.angle_sigma * scale);
        if let Some(length) = bud.length.as_mut() {
            *length = (*length + gauss(rng, params.length_sigma * scale)).max(MIN_LENGTH);
        }
        if let Some(radius) = bud.radius.as_mut() {
            *radius = (*radius + gauss(rng, params.radius_sigma * scale)).max(MIN_RADIUS);
        }
    }
    rule.cost = (rule.cost + gauss(rng, params.cost_sigma * scale)).max(MIN_COST);
    rule.cooldown = jitter_ticks(rng, rule.cooldown, params.cooldown_sigma * scale, MIN_COOLDOWN);
}

/// Returns a mutated copy of `genome`.
///
/// In order: jitter each rule with probability `p_jitter`, drop one rule with
/// probability `p_remove_rule`, duplicate one rule with a random anchor with
/// probability `p_add_rule`, then nudge the global growth gates.
pub fn mutate_genome<R: Rng + ?Sized>(genome: &Genome, params: &GenomeMutation, rng: &mut R) -> Genome {
    let mut mutated = genome.clone();

    for rule in &mut mutated.rules {
        if rng.random::<f32>() < params.p_jitter {
            jitter_rule(rule, params, 1.0, rng);
        }
    }

    if mutated.rules.len() > 1 && rng.random::<f32>() < params.p_remove_rule {
        let idx = rng.random_range(0..mutated.rules.len());
        mutated.rules.remove(idx);
    }

    if rng.random::<f32>() < params.p_add_rule {
        if let Some(parent) = mutated.rules.choose(rng).cloned() {
            let mut clone = parent;
            if let Some(&anchor) = AnchorSelector::ALL.choose(rng) {
                clone.anchor = anchor;
            }
            jitter_rule(&mut clone, params, CLONE_JITTER_SCALE, rng);
            mutated.rules.push(clone);
        }
    }

    let defaults = &mut mutated.defaults;
    defaults.energy_threshold = (defaults.energy_threshold + gauss(rng, params.threshold_sigma)).max(0.0);
    defaults.interval = jitter_ticks(rng, defaults.interval, params.interval_sigma, 0);

    mutated
}

/// Builds a child genome by picking each rule position from either parent.
///
/// Positions present in only the longer parent are inherited with even odds.
/// Growth defaults come whole from one parent.
pub fn crossover_genomes<R: Rng + ?Sized>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> Genome {
    let longest = parent1.rules.len().max(parent2.rules.len());
    let mut rules = Vec::with_capacity(longest);

    for idx in 0..longest {
        let pick = match (parent1.rules.get(idx), parent2.rules.get(idx)) {
            (Some(a), Some(b)) => Some(if rng.random::<bool>() { a } else { b }),
            (Some(only), None) | (None, Some(only)) => rng.random::<bool>().then_some(only),
            (None, None) => None,
        };
        if let Some(rule) = pick {
            rules.push(rule.clone());
        }
    }
    if rules.is_empty() {
        // only possible when a parent has no rules at all
        return if parent1.rules.is_empty() {
            parent2.clone()
        } else {
            parent1.clone()
        };
    }

    let defaults = if rng.random::<bool>() {
        parent1.defaults.clone()
    } else {
        parent2.defaults.clone()
    };
    Genome { rules, defaults }
}

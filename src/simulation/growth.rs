//! Growth engine: decides which rule fires on a tick and applies it.
//!
//! One tick runs at most one rule. The engine derives a selection key from the
//! organism's age and the attempt number, lets the [`SchedulePolicy`] turn it
//! into a candidate rule and validates that candidate. A failed candidate costs
//! one attempt; after [`MAX_ATTEMPTS`] the tick ends without growth.
//!
//! Not growing is never an error. Errors are reserved for genomes or bodies
//! that break their own invariants.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::anchor::AnchorMode;
use super::body::{BudSpec, NodeId};
use super::error::GrowthError;
use super::organism::Organism;
use super::schedule::{SchedulePolicy, selection_key};

/// Attempts per tick before the engine gives up.
pub const MAX_ATTEMPTS: u32 = 6;

/// Why a tick produced no growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdleReason {
    /// Energy below the genome's global growth threshold.
    BelowEnergyThreshold,
    /// The genome's global growth interval has not elapsed.
    IntervalActive,
    /// Every attempt hit a rule that was cooling down, not triggered,
    /// unanchored or unaffordable.
    NoValidRule,
}

/// A rule that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    /// Index of the rule in the genome.
    pub rule: usize,
    /// Node the template attached to.
    pub anchor: NodeId,
    /// Nodes created, in template order.
    pub nodes: Vec<NodeId>,
    /// Energy deducted.
    pub cost: f32,
    /// Attempt on which the rule validated.
    pub attempt: u32,
}

/// Result of one growth tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrowthOutcome {
    /// A rule fired.
    Grew(Growth),
    /// Nothing happened.
    Idle(IdleReason),
}

impl GrowthOutcome {
    /// Returns `true` if a rule fired.
    pub fn grew(&self) -> bool {
        matches!(self, GrowthOutcome::Grew(_))
    }

    /// Energy spent this tick.
    pub fn cost(&self) -> f32 {
        match self {
            GrowthOutcome::Grew(growth) => growth.cost,
            GrowthOutcome::Idle(_) => 0.0,
        }
    }
}

/// Rule scheduler plus anchor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthEngine {
    /// Candidate selection policy.
    pub schedule: SchedulePolicy,
    /// Anchor interpretation.
    pub anchors: AnchorMode,
    /// Attempts per tick.
    pub max_attempts: u32,
}

impl Default for GrowthEngine {
    fn default() -> Self {
        Self {
            schedule: SchedulePolicy::DeterministicKey,
            anchors: AnchorMode::CoreOnly,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl GrowthEngine {
    /// Creates an engine with the given strategies.
    pub fn new(schedule: SchedulePolicy, anchors: AnchorMode) -> Self {
        Self {
            schedule,
            anchors,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Runs one growth step on `organism` at its current age.
    ///
    /// # Returns
    ///
    /// `Ok(Grew)` if a rule fired, `Ok(Idle)` if none could. Errors only for a
    /// malformed genome or body.
    pub fn tick(&self, organism: &mut Organism) -> Result<GrowthOutcome, GrowthError> {
        organism.genome.validate()?;
        organism.body.validate()?;

        let age = organism.age;
        let energy = organism.energy();
        let defaults = &organism.genome.defaults;

        if energy < defaults.energy_threshold {
            return Ok(GrowthOutcome::Idle(IdleReason::BelowEnergyThreshold));
        }
        if !organism.growth.interval_elapsed(defaults.interval, age) {
            return Ok(GrowthOutcome::Idle(IdleReason::IntervalActive));
        }

        let rule_count = organism.genome.len();
        for attempt in 0..self.max_attempts {
            let key = selection_key(age, attempt);
            let index = self.schedule.pick(key, rule_count, &organism.growth, age)?;
            let rule = organism
                .genome
                .rule(index)
                .ok_or(GrowthError::RuleOutOfRange {
                    index,
                    len: rule_count,
                })?;

            if !organism.growth.cooldown_elapsed(index, rule.cooldown, age) {
                trace!(organism = organism.id, rule = index, attempt, "cooling down");
                continue;
            }
            if !rule.trigger.holds(age, energy) {
                trace!(organism = organism.id, rule = index, attempt, "trigger not met");
                continue;
            }
            let Some(anchor) = self.anchors.resolve(rule.anchor, &organism.body, key)? else {
                trace!(organism = organism.id, rule = index, attempt, "no anchor");
                continue;
            };
            if energy < rule.cost {
                trace!(organism = organism.id, rule = index, attempt, "cannot afford");
                continue;
            }

            let mut nodes = Vec::with_capacity(rule.template.len());
            for bud in &rule.template {
                let parent = match nodes.last() {
                    Some(&previous) if bud.chain => previous,
                    _ => anchor,
                };
                let (length, radius) = organism.genome.resolve(bud);
                let spec = BudSpec {
                    role: bud.role,
                    angle_offset: bud.angle,
                    length,
                    radius,
                };
                nodes.push(organism.body.bud(parent, spec, age)?);
            }

            let cost = rule.cost;
            // affordability was checked above and the tick owns the pool
            let spent = organism.try_spend(cost);
            debug_assert!(spent, "energy pool changed during a growth tick");
            organism.growth.record(index, age);

            debug!(
                organism = organism.id,
                age,
                rule = index,
                anchor = %anchor,
                added = nodes.len(),
                cost,
                "rule fired"
            );
            return Ok(GrowthOutcome::Grew(Growth {
                rule: index,
                anchor,
                nodes,
                cost,
                attempt,
            }));
        }

        Ok(GrowthOutcome::Idle(IdleReason::NoValidRule))
    }
}

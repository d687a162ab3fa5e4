//! Rule scheduling and per-organism cooldown bookkeeping.
//!
//! Which rule an organism tries on a given tick is a pure function of its age,
//! the attempt number and (for the recency policy) its own firing history, so a
//! growth run can be replayed exactly.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::error::{GenomeError, GrowthError};

/// Weight ceiling for the recency policy; a rule idle for this many ticks is
/// as likely as one that never fired.
pub const RECENCY_CAP: u64 = 64;

/// Mixes `(age, attempt)` into a well-distributed 64-bit key.
///
/// Uses the splitmix64 finalizer, so the value is stable across platforms,
/// compiler versions and runs.
pub fn selection_key(age: u64, attempt: u32) -> u64 {
    let mut z = age
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(u64::from(attempt).wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// How a candidate rule index is drawn from the selection key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePolicy {
    /// `key % rule_count`. Cheap and reproducible, but some rules can be
    /// starved for long stretches of ages.
    #[default]
    DeterministicKey,
    /// Weighted draw seeded by the key, favouring rules that have not fired
    /// recently.
    WeightedRecency,
}

impl SchedulePolicy {
    /// Picks a candidate rule index in `0..rule_count`.
    pub fn pick(
        self,
        key: u64,
        rule_count: usize,
        state: &GrowthState,
        age: u64,
    ) -> Result<usize, GrowthError> {
        if rule_count == 0 {
            return Err(GenomeError::NoRules.into());
        }
        let by_key = (key % rule_count as u64) as usize;

        match self {
            SchedulePolicy::DeterministicKey => Ok(by_key),
            SchedulePolicy::WeightedRecency => {
                let weights = (0..rule_count).map(|index| {
                    state
                        .ticks_since_fired(index, age)
                        .map_or(RECENCY_CAP, |idle| idle.min(RECENCY_CAP))
                        + 1
                });
                let Ok(dist) = WeightedIndex::new(weights) else {
                    return Ok(by_key);
                };
                let mut rng = StdRng::seed_from_u64(key);
                Ok(dist.sample(&mut rng))
            }
        }
    }
}

/// Per-organism growth history.
///
/// Keyed by rule index; a fresh organism starts with an empty history so
/// duplicated rules in a new genome never inherit a cooldown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthState {
    last_fired: BTreeMap<usize, u64>,
    last_growth: Option<u64>,
    firings: u64,
}

impl GrowthState {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Age at which rule `index` last fired.
    pub fn last_fired(&self, index: usize) -> Option<u64> {
        self.last_fired.get(&index).copied()
    }

    /// Ticks since rule `index` last fired, or `None` if it never has.
    pub fn ticks_since_fired(&self, index: usize, age: u64) -> Option<u64> {
        self.last_fired(index).map(|at| age.saturating_sub(at))
    }

    /// Returns `true` if rule `index` may fire again at `age`.
    pub fn cooldown_elapsed(&self, index: usize, cooldown: u64, age: u64) -> bool {
        match self.last_fired(index) {
            None => true,
            Some(at) => age >= at && age - at >= cooldown,
        }
    }

    /// Returns `true` if at least `interval` ticks have passed since the
    /// organism last grew anything.
    pub fn interval_elapsed(&self, interval: u64, age: u64) -> bool {
        match self.last_growth {
            None => true,
            Some(at) => age >= at && age - at >= interval,
        }
    }

    /// Records a firing of rule `index` at `age`.
    pub fn record(&mut self, index: usize, age: u64) {
        self.last_fired.insert(index, age);
        self.last_growth = Some(age);
        self.firings += 1;
    }

    /// Total number of firings recorded.
    pub fn firings(&self) -> u64 {
        self.firings
    }
}

//! Fitness ranking and survivor selection.
//!
//! Ranking is a stable sort on fitness, highest first, so individuals with
//! equal fitness keep their population order. That makes survivor lists
//! reproducible across runs.

use serde::{Deserialize, Serialize};

use super::error::EvolutionError;
use super::individual::Individual;

/// How many ranked individuals survive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// The best `k` individuals.
    TopK(usize),
    /// Every individual with fitness at or above the threshold.
    Threshold(f32),
    /// The best fraction of the population, rounded up, at least one.
    TopFraction(f32),
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::TopK(5)
    }
}

/// Population indices ordered by fitness, highest first, ties by index.
///
/// Fails if any individual is unevaluated or has a non-finite fitness.
pub fn rank(population: &[Individual]) -> Result<Vec<usize>, EvolutionError> {
    let mut scored = Vec::with_capacity(population.len());
    for (index, individual) in population.iter().enumerate() {
        let fitness = individual
            .fitness
            .ok_or(EvolutionError::Unevaluated { index })?;
        if !fitness.is_finite() {
            return Err(EvolutionError::NonFiniteFitness { index, fitness });
        }
        scored.push((index, fitness));
    }
    // sort_by is stable: equal fitness keeps ascending index
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored.into_iter().map(|(index, _)| index).collect())
}

/// Ranked indices of the survivors under `policy`.
pub fn select(population: &[Individual], policy: SelectionPolicy) -> Result<Vec<usize>, EvolutionError> {
    let ranked = rank(population)?;
    let survivors = match policy {
        SelectionPolicy::TopK(k) => ranked.into_iter().take(k).collect(),
        SelectionPolicy::Threshold(min) => ranked
            .into_iter()
            .take_while(|&idx| population[idx].fitness.is_some_and(|f| f >= min))
            .collect(),
        SelectionPolicy::TopFraction(fraction) => {
            let k = ((population.len() as f32 * fraction).ceil() as usize).max(1);
            ranked.into_iter().take(k).collect()
        }
    };
    Ok(survivors)
}

/// The best `k` individuals, best first.
pub fn select_top(population: &[Individual], k: usize) -> Result<Vec<&Individual>, EvolutionError> {
    Ok(select(population, SelectionPolicy::TopK(k))?
        .into_iter()
        .map(|idx| &population[idx])
        .collect())
}

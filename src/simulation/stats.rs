use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::individual::Individual;

/// Fitness summary of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation the summary describes.
    pub generation: u32,
    /// Highest fitness.
    pub best: f32,
    /// Mean fitness.
    pub mean: f32,
    /// Lowest fitness.
    pub worst: f32,
    /// Number of survivors selected.
    pub survivors: usize,
    /// Mean number of growth rules per genome.
    pub mean_rules: f32,
}

impl GenerationStats {
    /// Summarises an evaluated population. Unevaluated individuals are skipped.
    pub fn summarize(generation: u32, population: &[Individual], survivors: usize) -> Self {
        let scores: Vec<f32> = population.iter().filter_map(|i| i.fitness).collect();
        let (best, worst, mean) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                scores.iter().copied().fold(f32::MIN, f32::max),
                scores.iter().copied().fold(f32::MAX, f32::min),
                scores.iter().sum::<f32>() / scores.len() as f32,
            )
        };
        let mean_rules = if population.is_empty() {
            0.0
        } else {
            population.iter().map(|i| i.genome.len()).sum::<usize>() as f32 / population.len() as f32
        };

        Self {
            generation,
            best,
            mean,
            worst,
            survivors,
            mean_rules,
        }
    }
}

/// Bounded history of generation summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Recent generations, oldest first.
    pub history: VecDeque<GenerationStats>,
    /// Maximum number of generations to keep.
    pub max_history: usize,
}

impl Default for EvolutionStats {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EvolutionStats {
    /// Creates an empty history.
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Appends a summary, dropping the oldest beyond `max_history`.
    pub fn record(&mut self, stats: GenerationStats) {
        self.history.push_back(stats);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Most recent summary.
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.history.back()
    }

    /// Best fitness seen in the kept history.
    pub fn best_ever(&self) -> Option<f32> {
        self.history.iter().map(|s| s.best).reduce(f32::max)
    }

    /// Change in best fitness between the oldest and newest kept generation.
    pub fn improvement(&self) -> f32 {
        match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => last.best - first.best,
            _ => 0.0,
        }
    }
}

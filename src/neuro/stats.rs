use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::pool::Member;

/// Fitness summary of one scored generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number the scores belong to.
    pub generation: usize,
    /// Highest fitness.
    pub best: f32,
    /// Mean fitness.
    pub mean: f32,
    /// Lowest fitness.
    pub worst: f32,
    /// Members with a non-zero score.
    pub evaluated: usize,
}

impl GenerationStats {
    /// Summarizes a population. Non-finite scores are ignored.
    pub fn from_members(generation: usize, members: &[Member]) -> Self {
        let scores: Vec<f32> = members
            .iter()
            .map(|member| member.fitness)
            .filter(|fitness| fitness.is_finite())
            .collect();

        if scores.is_empty() {
            return Self {
                generation,
                best: 0.0,
                mean: 0.0,
                worst: 0.0,
                evaluated: 0,
            };
        }

        let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let worst = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let mean = scores.iter().sum::<f32>() / scores.len() as f32;
        let evaluated = scores
            .iter()
            .filter(|fitness| fitness.abs() > f32::EPSILON)
            .count();

        Self {
            generation,
            best,
            mean,
            worst,
            evaluated,
        }
    }
}

/// Recent generation summaries, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// Recorded summaries.
    pub generations: VecDeque<GenerationStats>,
    /// Maximum number of generations to keep
    pub max_history: usize,
    best_ever: Option<GenerationStats>,
}

impl Default for FitnessHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FitnessHistory {
    /// Creates an empty history keeping at most `max_history` generations.
    pub fn new(max_history: usize) -> Self {
        Self {
            generations: VecDeque::with_capacity(max_history),
            max_history,
            best_ever: None,
        }
    }

    /// Records a generation, dropping the oldest when full.
    pub fn record(&mut self, stats: GenerationStats) {
        if self.best_ever.is_none_or(|best| stats.best > best.best) {
            self.best_ever = Some(stats);
        }

        self.generations.push_back(stats);
        if self.generations.len() > self.max_history {
            self.generations.pop_front();
        }
    }

    /// Most recent generation.
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.generations.back()
    }

    /// Generation with the highest best fitness ever recorded, even if evicted.
    pub fn best_ever(&self) -> Option<&GenerationStats> {
        self.best_ever.as_ref()
    }

    /// Change in best fitness between the oldest and newest kept generations.
    pub fn improvement(&self) -> f32 {
        match (self.generations.front(), self.generations.back()) {
            (Some(first), Some(last)) => last.best - first.best,
            _ => 0.0,
        }
    }

    /// Number of generations kept.
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

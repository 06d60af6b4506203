use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{EvoError, Result};
use super::pool::Selection;

/// Network construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Input sum at which the activation outputs 0.5.
    pub threshold: f32,
    /// Slope of the sigmoid around the threshold.
    pub steepness: f32,
    /// Lower bound for randomly initialized connection weights.
    pub weight_min: f32,
    /// Upper bound for randomly initialized connection weights.
    pub weight_max: f32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            steepness: 1.0,
            weight_min: -1.5,
            weight_max: 1.5,
        }
    }
}

impl NetworkParams {
    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !self.steepness.is_finite() {
            return Err(EvoError::InvalidConfig(
                "activation threshold and steepness must be finite".to_string(),
            ));
        }
        validate_weight_range(self.weight_min, self.weight_max)
    }
}

/// Population parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolParams {
    /// Number of members per generation.
    pub size: usize,
    /// Per-gene probability of redrawing a weight.
    pub mutation_rate: f32,
    /// Lower bound for redrawn weights.
    pub weight_min: f32,
    /// Upper bound for redrawn weights.
    pub weight_max: f32,
    /// Parent selection scheme.
    pub selection: Selection,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            size: 200,
            mutation_rate: 0.1,
            weight_min: -1.5,
            weight_max: 1.5,
            selection: Selection::Rank,
        }
    }
}

impl PoolParams {
    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.size < 1 {
            return Err(EvoError::InvalidConfig(
                "population size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvoError::InvalidConfig(format!(
                "mutation rate {} is outside [0, 1]",
                self.mutation_rate
            )));
        }
        validate_weight_range(self.weight_min, self.weight_max)
    }
}

/// How many chromosomes survive unchanged into the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliteSchedule {
    /// Always keep the same number of elites.
    Fixed(usize),
    /// Keep `generation / every + base` elites.
    Growing {
        /// Elites at generation 0.
        base: usize,
        /// Generations between each extra elite.
        every: usize,
    },
}

impl EliteSchedule {
    /// Elite count to use when producing the generation after `generation`.
    pub fn elite_count(&self, generation: usize) -> usize {
        match *self {
            EliteSchedule::Fixed(n) => n,
            EliteSchedule::Growing { base, every } => generation / every.max(1) + base,
        }
    }
}

/// Training loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    /// Generations to run in [`crate::neuro::trainer::Trainer::run`].
    pub generations: usize,
    /// Lifetime cap per individual, in ticks. Zero disables the cap.
    pub max_ticks: usize,
    /// Elite count schedule.
    pub elitism: EliteSchedule,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            generations: 50,
            max_ticks: 10_000,
            elitism: EliteSchedule::Fixed(2),
        }
    }
}

impl TrainerParams {
    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if let EliteSchedule::Growing { every: 0, .. } = self.elitism {
            return Err(EvoError::InvalidConfig(
                "growing elite schedule needs `every` of at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration for a training session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Network construction parameters.
    pub network: NetworkParams,
    /// Population parameters.
    pub pool: PoolParams,
    /// Training loop parameters.
    pub trainer: TrainerParams,
    /// Seed for the random generator; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Params {
    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.pool.validate()?;
        self.trainer.validate()
    }

    /// Saves the parameters as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads and validates parameters from JSON. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}

fn validate_weight_range(weight_min: f32, weight_max: f32) -> Result<()> {
    if !weight_min.is_finite() || !weight_max.is_finite() {
        return Err(EvoError::InvalidConfig(
            "weight bounds must be finite".to_string(),
        ));
    }
    if weight_min > weight_max {
        return Err(EvoError::InvalidConfig(format!(
            "weight_min {weight_min} is greater than weight_max {weight_max}"
        )));
    }
    Ok(())
}

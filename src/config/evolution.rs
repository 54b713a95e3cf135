use super::traits::ConfigSection;
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MIN_POPULATION: usize = 4;
pub const MAX_POPULATION: usize = 10_000;
pub const MAX_EPSILON: usize = 1_000_000;

/// Parameters of one genetic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Generations without a strict improvement tolerated before converging.
    pub epsilon: usize,
    /// Share of genes passed to the mutator each generation. At the default `1.0`
    /// every gene is mutated and the stream holds one seed per gene.
    pub mutation_rate: f64,
    pub seed: u64,
    /// Save a checkpoint every this many generations; `0` disables checkpoints.
    pub checkpoint_frequency: usize,
    pub checkpoint_path: PathBuf,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 400,
            epsilon: 100,
            mutation_rate: 1.0,
            seed: 1,
            checkpoint_frequency: 0,
            checkpoint_path: PathBuf::from("checkpoints"),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        if self.population_size < MIN_POPULATION || self.population_size > MAX_POPULATION {
            return Err(SchedulerError::Configuration(format!(
                "Population size must be between {} and {}, got {}",
                MIN_POPULATION, MAX_POPULATION, self.population_size
            )));
        }
        if self.population_size % 2 != 0 {
            log::warn!(
                "Odd population size {}; crossover will overshoot and truncate",
                self.population_size
            );
        }
        if self.epsilon > MAX_EPSILON {
            return Err(SchedulerError::Configuration(format!(
                "Epsilon must be at most {}, got {}",
                MAX_EPSILON, self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SchedulerError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if self.checkpoint_frequency > 0 && self.checkpoint_path.as_os_str().is_empty() {
            return Err(SchedulerError::Configuration(
                "Checkpoint path is required when checkpoints are enabled".to_string(),
            ));
        }
        Ok(())
    }
}

use super::evolution::EvolutionConfig;
use super::traits::ConfigSection;
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A named set of search parameters that jobs refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationProfile {
    pub name: String,
    #[serde(flatten)]
    pub evolution: EvolutionConfig,
}

/// Minimize one graph file with one population profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub graph: PathBuf,
    pub out: PathBuf,
    pub population: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub populations: Vec<PopulationProfile>,
    pub jobs: Vec<JobConfig>,
}

impl JobsConfig {
    pub fn profile(&self, name: &str) -> Option<&PopulationProfile> {
        self.populations.iter().find(|p| p.name == name)
    }
}

impl ConfigSection for JobsConfig {
    fn section_name() -> &'static str {
        "jobs"
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        let mut names = HashSet::new();
        for profile in &self.populations {
            if !names.insert(profile.name.as_str()) {
                return Err(SchedulerError::Configuration(format!(
                    "duplicate population name: {}",
                    profile.name
                )));
            }
            profile.evolution.validate().map_err(|e| {
                SchedulerError::Configuration(format!("population {}: {}", profile.name, e))
            })?;
        }

        let mut job_names = HashSet::new();
        for job in &self.jobs {
            if !job_names.insert(job.name.as_str()) {
                return Err(SchedulerError::Configuration(format!(
                    "duplicate job name: {}",
                    job.name
                )));
            }
            if !names.contains(job.population.as_str()) {
                return Err(SchedulerError::Configuration(format!(
                    "job {} refers to unknown population {}",
                    job.name, job.population
                )));
            }
        }
        Ok(())
    }
}

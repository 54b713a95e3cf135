use super::{evolution::EvolutionConfig, jobs::JobsConfig, traits::ConfigSection};
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables with this prefix override file values,
/// e.g. `MEMSCHED__EVOLUTION__SEED=7`.
pub const ENV_PREFIX: &str = "MEMSCHED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    #[serde(flatten)]
    pub batch: JobsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        validate_section(&self.evolution)?;
        validate_section(&self.batch)?;
        Ok(())
    }
}

fn validate_section<S: ConfigSection>(section: &S) -> Result<(), SchedulerError> {
    section.validate().map_err(|e| {
        SchedulerError::Configuration(format!("[{}] {}", S::section_name(), e))
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a JSON or TOML file (chosen by extension), layered under environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchedulerError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SchedulerError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| SchedulerError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.write_guard() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchedulerError> {
        let toml_str = toml::to_string_pretty(&self.get())
            .map_err(|e| SchedulerError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| SchedulerError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        *self.write_guard() = candidate;
        Ok(())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, AppConfig> {
        self.config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub mod evolution;
pub mod jobs;
pub mod manager;
pub mod traits;

pub use evolution::EvolutionConfig;
pub use jobs::{JobConfig, JobsConfig, PopulationProfile};
pub use manager::{AppConfig, ConfigManager};
pub use traits::ConfigSection;

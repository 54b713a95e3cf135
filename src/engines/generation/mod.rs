pub mod evolution_engine;
pub mod gene;
pub mod mutation;
pub mod operators;
pub mod progress;
pub mod synthesis;

pub use evolution_engine::{EvolutionState, GeneticOptimizer, ProgressCallback};
pub use gene::Gene;
pub use mutation::smart_mutate;
pub use operators::ordered_crossover;
pub use progress::{FitnessTrace, LoggingProgress, SilentProgress};
pub use synthesis::synthesize;

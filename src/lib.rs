//! Low-memory scheduling of dependency graphs.
//!
//! Given a DAG whose nodes each produce one value that must stay resident until every
//! consumer has run, search for an execution order with the smallest peak number of
//! live values. The search is a seed-reproducible genetic algorithm over valid
//! topological orders, with resumable checkpoints.

pub mod config;
pub mod data;
pub mod drivers;
pub mod engines;
pub mod error;
pub mod graph;
pub mod sequence;

pub use engines::evaluation::{is_valid, simulate};
pub use engines::generation::{smart_mutate, synthesize, Gene, GeneticOptimizer};
pub use error::{Result, SchedulerError};
pub use graph::{Graph, NodeId};
pub use sequence::Sequence;

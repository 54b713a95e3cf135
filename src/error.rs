use crate::graph::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    #[error("Malformed sequence: {0}")]
    MalformedSequence(String),

    #[error("Duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("No node with id {0} found in graph")]
    UnknownNode(NodeId),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("No valid swap found for node {node} after {attempts} candidates")]
    MutationExhausted { node: NodeId, attempts: usize },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Errors the optimizer can absorb without aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SchedulerError::MutationExhausted { .. })
    }

    /// Broken internal state, as opposed to bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SchedulerError::InvariantViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

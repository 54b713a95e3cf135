use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// A candidate schedule and its cached peak memory utilization.
///
/// A fitness of `0` means the gene has not been scored since it was last changed; it
/// is never a legitimate optimum since every input node occupies a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub sequence: Sequence,
    pub fitness: usize,
}

impl Gene {
    pub fn new(sequence: Sequence, fitness: usize) -> Self {
        Self { sequence, fitness }
    }

    pub fn unscored(sequence: Sequence) -> Self {
        Self::new(sequence, 0)
    }

    pub fn is_scored(&self) -> bool {
        self.fitness != 0
    }
}

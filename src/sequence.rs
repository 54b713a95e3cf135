use crate::error::{Result, SchedulerError};
use crate::graph::NodeId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One candidate execution order.
///
/// A sequence is a plain value: clones never share storage, and the only way to change
/// one is to build a new one. It does not have to mention every node of the graph;
/// input nodes in particular are normally absent since they are resident from the start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    operations: Vec<NodeId>,
}

impl Sequence {
    pub fn new(operations: Vec<NodeId>) -> Self {
        Self { operations }
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.operations
    }

    /// Owned copy of the operations, free to modify without touching `self`.
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.operations.clone()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.operations.iter().copied()
    }

    pub fn to_text(&self) -> String {
        let mut text = format!("Operations {}\n", self.operations.len());
        for id in &self.operations {
            text.push_str(&id.to_string());
            text.push('\n');
        }
        text
    }

    /// Parse the `Operations <n>` format; `n` must match the number of ids that follow.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| SchedulerError::MalformedSequence("empty input".to_string()))?;

        let declared = match header.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["Operations", n] => n.parse::<usize>().map_err(|_| {
                SchedulerError::MalformedSequence(format!("bad count in '{}'", header))
            })?,
            _ => {
                return Err(SchedulerError::MalformedSequence(format!(
                    "expected 'Operations <n>', got '{}'",
                    header
                )))
            }
        };

        let mut operations = Vec::with_capacity(declared);
        for tok in lines.flat_map(str::split_whitespace) {
            let id = tok.parse::<NodeId>().map_err(|_| {
                SchedulerError::MalformedSequence(format!("bad node id '{}'", tok))
            })?;
            operations.push(id);
        }

        if operations.len() != declared {
            return Err(SchedulerError::MalformedSequence(format!(
                "declared {} operations, found {}",
                declared,
                operations.len()
            )));
        }

        Ok(Self::new(operations))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}

impl From<Vec<NodeId>> for Sequence {
    fn from(operations: Vec<NodeId>) -> Self {
        Self::new(operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_are_independent() {
        let seq = Sequence::new(vec![4, 6, 5, 7]);
        let mut ops = seq.to_vec();
        ops[0] = 99;
        assert_eq!(seq.as_slice(), &[4, 6, 5, 7]);

        let cloned = seq.clone();
        assert_eq!(cloned, seq);
    }

    #[test]
    fn test_rejects_count_mismatch() {
        assert!(Sequence::parse("Operations 3\n1\n2\n").is_err());
        assert!(Sequence::parse("Ops 1\n1\n").is_err());
        assert!(Sequence::parse("Operations 1\nx\n").is_err());
    }
}

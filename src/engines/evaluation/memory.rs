use super::validity::is_valid;
use crate::error::{Result, SchedulerError};
use crate::graph::{Graph, NodeId};
use crate::sequence::Sequence;

/// A single storage cell of the simulated substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryCell {
    Free,
    /// Holds the value of `node` until `refs` more consumers have read it.
    Live { node: NodeId, refs: i64 },
}

impl MemoryCell {
    pub fn is_free(&self) -> bool {
        matches!(self, MemoryCell::Free)
    }
}

/// Greedy mark-and-sweep cell allocator.
///
/// Cells are reused in place and the list only grows when nothing is free, so its
/// length is the peak number of simultaneously live values.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    cells: Vec<MemoryCell>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a value without consuming anything and without sweeping.
    pub fn load(&mut self, node: NodeId, refs: usize) {
        let slot = self.allocate();
        self.cells[slot] = MemoryCell::Live {
            node,
            refs: refs as i64,
        };
    }

    /// Execute `node`: write its value, release one reference on each of its inputs,
    /// then sweep.
    pub fn process_node(&mut self, node: NodeId, refs: usize, parents: &[NodeId]) {
        self.load(node, refs);

        for &parent in parents {
            let held = self.cells.iter_mut().find_map(|cell| match cell {
                MemoryCell::Live { node, refs } if *node == parent => Some(refs),
                _ => None,
            });
            if let Some(refs) = held {
                *refs -= 1;
            }
        }

        self.sweep();
    }

    pub fn sweep(&mut self) {
        for cell in self.cells.iter_mut() {
            if let MemoryCell::Live { refs, .. } = cell {
                if *refs <= 0 {
                    *cell = MemoryCell::Free;
                }
            }
        }
    }

    fn allocate(&mut self) -> usize {
        match self.cells.iter().position(MemoryCell::is_free) {
            Some(slot) => slot,
            None => {
                self.cells.push(MemoryCell::Free);
                self.cells.len() - 1
            }
        }
    }

    pub fn cells(&self) -> &[MemoryCell] {
        &self.cells
    }

    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_free()).count()
    }

    pub fn max_utilization(&self) -> usize {
        self.cells.len()
    }
}

/// Replay `sequence` against `graph` and return its peak memory utilization.
///
/// Lower is better. Invalid sequences are rejected rather than partially scored.
pub fn simulate(graph: &Graph, sequence: &Sequence) -> Result<usize> {
    if !is_valid(graph, sequence) {
        return Err(SchedulerError::InvalidSequence(format!(
            "sequence of {} operations does not respect graph dependencies",
            sequence.len()
        )));
    }

    let mut memory = Memory::new();
    for root in graph.roots() {
        memory.load(root.id(), root.child_count());
    }
    memory.sweep();

    for id in sequence.iter() {
        let node = graph.node(id).ok_or(SchedulerError::UnknownNode(id))?;
        memory.process_node(id, node.child_count(), &graph.parent_ids(node));
    }

    log::trace!(
        "Simulated {} operations, peak utilization {}",
        sequence.len(),
        memory.max_utilization()
    );
    Ok(memory.max_utilization())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_node_frees_consumed_parents() {
        let mut mem = Memory::new();

        mem.process_node(1, 1, &[]);
        mem.process_node(2, 1, &[]);
        mem.process_node(3, 1, &[1]);

        // 1 was consumed by 3, 2 is untouched
        assert!(mem.cells()[0].is_free());
        assert_eq!(mem.live_cells(), 2);
        assert_eq!(mem.max_utilization(), 3);

        mem.process_node(4, 1, &[2, 3]);
        assert_eq!(mem.live_cells(), 1);
        assert_eq!(mem.max_utilization(), 3);
    }

    #[test]
    fn test_free_cells_are_reused() {
        let mut mem = Memory::new();
        mem.load(1, 1);
        mem.process_node(2, 1, &[1]);
        mem.process_node(3, 0, &[2]);

        assert_eq!(mem.max_utilization(), 2);
        assert_eq!(mem.live_cells(), 0);
    }

    #[test]
    fn test_zero_reference_roots_still_count() {
        let g = Graph::from_edges(&[1, 2], &[]).unwrap();
        let peak = simulate(&g, &Sequence::default()).unwrap();
        assert_eq!(peak, 2);
    }

    #[test]
    fn test_invalid_sequence_is_rejected() {
        let g = Graph::from_edges(&[1, 2, 3], &[(1, 2), (2, 3)]).unwrap();
        let result = simulate(&g, &Sequence::new(vec![3, 2]));
        assert!(matches!(result, Err(SchedulerError::InvalidSequence(_))));
    }
}

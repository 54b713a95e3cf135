use crate::graph::Graph;
use crate::sequence::Sequence;

/// Check that `sequence` never executes a node before all of its parents.
///
/// Input nodes are resident from the start and count as processed. Ids that are not
/// part of the graph make the sequence invalid.
pub fn is_valid(graph: &Graph, sequence: &Sequence) -> bool {
    let mut processed: Vec<bool> = graph.nodes().iter().map(|n| n.is_root()).collect();

    for id in sequence.iter() {
        let Some(idx) = graph.index_of(id) else {
            log::trace!("Node {} is not in the graph", id);
            return false;
        };

        let node = &graph.nodes()[idx];
        if let Some(&missing) = node.parents.iter().find(|&&p| !processed[p]) {
            log::trace!(
                "Node {} scheduled before its parent {}",
                id,
                graph.nodes()[missing].id()
            );
            return false;
        }

        processed[idx] = true;
    }

    true
}

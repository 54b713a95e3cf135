use crate::engines::evaluation::is_valid;
use crate::error::{Result, SchedulerError};
use crate::graph::{Graph, NodeId};
use crate::sequence::Sequence;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Graph-aware mutation: exchange a random operation with a causally unrelated node.
///
/// The node at a random position is swapped (by value, at every occurrence) with a
/// node that is neither its ancestor, its descendant, nor an input. Candidates are
/// tried in shuffled order, each at most once; the first swap that keeps the sequence
/// valid wins. If none does, [`SchedulerError::MutationExhausted`] is returned and the
/// caller decides what to do with the gene.
///
/// Empty sequences and input nodes at the mutation point come back unchanged.
pub fn smart_mutate(graph: &Graph, sequence: &Sequence, seed: u64) -> Result<Sequence> {
    if sequence.is_empty() {
        return Ok(sequence.clone());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let point = rng.gen_range(0..sequence.len());
    let target = sequence.as_slice()[point];
    let target_idx = graph
        .index_of(target)
        .ok_or(SchedulerError::UnknownNode(target))?;

    if graph.nodes()[target_idx].is_root() {
        return Ok(sequence.clone());
    }

    let mut candidates = swap_candidates(graph, target_idx);
    candidates.shuffle(&mut rng);

    for &candidate in &candidates {
        let mutated = swap_values(sequence, target, candidate);
        if is_valid(graph, &mutated) {
            log::trace!("Swapped {} with {} at position {}", target, candidate, point);
            return Ok(mutated);
        }
    }

    Err(SchedulerError::MutationExhausted {
        node: target,
        attempts: candidates.len(),
    })
}

/// Every node that could legally trade places with the node at `idx`.
fn swap_candidates(graph: &Graph, idx: usize) -> Vec<NodeId> {
    let ancestors = graph.ancestor_mask(idx);
    let descendants = graph.descendant_mask(idx);

    graph
        .nodes()
        .iter()
        .enumerate()
        .filter(|&(i, node)| i != idx && !node.is_root() && !ancestors[i] && !descendants[i])
        .map(|(_, node)| node.id())
        .collect()
}

/// Exchange every occurrence of `a` with `b` and vice versa.
pub fn swap_values(sequence: &Sequence, a: NodeId, b: NodeId) -> Sequence {
    sequence
        .iter()
        .map(|id| {
            if id == a {
                b
            } else if id == b {
                a
            } else {
                id
            }
        })
        .collect::<Vec<_>>()
        .into()
}

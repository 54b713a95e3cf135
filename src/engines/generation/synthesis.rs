use crate::graph::Graph;
use crate::sequence::Sequence;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produce a random valid sequence by growing a topological frontier.
///
/// Nodes become eligible once every parent has been processed; the next node to
/// schedule is drawn uniformly from the eligible set. Input nodes are treated as
/// already processed and do not appear in the result.
pub fn synthesize(graph: &Graph, seed: u64) -> Sequence {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes = graph.nodes();

    let mut pending: Vec<usize> = nodes.iter().map(|n| n.parent_count()).collect();
    let mut frontier = Vec::new();
    let mut schedule = Vec::with_capacity(nodes.len());

    for root in nodes.iter().filter(|n| n.is_root()) {
        for &child in &root.children {
            pending[child] -= 1;
            if pending[child] == 0 {
                frontier.push(child);
            }
        }
    }

    while !frontier.is_empty() {
        let pick = rng.gen_range(0..frontier.len());
        let idx = frontier.swap_remove(pick);
        schedule.push(nodes[idx].id());

        for &child in &nodes[idx].children {
            pending[child] -= 1;
            if pending[child] == 0 {
                frontier.push(child);
            }
        }
    }

    log::trace!("Synthesized sequence of {} operations (seed {})", schedule.len(), seed);
    Sequence::new(schedule)
}

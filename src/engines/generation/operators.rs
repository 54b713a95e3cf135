use super::gene::Gene;
use crate::sequence::Sequence;
use rand::Rng;
use std::collections::HashSet;

/// Order-preserving single-point crossover.
///
/// The child keeps `first[..point]` and then appends the elements of `second` that it
/// does not contain yet, in `second`'s order. When both parents are valid orderings of
/// the same node set, so is the child.
pub fn ordered_crossover(first: &Sequence, second: &Sequence, point: usize) -> Sequence {
    let point = point.min(first.len());
    let mut child: Vec<_> = first.as_slice()[..point].to_vec();
    let mut seen: HashSet<_> = child.iter().copied().collect();

    for id in second.iter() {
        if seen.insert(id) {
            child.push(id);
        }
    }

    Sequence::new(child)
}

/// Pick two parents uniformly (with replacement) and a shared crossover point, then
/// produce both children.
pub fn crossover<R: Rng>(parents: &[Gene], rng: &mut R) -> (Gene, Gene) {
    let first = &parents[rng.gen_range(0..parents.len())];
    let second = &parents[rng.gen_range(0..parents.len())];
    let point = if first.sequence.is_empty() {
        0
    } else {
        rng.gen_range(0..first.sequence.len())
    };

    (
        Gene::unscored(ordered_crossover(&first.sequence, &second.sequence, point)),
        Gene::unscored(ordered_crossover(&second.sequence, &first.sequence, point)),
    )
}

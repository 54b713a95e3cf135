pub mod io;
pub mod node;

pub use node::{Node, NodeId};

use crate::error::{Result, SchedulerError};
use std::collections::{HashMap, VecDeque};

/// Immutable dependency DAG.
///
/// Nodes live in an arena addressed by dense index; the external id of every node is
/// mapped to its index once, at construction. The graph is never mutated afterwards.
///
/// The declared input and output lists are kept apart from the structural roots and
/// leaves: an output may feed other nodes, and an input may feed nothing.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    edges: usize,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

impl Graph {
    /// Build a graph from a list of node ids and `(src, dst)` edges.
    ///
    /// Rejects duplicate ids, edges naming unknown ids and cyclic input. The roots
    /// become the declared inputs and the remaining leaves the declared outputs.
    pub fn from_edges(ids: &[NodeId], edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut nodes = Vec::with_capacity(ids.len());
        let mut index = HashMap::with_capacity(ids.len());

        for &id in ids {
            if index.insert(id, nodes.len()).is_some() {
                return Err(SchedulerError::DuplicateNode(id));
            }
            nodes.push(Node::new(id));
        }

        for &(src, dst) in edges {
            let src_idx = *index.get(&src).ok_or(SchedulerError::UnknownNode(src))?;
            let dst_idx = *index.get(&dst).ok_or(SchedulerError::UnknownNode(dst))?;
            if src_idx == dst_idx {
                return Err(SchedulerError::MalformedGraph(format!(
                    "node {} depends on itself",
                    src
                )));
            }
            nodes[src_idx].children.push(dst_idx);
            nodes[dst_idx].parents.push(src_idx);
        }

        let mut graph = Self {
            nodes,
            index,
            edges: edges.len(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        };
        graph.ensure_acyclic()?;
        let inputs: Vec<NodeId> = graph.roots().iter().map(|n| n.id()).collect();
        let outputs: Vec<NodeId> = graph
            .nodes
            .iter()
            .filter(|n| n.is_leaf() && !n.is_root())
            .map(|n| n.id())
            .collect();
        graph.inputs = inputs;
        graph.outputs = outputs;

        log::debug!(
            "Built graph with {} nodes, {} edges, {} roots",
            graph.len(),
            graph.edge_count(),
            graph.roots().len()
        );
        Ok(graph)
    }

    // Kahn's algorithm; every node must be drained for the graph to be a DAG.
    fn ensure_acyclic(&self) -> Result<()> {
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.parents.len()).collect();
        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| pending[i] == 0)
            .collect();
        let mut drained = 0;

        while let Some(idx) = queue.pop_front() {
            drained += 1;
            for &child in &self.nodes[idx].children {
                pending[child] -= 1;
                if pending[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if drained != self.nodes.len() {
            return Err(SchedulerError::MalformedGraph(format!(
                "dependency cycle among {} nodes",
                self.nodes.len() - drained
            )));
        }
        Ok(())
    }

    // Ids must already belong to the graph.
    pub(crate) fn with_terminals(mut self, inputs: Vec<NodeId>, outputs: Vec<NodeId>) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self
    }

    /// Input ids in declaration order.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Output ids in declaration order.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edge count as declared at construction.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn parent_ids(&self, node: &Node) -> Vec<NodeId> {
        node.parents.iter().map(|&p| self.nodes[p].id()).collect()
    }

    pub fn child_ids(&self, node: &Node) -> Vec<NodeId> {
        node.children.iter().map(|&c| self.nodes[c].id()).collect()
    }

    /// Input nodes: no parents, resident before any scheduled operation.
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_root()).collect()
    }

    /// Output nodes: nothing consumes them.
    pub fn leaves(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_leaf()).collect()
    }

    /// Arena indices of every transitive ancestor of `idx`, flagged in a dense mask.
    pub(crate) fn ancestor_mask(&self, idx: usize) -> Vec<bool> {
        self.reach_mask(idx, |n| &n.parents)
    }

    /// Arena indices of every transitive descendant of `idx`, flagged in a dense mask.
    pub(crate) fn descendant_mask(&self, idx: usize) -> Vec<bool> {
        self.reach_mask(idx, |n| &n.children)
    }

    fn reach_mask<F>(&self, start: usize, next: F) -> Vec<bool>
    where
        F: Fn(&Node) -> &Vec<usize>,
    {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = next(&self.nodes[start]).clone();

        while let Some(idx) = stack.pop() {
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            stack.extend(next(&self.nodes[idx]).iter().copied());
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        Graph::from_edges(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]).unwrap()
    }

    #[test]
    fn test_roots_and_leaves() {
        let g = diamond();
        let roots: Vec<NodeId> = g.roots().iter().map(|n| n.id()).collect();
        let leaves: Vec<NodeId> = g.leaves().iter().map(|n| n.id()).collect();
        assert_eq!(roots, vec![1]);
        assert_eq!(leaves, vec![4]);
    }

    #[test]
    fn test_declared_terminals_default_to_roots_and_leaves() {
        let g = Graph::from_edges(&[1, 2, 3, 4], &[(1, 3), (3, 4)]).unwrap();
        assert_eq!(g.inputs(), &[1, 2]);
        assert_eq!(g.outputs(), &[4]);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let g = diamond();
        let four = g.node(4).unwrap();
        assert_eq!(g.parent_ids(four), vec![2, 3]);
        let one = g.node(1).unwrap();
        assert_eq!(g.child_ids(one), vec![2, 3]);
        assert_eq!(one.child_count(), 2);
    }

    #[test]
    fn test_reach_masks() {
        let g = diamond();
        let two = g.index_of(2).unwrap();
        let ancestors = g.ancestor_mask(two);
        let descendants = g.descendant_mask(two);
        assert!(ancestors[g.index_of(1).unwrap()]);
        assert!(!ancestors[g.index_of(3).unwrap()]);
        assert!(descendants[g.index_of(4).unwrap()]);
        assert!(!descendants[two]);
    }

    #[test]
    fn test_rejects_duplicates_unknowns_and_cycles() {
        assert!(matches!(
            Graph::from_edges(&[1, 1], &[]),
            Err(SchedulerError::DuplicateNode(1))
        ));
        assert!(matches!(
            Graph::from_edges(&[1, 2], &[(1, 9)]),
            Err(SchedulerError::UnknownNode(9))
        ));
        assert!(matches!(
            Graph::from_edges(&[1, 2, 3], &[(1, 2), (2, 3), (3, 2)]),
            Err(SchedulerError::MalformedGraph(_))
        ));
    }
}

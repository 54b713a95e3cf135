/// External identifier of a graph node, as it appears in graph and sequence files.
pub type NodeId = u32;

/// A node in the dependency graph.
///
/// Adjacency is stored as dense arena indices into the owning [`Graph`](super::Graph);
/// use the graph's accessors to translate them back into [`NodeId`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    pub(crate) parents: Vec<usize>,
    pub(crate) children: Vec<usize>,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of consumers of this node's value, i.e. its reference count once written.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

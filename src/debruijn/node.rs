/*!

`DeBruijnGraph` node and edge definitions

*/

use crate::handle::{braid_edges, Braid, NodeId, Traversal};

#[derive(Debug, Clone, PartialEq)]
pub struct DbgEdge {
    pub target: NodeId,
    pub traversals: Vec<Traversal>,
}

impl DbgEdge {
    pub fn new(target: NodeId, traversal: Traversal) -> DbgEdge {
        DbgEdge {
            target,
            traversals: vec![traversal],
        }
    }

    #[inline]
    pub fn carries_sequence(&self, sequence: usize) -> bool {
        self.traversals.iter().any(|t| t.sequence == sequence)
    }

    #[inline]
    pub fn carries(&self, sequence: usize, passage: usize) -> bool {
        self.traversals
            .iter()
            .any(|t| t.sequence == sequence && t.passage == passage)
    }
}

#[derive(Debug, Clone)]
pub struct DbgNode {
    /// `None` only for the root.
    pub kmer: Option<Vec<u8>>,
    pub edges: Vec<DbgEdge>,
    /// Number of distinct nodes with an edge to this one.
    pub parents: usize,
    /// Sequences whose last k-mer is this node.
    pub ends: Vec<usize>,
}

impl DbgNode {
    pub fn root() -> DbgNode {
        DbgNode {
            kmer: None,
            edges: Vec::new(),
            parents: 0,
            ends: Vec::new(),
        }
    }

    pub fn new(kmer: &[u8]) -> DbgNode {
        DbgNode {
            kmer: Some(kmer.into()),
            edges: Vec::new(),
            parents: 0,
            ends: Vec::new(),
        }
    }

    #[inline]
    pub fn kmer(&self) -> &[u8] {
        self.kmer.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn has_single_parent(&self) -> bool {
        self.parents == 1
    }

    #[inline]
    pub fn has_one_child(&self) -> bool {
        self.edges.len() == 1
    }

    pub fn has_edge_to(&self, target: NodeId) -> bool {
        self.edges.iter().any(|e| e.target == target)
    }

    /// The edge that carries the given passage of a sequence, if it
    /// leaves this node.
    pub fn edge_for(&self, sequence: usize, passage: usize) -> Option<&DbgEdge> {
        self.edges.iter().find(|e| e.carries(sequence, passage))
    }

    pub fn braids(&self) -> Vec<Braid> {
        braid_edges(
            self.edges
                .iter()
                .map(|e| (e.target, e.traversals.as_slice())),
        )
    }
}

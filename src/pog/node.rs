use bstr::BString;

use crate::handle::{braid_edges, Braid, NodeId, SequenceSet, Traversal};

#[derive(Debug, Clone, PartialEq)]
pub struct PogEdge {
    pub target: NodeId,
    pub traversals: Vec<Traversal>,
}

impl PogEdge {
    #[inline]
    pub fn carries(&self, sequence: usize, passage: usize) -> bool {
        self.traversals
            .iter()
            .any(|t| t.sequence == sequence && t.passage == passage)
    }

    pub fn sequences(&self) -> SequenceSet {
        self.traversals.iter().map(|t| t.sequence).collect()
    }
}

/// A node of a [`PartialOrderGraph`](super::PartialOrderGraph).
///
/// `fragment` holds `span` overlapping k-mers; it is empty for the
/// root and for the synthetic end node.
#[derive(Debug, Clone)]
pub struct PogNode {
    pub fragment: BString,
    pub span: usize,
    pub sequence_set: SequenceSet,
    pub edges: Vec<PogEdge>,
    /// Sequences whose last k-mer lies in this node.
    pub ends: Vec<usize>,
}

impl PogNode {
    pub(crate) fn sentinel(sequence_set: SequenceSet) -> PogNode {
        PogNode {
            fragment: BString::from(Vec::new()),
            span: 0,
            sequence_set,
            edges: Vec::new(),
            ends: Vec::new(),
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.fragment.is_empty()
    }

    /// The fragment with the first `overlap` symbols dropped.
    #[inline]
    pub fn suffix(&self, overlap: usize) -> &[u8] {
        self.fragment.get(overlap..).unwrap_or(&[])
    }

    /// The edge that carries the given passage of a sequence.
    pub fn edge_for(&self, sequence: usize, passage: usize) -> Option<&PogEdge> {
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

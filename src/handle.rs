use fnv::FnvHashSet;

/// Set of 1-based sequence indices.
pub type SequenceSet = FnvHashSet<usize>;

/// Newtype that indexes a node in a graph's node arena, no matter
/// which graph owns the arena. The root sentinel is always node 0.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub(crate) fn ix(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    #[inline]
    fn from(num: u64) -> Self {
        NodeId(num)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(num: usize) -> Self {
        NodeId(num as u64)
    }
}

impl From<NodeId> for u64 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0 as usize
    }
}

/// One passage of a sequence over an edge: `passage` is the 0-based
/// rank, within `sequence`, of the k-mer the edge leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Traversal {
    pub sequence: usize,
    pub passage: usize,
}

impl Traversal {
    #[inline]
    pub fn new(sequence: usize, passage: usize) -> Self {
        Traversal { sequence, passage }
    }
}

impl std::fmt::Display for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}:{})", self.sequence, self.passage)
    }
}

/// The outgoing edges of a node that share a target, with the union of
/// the sequences they carry. Two braids out of one node are a true
/// split; parallel edges to one target are not.
#[derive(Debug, Clone, PartialEq)]
pub struct Braid {
    pub target: NodeId,
    pub sequences: SequenceSet,
}

/// Groups `(target, traversals)` pairs by target, in order of first
/// appearance.
pub(crate) fn braid_edges<'a, I>(edges: I) -> Vec<Braid>
where
    I: IntoIterator<Item = (NodeId, &'a [Traversal])>,
{
    let mut braids: Vec<Braid> = Vec::new();
    for (target, traversals) in edges {
        let ix = match braids.iter().position(|b| b.target == target) {
            Some(ix) => ix,
            None => {
                braids.push(Braid {
                    target,
                    sequences: SequenceSet::default(),
                });
                braids.len() - 1
            }
        };
        braids[ix]
            .sequences
            .extend(traversals.iter().map(|t| t.sequence));
    }
    braids
}

/*!
Errors shared by the graphs and the alignment buffer.

Every failure is local and deterministic; nothing here is retried, and
an operation that fails leaves previously committed state untouched.
*/

use crate::handle::NodeId;
use crate::work::AlignmentMethod;

/// Key used to look up a sequence, either by its 1-based index or by
/// its registered name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceKey {
    Index(usize),
    Name(String),
}

impl std::fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceKey::Index(ix) => write!(f, "index {}", ix),
            SequenceKey::Name(name) => write!(f, "name '{}'", name),
        }
    }
}

impl From<usize> for SequenceKey {
    #[inline]
    fn from(ix: usize) -> Self {
        SequenceKey::Index(ix)
    }
}

impl From<&str> for SequenceKey {
    #[inline]
    fn from(name: &str) -> Self {
        SequenceKey::Name(name.to_string())
    }
}

impl From<String> for SequenceKey {
    #[inline]
    fn from(name: String) -> Self {
        SequenceKey::Name(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The sequence contains a symbol outside the molecule alphabet.
    #[error("invalid {moltype} symbol '{symbol}' at position {position}")]
    Alphabet {
        moltype: String,
        symbol: char,
        position: usize,
    },

    /// The sequence is shorter than the k-mer length.
    #[error("sequence of length {length} is shorter than k-mer length {k}")]
    Length { length: usize, k: usize },

    #[error("sequence not found: {0}")]
    NotFound(SequenceKey),

    #[error("sequence name '{0}' is already registered")]
    DuplicateName(String),

    #[error("{names} names given for {sequences} sequences")]
    NameCountMismatch { names: usize, sequences: usize },

    /// Following the first branch out of `start` never reached a node
    /// covering every sequence that passes through `start`.
    #[error("bubble starting at node {start} never closes")]
    UnclosedBubble { start: NodeId },

    #[error("graph must be compressed before estimating {0:?} work")]
    NotCompressed(AlignmentMethod),

    #[error("unsupported alignment operation: {0}")]
    UnsupportedOperation(String),

    #[error("no alignment result at index {0}")]
    ProfileNotFound(usize),
}

pub type Result<T> = std::result::Result<T, GraphError>;

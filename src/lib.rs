/*!
De Bruijn and partial order graphs for bounding the work of a multiple
sequence alignment.

# Overview

Sequences are first broken into k-mers and threaded through a
[`DeBruijnGraph`](debruijn::DeBruijnGraph). Every edge remembers which
sequence passed over it and at which k-mer rank, so each sequence can
be rebuilt exactly, even when it revisits a k-mer.

The graph is then compressed into a
[`PartialOrderGraph`](pog::PartialOrderGraph), where maximal unbranched
runs of k-mers collapse into single nodes. What remains are the places
where sequences split and rejoin: bubbles.

# Alignment

The bubble decomposition is what an aligner needs to work on. Only the
branches of a bubble have to be aligned; everything between bubbles is
shared. [`PartialOrderGraph::align`](pog::PartialOrderGraph::align)
schedules exactly that work on an
[`AlignmentBuffer`](alignment::AlignmentBuffer), which runs it against a
pluggable [`AlignmentPlugin`](alignment::AlignmentPlugin):

* [`CostPlugin`](alignment::CostPlugin) projects every operation onto
  cost and length ranges
* [`RecordingPlugin`](alignment::RecordingPlugin) records the shape of
  the calls

Cheaper, structure-free estimates are available through
[`work`](pog::PartialOrderGraph::work) and [`AlignmentMethod`].

# Misc.

* [`alphabet`] holds the molecule types sequences are checked against
* [`conversion`] enumerates graph contents and converts them to GFA

*/

pub mod handle;

pub mod alphabet;
pub mod input;
pub mod kmer;
pub mod registry;

mod compress;
pub mod debruijn;
pub mod pog;

pub mod alignment;
pub mod work;

pub mod conversion;
pub mod error;

pub use debruijn::DeBruijnGraph;
pub use error::{GraphError, Result, SequenceKey};
pub use pog::PartialOrderGraph;
pub use work::AlignmentMethod;

/*!
The compressed form of a [`DeBruijnGraph`](crate::debruijn::DeBruijnGraph).

Each node holds a fragment made of `span` overlapping k-mers, and
edges keep the traversals of the graph they were compressed from. A
sequence entering a node at passage `p` leaves it over the edge that
carries passage `p + span`, so every sequence can still be rebuilt
exactly, cycles included.

Bubble detection needs every divergent tail to rejoin somewhere;
[`PartialOrderGraph::attach_end`] adds a synthetic end node that all
sequences flow into.
*/

use bstr::BString;
use fnv::FnvHashSet;
use rayon::prelude::*;

use log::{debug, trace};

use crate::{
    alignment::{AlignmentBuffer, AlignmentPlugin, Operand},
    alphabet::MolType,
    error::{GraphError, Result, SequenceKey},
    handle::{Braid, NodeId, SequenceSet, Traversal},
    kmer::kmer_count,
    registry::SequenceRegistry,
    work::{self, AlignmentMethod},
};

pub mod bubble;
pub mod node;

pub use self::bubble::PogBubble;
pub use self::node::{PogEdge, PogNode};

#[derive(Debug)]
pub struct PartialOrderGraph {
    kmer_length: usize,
    moltype: Box<dyn MolType>,
    registry: SequenceRegistry,
    nodes: Vec<PogNode>,
    end: Option<NodeId>,
}

/// A piece of the final concatenation built by `align`.
enum Piece {
    Literal(Vec<u8>),
    Profile(usize),
}

impl PartialOrderGraph {
    pub(crate) fn from_parts(
        kmer_length: usize,
        moltype: Box<dyn MolType>,
        registry: SequenceRegistry,
        nodes: Vec<PogNode>,
    ) -> Self {
        PartialOrderGraph {
            kmer_length,
            moltype,
            registry,
            nodes,
            end: None,
        }
    }

    #[inline]
    pub fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    /// Number of symbols shared by consecutive k-mers.
    #[inline]
    pub fn overlap(&self) -> usize {
        self.kmer_length - 1
    }

    pub fn moltype(&self) -> &dyn MolType {
        self.moltype.as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    pub fn root(&self) -> &PogNode {
        &self.nodes[0]
    }

    /// The synthetic end node, once attached.
    pub fn end(&self) -> Option<NodeId> {
        self.end
    }

    pub fn node(&self, id: NodeId) -> Option<&PogNode> {
        self.nodes.get(id.ix())
    }

    /// All nodes with their ids, root and end included.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PogNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(ix, node)| (NodeId::from(ix), node))
    }

    fn fragment_nodes(&self) -> impl Iterator<Item = &PogNode> + '_ {
        self.nodes().filter_map(move |(id, node)| {
            if id.is_root() || Some(id) == self.end {
                None
            } else {
                Some(node)
            }
        })
    }

    /// Number of fragment nodes, not counting the root or the end.
    pub fn node_count(&self) -> usize {
        self.fragment_nodes().count()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub fn braids(&self, node: NodeId) -> Vec<Braid> {
        self.node(node).map(PogNode::braids).unwrap_or_default()
    }

    /// Nodes where the graph splits into more than one target.
    pub fn branch_points(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.braids().len() > 1)
            .map(|(id, _)| id)
            .collect()
    }

    /// Root-first walk of one sequence. The end node is included when
    /// it is attached.
    fn walk(&self, index: usize) -> Vec<NodeId> {
        let mut path = vec![NodeId::ROOT];
        let mut node = self.root();
        let mut passage = 0;

        while let Some(edge) = node.edge_for(index, passage + node.span) {
            passage += node.span;
            path.push(edge.target);
            node = &self.nodes[edge.target.ix()];
        }
        path
    }

    /// The fragment nodes a sequence passes through, in order.
    pub fn path<K: Into<SequenceKey>>(&self, key: K) -> Result<Vec<NodeId>> {
        let index = self.registry.resolve(&key.into())?;
        let path = self
            .walk(index)
            .into_iter()
            .filter(|&id| !id.is_root() && Some(id) != self.end)
            .collect();
        Ok(path)
    }

    fn spell(&self, path: &[NodeId]) -> BString {
        let overlap = self.overlap();
        let mut seq: Vec<u8> = Vec::new();
        for (i, id) in path.iter().enumerate() {
            let node = &self.nodes[id.ix()];
            if i == 0 {
                seq.extend_from_slice(&node.fragment);
            } else {
                seq.extend_from_slice(node.suffix(overlap));
            }
        }
        seq.into()
    }

    pub fn get<K: Into<SequenceKey>>(&self, key: K) -> Result<BString> {
        let path = self.path(key)?;
        Ok(self.spell(&path))
    }

    pub fn sequence(&self, index: usize) -> Result<BString> {
        self.get(index)
    }

    pub fn sequences(&self) -> Vec<BString> {
        self.registry
            .indices()
            .map(|ix| {
                let path = self.walk(ix);
                self.spell(&path[1..])
            })
            .collect()
    }

    /// Same as [`sequences`](Self::sequences), rebuilt in parallel.
    pub fn par_sequences(&self) -> Vec<BString> {
        let indices: Vec<usize> = self.registry.indices().collect();
        indices
            .into_par_iter()
            .map(|ix| {
                let path = self.walk(ix);
                self.spell(&path[1..])
            })
            .collect()
    }

    /// Adds the synthetic end node, linked from every node where a
    /// sequence ends, and returns its id. Calling it again returns the
    /// existing end.
    pub fn attach_end(&mut self) -> NodeId {
        if let Some(end) = self.end {
            return end;
        }

        let end = NodeId::from(self.nodes.len());
        let k = self.kmer_length;
        let registry = &self.registry;

        let mut linked = 0;
        for node in self.nodes.iter_mut() {
            if node.ends.is_empty() {
                continue;
            }
            let traversals = node
                .ends
                .iter()
                .map(|&seq| {
                    let length = registry.length(seq).unwrap_or(0);
                    Traversal::new(seq, kmer_count(length, k))
                })
                .collect();
            node.edges.push(PogEdge {
                target: end,
                traversals,
            });
            linked += 1;
        }

        let everything: SequenceSet = self.registry.indices().collect();
        self.nodes.push(PogNode::sentinel(everything));
        self.end = Some(end);

        debug!("attached end node {} to {} nodes", end, linked);
        end
    }

    /// Follows the first edge out of `start` until a node covering
    /// every sequence through `start` is found.
    fn closing_node(&self, start: NodeId) -> Result<NodeId> {
        let wanted = &self.nodes[start.ix()].sequence_set;
        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        visited.insert(start);

        let mut current = start;
        loop {
            let next = match self.nodes[current.ix()].edges.first() {
                Some(edge) => edge.target,
                None => return Err(GraphError::UnclosedBubble { start }),
            };
            if !visited.insert(next) {
                return Err(GraphError::UnclosedBubble { start });
            }
            if self.nodes[next.ix()].sequence_set.is_superset(wanted) {
                return Ok(next);
            }
            current = next;
        }
    }

    /// The bubble starting at `node`, with the bubbles found by
    /// repeatedly descending into the first child nested inside it.
    ///
    /// Returns `None` if `node` has no outgoing edges.
    pub fn bubble(&self, node: NodeId, depth: usize) -> Result<Option<PogBubble>> {
        if self.node(node).is_none() {
            return Ok(None);
        }

        let mut frames: Vec<PogBubble> = Vec::new();
        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut current = node;
        let mut level = depth;

        loop {
            if !visited.insert(current) {
                return Err(GraphError::UnclosedBubble { start: current });
            }
            let braids = self.braids(current);
            match braids.len() {
                0 => break,
                1 => {
                    frames.push(PogBubble::new(current, braids[0].target, level));
                    break;
                }
                _ => {
                    let end = self.closing_node(current)?;
                    frames.push(PogBubble::new(current, end, level));

                    let first = braids[0].target;
                    if first == end || Some(first) == self.end {
                        break;
                    }
                    current = first;
                    level += 1;
                }
            }
        }

        let mut inner: Option<PogBubble> = None;
        while let Some(mut frame) = frames.pop() {
            frame.inner_bubbles.extend(inner.take());
            inner = Some(frame);
        }
        Ok(inner)
    }

    /// The top-level bubbles along the graph, from the root onwards.
    ///
    /// Linear stretches are skipped; at every split the bubble is
    /// recorded and the walk resumes from where it closes. Divergent
    /// tails only close after [`attach_end`](Self::attach_end).
    pub fn bubbles(&self) -> Result<Vec<PogBubble>> {
        let mut bubbles = Vec::new();
        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut current = NodeId::ROOT;

        loop {
            if !visited.insert(current) {
                return Err(GraphError::UnclosedBubble { start: current });
            }
            let braids = self.braids(current);
            match braids.len() {
                0 => break,
                1 => current = braids[0].target,
                _ => match self.bubble(current, 0)? {
                    Some(bubble) => {
                        current = bubble.end;
                        bubbles.push(bubble);
                    }
                    None => break,
                },
            }
        }

        trace!("found {} top-level bubbles", bubbles.len());
        Ok(bubbles)
    }

    pub fn work(&self, method: AlignmentMethod) -> Result<u128> {
        let value = match method {
            AlignmentMethod::Exact => work::exact(self.registry.lengths()),
            AlignmentMethod::Progressive => work::progressive(self.registry.lengths()),
            AlignmentMethod::DbgLength => self.node_count() as u128,
            AlignmentMethod::DbgLengthNumber => self
                .fragment_nodes()
                .map(|n| n.sequence_set.len() as u128)
                .fold(0u128, |acc, n| acc.saturating_add(n)),
        };
        Ok(value)
    }

    /// Mean fragment length in units of k.
    pub fn compression_ratio(&self) -> f64 {
        let (count, total) = self
            .fragment_nodes()
            .fold((0usize, 0usize), |(c, t), n| (c + 1, t + n.fragment.len()));
        if count == 0 {
            return 0.0;
        }
        (total as f64 / count as f64) / self.kmer_length as f64
    }

    /// The braids of `node`, narrowed to the sequences in `within`.
    fn braids_within(&self, node: NodeId, within: &SequenceSet) -> Vec<Braid> {
        self.braids(node)
            .into_iter()
            .filter_map(|braid| {
                let sequences: SequenceSet =
                    braid.sequences.intersection(within).copied().collect();
                if sequences.is_empty() {
                    None
                } else {
                    Some(Braid {
                        target: braid.target,
                        sequences,
                    })
                }
            })
            .collect()
    }

    /// Like `closing_node`, but only following and covering the
    /// sequences in `within`.
    fn closing_node_within(&self, start: NodeId, within: &SequenceSet) -> Result<NodeId> {
        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        visited.insert(start);

        let mut current = start;
        loop {
            let next = match self.braids_within(current, within).first() {
                Some(braid) => braid.target,
                None => return Err(GraphError::UnclosedBubble { start }),
            };
            if !visited.insert(next) {
                return Err(GraphError::UnclosedBubble { start });
            }
            if self.nodes[next.ix()].sequence_set.is_superset(within) {
                return Ok(next);
            }
            current = next;
        }
    }

    /// The symbols spelled by `node` when entered from `from`.
    fn contribution(&self, from: NodeId, node: NodeId) -> &[u8] {
        let node = &self.nodes[node.ix()];
        if from.is_root() {
            &node.fragment
        } else {
            node.suffix(self.overlap())
        }
    }

    /// Schedules everything the sequences in `within` spell strictly
    /// between leaving `from` and arriving at `to`, and returns it as
    /// a list of pieces. Splits on the way are aligned branch by
    /// branch, and each branch is scheduled the same way first, so
    /// nested splits reach the buffer before the split that holds them.
    fn schedule<P>(
        &self,
        buffer: &mut AlignmentBuffer<'_, P>,
        from: NodeId,
        to: NodeId,
        within: &SequenceSet,
        open: &mut FnvHashSet<NodeId>,
    ) -> Result<Vec<Piece>>
    where
        P: AlignmentPlugin,
    {
        let mut pieces: Vec<Piece> = Vec::new();
        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut current = from;

        loop {
            if !visited.insert(current) {
                return Err(GraphError::UnclosedBubble { start: current });
            }
            let braids = self.braids_within(current, within);

            if braids.len() == 1 {
                let next = braids[0].target;
                if next == to {
                    break;
                }
                Piece::push_literal(&mut pieces, self.contribution(current, next));
                current = next;
                continue;
            }
            if braids.is_empty() {
                return Err(GraphError::UnclosedBubble { start: current });
            }

            let covered: SequenceSet = braids
                .iter()
                .flat_map(|b| b.sequences.iter().copied())
                .collect();
            let join = self.closing_node_within(current, &covered)?;

            // a split nested inside itself only happens on a cycle
            if !open.insert(current) {
                return Err(GraphError::UnclosedBubble { start: current });
            }
            let mut branches: Vec<Piece> = Vec::with_capacity(braids.len());
            for braid in braids.iter() {
                let mut inner = Vec::new();
                if braid.target != join {
                    Piece::push_literal(&mut inner, self.contribution(current, braid.target));
                    let rest =
                        self.schedule(buffer, braid.target, join, &braid.sequences, open)?;
                    Piece::append(&mut inner, rest);
                }
                branches.push(Piece::collapse(buffer, inner)?);
            }
            open.remove(&current);

            let mut ix = buffer.add_alignment(branches[0].operand(), branches[1].operand())?;
            for branch in branches.iter().skip(2) {
                ix = buffer.add_alignment(branch.operand(), ix)?;
            }
            trace!(
                "aligned {} branches between {} and {} into {}",
                branches.len(),
                current,
                join,
                ix
            );

            pieces.push(Piece::Profile(ix));
            if join == to {
                break;
            }
            Piece::push_literal(&mut pieces, self.nodes[join.ix()].suffix(self.overlap()));
            current = join;
        }

        Ok(pieces)
    }

    /// Schedules the alignment of the whole graph through `buffer`.
    ///
    /// Linear stretches become literal pieces. At every split, each
    /// branch is built from its own pieces, with any split nested in
    /// it aligned first, and the branches are then aligned
    /// progressively. The pieces are finally concatenated, and the
    /// index of that result is returned.
    pub fn align<P>(&mut self, buffer: &mut AlignmentBuffer<'_, P>) -> Result<usize>
    where
        P: AlignmentPlugin,
    {
        let end = self.attach_end();
        let everything: SequenceSet = self.registry.indices().collect();

        let mut open: FnvHashSet<NodeId> = FnvHashSet::default();
        let pieces = self.schedule(buffer, NodeId::ROOT, end, &everything, &mut open)?;
        let operands: Vec<Operand<'_>> = pieces.iter().map(Piece::operand).collect();
        buffer.concatenate(&operands)
    }
}

impl Piece {
    fn push_literal(pieces: &mut Vec<Piece>, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match pieces.last_mut() {
            Some(Piece::Literal(lit)) => lit.extend_from_slice(bytes),
            _ => pieces.push(Piece::Literal(bytes.to_vec())),
        }
    }

    fn append(pieces: &mut Vec<Piece>, rest: Vec<Piece>) {
        for piece in rest {
            match piece {
                Piece::Literal(bytes) => Piece::push_literal(pieces, &bytes),
                profile => pieces.push(profile),
            }
        }
    }

    /// Reduces the pieces of one branch to a single operand, through
    /// a concatenation if the branch holds a profile.
    fn collapse<P>(buffer: &mut AlignmentBuffer<'_, P>, mut pieces: Vec<Piece>) -> Result<Piece>
    where
        P: AlignmentPlugin,
    {
        match pieces.len() {
            0 => Ok(Piece::Literal(Vec::new())),
            1 => Ok(pieces.remove(0)),
            _ => {
                let operands: Vec<Operand<'_>> = pieces.iter().map(Piece::operand).collect();
                buffer.concatenate(&operands).map(Piece::Profile)
            }
        }
    }

    fn operand(&self) -> Operand<'_> {
        match self {
            Piece::Literal(bytes) => Operand::Sequence(bytes),
            Piece::Profile(ix) => Operand::Profile(*ix),
        }
    }
}

/*!
A de Bruijn graph over a set of sequences, with enough per-edge
bookkeeping to reconstruct every ingested sequence exactly.

Nodes live in an arena and are addressed by [`NodeId`]; node 0 is the
root sentinel that every sequence starts from. A k-mer table maps each
k-mer to its one node, so a k-mer that occurs twice (in one sequence or
across several) is visited twice, which is how cycles and shared runs
appear.

Each edge carries a list of [`Traversal`]s. A sequence never has two
traversals on the same edge: revisiting an edge opens a parallel one,
so the passage order of every sequence stays recoverable.
*/

use bstr::BString;
use fnv::{FnvHashMap, FnvHashSet};

use log::{debug, trace};

use crate::{
    alphabet::{MolType, DNA},
    compress::Compressor,
    error::{GraphError, Result, SequenceKey},
    handle::{Braid, NodeId, Traversal},
    input::{SequenceInput, SequenceRecord},
    kmer::kmers,
    pog::PartialOrderGraph,
    registry::SequenceRegistry,
    work::{self, AlignmentMethod},
};

pub mod node;

pub use self::node::{DbgEdge, DbgNode};

#[derive(Debug)]
pub struct DeBruijnGraph {
    pub(crate) kmer_length: usize,
    pub(crate) moltype: Box<dyn MolType>,
    pub(crate) nodes: Vec<DbgNode>,
    pub(crate) kmers: FnvHashMap<Vec<u8>, NodeId>,
    pub(crate) registry: SequenceRegistry,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    OnStack,
    Done,
}

impl DeBruijnGraph {
    /// Creates an empty DNA graph with k-mers of length `k`.
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> DeBruijnGraph {
        Self::with_moltype(k, DNA)
    }

    pub fn with_moltype<M>(k: usize, moltype: M) -> DeBruijnGraph
    where
        M: MolType + 'static,
    {
        assert!(k > 0, "k-mer length must be positive");
        DeBruijnGraph {
            kmer_length: k,
            moltype: Box::new(moltype),
            nodes: vec![DbgNode::root()],
            kmers: FnvHashMap::default(),
            registry: SequenceRegistry::new(),
        }
    }

    #[inline]
    pub fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    pub fn moltype(&self) -> &dyn MolType {
        self.moltype.as_ref()
    }

    /// Number of ingested sequences.
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

    pub fn index_for_name(&self, name: &str) -> Result<usize> {
        self.registry.resolve(&SequenceKey::from(name))
    }

    pub fn length_for_name(&self, name: &str) -> Result<usize> {
        let index = self.index_for_name(name)?;
        self.registry.length(index)
    }

    pub fn sequence_length(&self, index: usize) -> Result<usize> {
        self.registry.length(index)
    }

    pub fn root(&self) -> &DbgNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&DbgNode> {
        self.nodes.get(id.ix())
    }

    pub fn node_for_kmer(&self, kmer: &[u8]) -> Option<NodeId> {
        self.kmers.get(kmer).copied()
    }

    /// Number of k-mer nodes, not counting the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Adds one or more sequences and returns the indices assigned to
    /// them. A batch is checked in full, names included, before any of
    /// it is ingested.
    ///
    /// Unnamed sequences are called `Sequence_<index>`. If that name is
    /// already taken, the first free `Sequence_<index>.<n>` is used.
    pub fn add_sequence<I>(&mut self, input: I) -> Result<Vec<usize>>
    where
        I: Into<SequenceInput>,
    {
        let records = input.into().into_records()?;

        let mut taken: FnvHashSet<String> = FnvHashSet::default();
        for record in records.iter() {
            self.check_record(record)?;
            if let Some(name) = record.name.as_deref() {
                if self.registry.contains_name(name) || !taken.insert(name.to_string()) {
                    return Err(GraphError::DuplicateName(name.to_string()));
                }
            }
        }

        let first_index = self.registry.next_index();
        let mut names: Vec<String> = Vec::with_capacity(records.len());
        for (offset, record) in records.iter().enumerate() {
            let name = match record.name.as_ref() {
                Some(name) => name.clone(),
                None => {
                    let name = self.default_name(first_index + offset, &taken);
                    taken.insert(name.clone());
                    name
                }
            };
            names.push(name);
        }

        let mut indices = Vec::with_capacity(records.len());
        for (record, name) in records.iter().zip(names.iter()) {
            indices.push(self.ingest(record, name)?);
        }
        Ok(indices)
    }

    fn check_record(&self, record: &SequenceRecord) -> Result<()> {
        self.moltype.verify(&record.sequence)?;
        if record.sequence.len() < self.kmer_length {
            return Err(GraphError::Length {
                length: record.sequence.len(),
                k: self.kmer_length,
            });
        }
        Ok(())
    }

    fn default_name(&self, index: usize, taken: &FnvHashSet<String>) -> String {
        let is_free =
            |name: &str| !self.registry.contains_name(name) && !taken.contains(name);

        let name = format!("Sequence_{}", index);
        if is_free(&name) {
            return name;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{}.{}", name, suffix);
            if is_free(&candidate) {
                trace!("default name {} is taken, using {}", name, candidate);
                return candidate;
            }
            suffix += 1;
        }
    }

    fn ingest(&mut self, record: &SequenceRecord, name: &str) -> Result<usize> {
        let index = self
            .registry
            .register(Some(name), record.sequence.len())?;

        let mut current = NodeId::ROOT;
        for (passage, kmer) in kmers(&record.sequence, self.kmer_length).enumerate() {
            let next = self.get_or_create(kmer);
            self.add_edge(current, next, Traversal::new(index, passage));
            current = next;
        }
        self.nodes[current.ix()].ends.push(index);

        debug!(
            "ingested sequence {} as {} ({} bp), graph has {} nodes",
            index,
            name,
            record.sequence.len(),
            self.node_count()
        );
        Ok(index)
    }

    fn get_or_create(&mut self, kmer: &[u8]) -> NodeId {
        if let Some(&id) = self.kmers.get(kmer) {
            return id;
        }
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(DbgNode::new(kmer));
        self.kmers.insert(kmer.to_vec(), id);
        id
    }

    /// Records a traversal from `from` to `to`. An edge to the same
    /// target is extended unless it already carries this sequence, in
    /// which case the next parallel edge without it is used, or a new
    /// one is opened.
    fn add_edge(&mut self, from: NodeId, to: NodeId, traversal: Traversal) {
        let source = &mut self.nodes[from.ix()];
        let is_new_parent = !source.has_edge_to(to);

        let free_edge = source
            .edges
            .iter_mut()
            .find(|e| e.target == to && !e.carries_sequence(traversal.sequence));

        match free_edge {
            Some(edge) => edge.traversals.push(traversal),
            None => {
                if !is_new_parent {
                    trace!("parallel edge {} -> {} for {}", from, to, traversal);
                }
                source.edges.push(DbgEdge::new(to, traversal));
                if is_new_parent {
                    self.nodes[to.ix()].parents += 1;
                }
            }
        }
    }

    /// Returns true if some node can be reached from itself. Labels on
    /// the edges are ignored.
    pub fn has_cycles(&self) -> bool {
        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        let mut stack: Vec<(NodeId, usize)> = vec![(NodeId::ROOT, 0)];
        marks[0] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let (node, edge_ix) = *top;
            match self.nodes[node.ix()].edges.get(edge_ix) {
                Some(edge) => {
                    top.1 += 1;
                    let target = edge.target;
                    match marks[target.ix()] {
                        Mark::OnStack => return true,
                        Mark::Unseen => {
                            marks[target.ix()] = Mark::OnStack;
                            stack.push((target, 0));
                        }
                        Mark::Done => (),
                    }
                }
                None => {
                    marks[node.ix()] = Mark::Done;
                    stack.pop();
                }
            }
        }
        false
    }

    /// Returns true if any node splits into more than one distinct
    /// target.
    pub fn has_bubbles(&self) -> bool {
        self.nodes.iter().any(|n| n.braids().len() > 1)
    }

    pub fn braids(&self, node: NodeId) -> Vec<Braid> {
        self.node(node).map(DbgNode::braids).unwrap_or_default()
    }

    /// Reconstructs a sequence from its index or name.
    pub fn get<K: Into<SequenceKey>>(&self, key: K) -> Result<BString> {
        let index = self.registry.resolve(&key.into())?;
        Ok(self.walk(index))
    }

    pub fn sequence(&self, index: usize) -> Result<BString> {
        self.get(index)
    }

    /// All sequences, in index order.
    pub fn sequences(&self) -> Vec<BString> {
        self.registry.indices().map(|ix| self.walk(ix)).collect()
    }

    fn walk(&self, index: usize) -> BString {
        let capacity = self.registry.length(index).unwrap_or(0);
        let mut seq: Vec<u8> = Vec::with_capacity(capacity);

        let mut node = self.root();
        let mut passage = 0;
        while let Some(edge) = node.edge_for(index, passage) {
            let next = &self.nodes[edge.target.ix()];
            let kmer = next.kmer();
            if passage == 0 {
                seq.extend_from_slice(kmer);
            } else if let Some(&last) = kmer.last() {
                seq.push(last);
            }
            node = next;
            passage += 1;
        }
        seq.into()
    }

    /// Reconstructs at most `length` symbols of a sequence, starting at
    /// the k-mer with passage `start`.
    pub fn subsequence(&self, index: usize, start: usize, length: usize) -> Result<BString> {
        let index = self.registry.resolve(&SequenceKey::Index(index))?;
        let mut seq: Vec<u8> = Vec::with_capacity(length);

        let first = self
            .nodes
            .iter()
            .flat_map(|n| n.edges.iter())
            .find(|e| e.carries(index, start))
            .map(|e| e.target);

        if let Some(first) = first {
            let mut node = &self.nodes[first.ix()];
            seq.extend_from_slice(node.kmer());
            let mut passage = start + 1;
            while seq.len() < length {
                let edge = match node.edge_for(index, passage) {
                    Some(edge) => edge,
                    None => break,
                };
                node = &self.nodes[edge.target.ix()];
                if let Some(&last) = node.kmer().last() {
                    seq.push(last);
                }
                passage += 1;
            }
        }

        seq.truncate(length);
        Ok(seq.into())
    }

    /// Estimated alignment work. Only the methods that need no graph
    /// structure are available before compression.
    pub fn work(&self, method: AlignmentMethod) -> Result<u128> {
        match method {
            AlignmentMethod::Exact => Ok(work::exact(self.registry.lengths())),
            AlignmentMethod::Progressive => {
                Ok(work::progressive(self.registry.lengths()))
            }
            other => Err(GraphError::NotCompressed(other)),
        }
    }

    /// Merges every maximal unbranched run into a single node,
    /// consuming the graph.
    pub fn compress(self) -> PartialOrderGraph {
        Compressor::new(self).compress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_seqs() -> DeBruijnGraph {
        let mut graph = DeBruijnGraph::new(3);
        graph
            .add_sequence(vec![
                ("seq1", "ACAGTACGGCAT"),
                ("seq2", "ACAGTACTGGCAT"),
                ("seq3", "ACAGCGCAT"),
            ])
            .unwrap();
        graph
    }

    #[test]
    fn kmers_are_shared() {
        let graph = three_seqs();
        // seq1 has 10 k-mers, seq2 adds ACT, CTG, TGG and seq3 adds
        // AGC, GCG, CGC
        assert_eq!(graph.node_count(), 16);

        let aca = graph.node_for_kmer(b"ACA").unwrap();
        let root_edges = &graph.root().edges;
        assert_eq!(root_edges.len(), 1);
        assert_eq!(root_edges[0].target, aca);
        assert_eq!(root_edges[0].traversals.len(), 3);
    }

    #[test]
    fn parent_counts() {
        let graph = three_seqs();
        let parents = |kmer: &[u8]| {
            let id = graph.node_for_kmer(kmer).unwrap();
            graph.node(id).unwrap().parents
        };
        assert_eq!(parents(b"ACA"), 1);
        assert_eq!(parents(b"GGC"), 2);
        assert_eq!(parents(b"GCA"), 2);
        assert_eq!(parents(b"CAT"), 1);
    }

    #[test]
    fn ends_are_recorded() {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_sequence(vec!["ACGT", "ACGTA"]).unwrap();
        let cgt = graph.node_for_kmer(b"CGT").unwrap();
        let gta = graph.node_for_kmer(b"GTA").unwrap();
        assert_eq!(graph.node(cgt).unwrap().ends, vec![1]);
        assert_eq!(graph.node(gta).unwrap().ends, vec![2]);
    }

    #[test]
    fn repeated_edge_opens_parallel_edge() {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_sequence("AAAAA").unwrap();

        let aaa = graph.node_for_kmer(b"AAA").unwrap();
        let node = graph.node(aaa).unwrap();
        assert_eq!(node.edges.len(), 2);
        assert!(node.edges.iter().all(|e| e.target == aaa));
        // root and itself
        assert_eq!(node.parents, 2);
        assert_eq!(node.braids().len(), 1);

        assert_eq!(graph.sequence(1).unwrap(), "AAAAA");
        assert!(graph.has_cycles());
    }

    #[test]
    fn second_sequence_reuses_parallel_edges() {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_sequence(vec!["AAAAA", "AAAA"]).unwrap();

        let aaa = graph.node_for_kmer(b"AAA").unwrap();
        let node = graph.node(aaa).unwrap();
        assert_eq!(node.edges.len(), 2);
        assert_eq!(node.edges[0].traversals.len(), 2);
        assert_eq!(node.edges[1].traversals.len(), 1);

        assert_eq!(graph.sequence(1).unwrap(), "AAAAA");
        assert_eq!(graph.sequence(2).unwrap(), "AAAA");
    }

    #[test]
    fn failed_batch_leaves_graph_untouched() {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_sequence("ACGT").unwrap();
        let nodes_before = graph.node_count();

        let res = graph.add_sequence(vec!["ACGTT", "AC"]);
        assert_eq!(res, Err(GraphError::Length { length: 2, k: 3 }));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node_count(), nodes_before);

        let res = graph.add_sequence(vec![("x", "ACGTT"), ("x", "ACGTA")]);
        assert_eq!(res, Err(GraphError::DuplicateName("x".to_string())));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn subsequence_from_passage() {
        let mut graph = DeBruijnGraph::new(3);
        graph
            .add_sequence(vec![("seq1", "ACGTGAC"), ("seq2", "TACGTGA")])
            .unwrap();
        assert_eq!(graph.subsequence(1, 1, 4).unwrap(), "CGTG");
        assert_eq!(graph.subsequence(2, 0, 100).unwrap(), "TACGTGA");
        assert_eq!(graph.subsequence(2, 40, 3).unwrap(), "");
        assert!(graph.subsequence(3, 0, 3).is_err());
    }

    #[test]
    fn work_before_compression() {
        let graph = three_seqs();
        assert_eq!(graph.work(AlignmentMethod::Exact), Ok(12 * 13 * 9));
        assert_eq!(
            graph.work(AlignmentMethod::Progressive),
            Ok(9 * 12 + 12 * 13)
        );
        assert_eq!(
            graph.work(AlignmentMethod::DbgLength),
            Err(GraphError::NotCompressed(AlignmentMethod::DbgLength))
        );
    }
}

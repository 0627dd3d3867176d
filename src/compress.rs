/*!
Compression of a [`DeBruijnGraph`] into a [`PartialOrderGraph`].

Every maximal unbranched run of k-mer nodes is merged into the run's
first node, whose fragment grows by the last symbol of each absorbed
k-mer. The surviving nodes are then renumbered densely.

A candidate node extends a run only if it has exactly one outgoing edge,
no sequence ends at it, and that edge leads to a node other than the
root that has a single parent and is not yet part of the run. A k-mer's
sole parent always existed before the k-mer itself, so visiting nodes in
ascending id order reaches the start of every run before its interior.
*/

use bstr::BString;
use fnv::FnvHashSet;

use log::{debug, trace};

use crate::{
    alphabet::MolType,
    debruijn::{DbgEdge, DeBruijnGraph},
    handle::{NodeId, SequenceSet, Traversal},
    pog::{PartialOrderGraph, PogEdge, PogNode},
    registry::SequenceRegistry,
};

/// A node being compressed.
#[derive(Debug, Clone)]
struct Unitig {
    fragment: Vec<u8>,
    span: usize,
    edges: Vec<DbgEdge>,
    parents: usize,
    ends: Vec<usize>,
}

pub(crate) struct Compressor {
    kmer_length: usize,
    moltype: Box<dyn MolType>,
    registry: SequenceRegistry,
    unitigs: Vec<Unitig>,
    absorbed: Vec<bool>,
}

impl Compressor {
    pub(crate) fn new(graph: DeBruijnGraph) -> Self {
        let DeBruijnGraph {
            kmer_length,
            moltype,
            nodes,
            registry,
            ..
        } = graph;

        let unitigs: Vec<Unitig> = nodes
            .into_iter()
            .map(|node| {
                let span = if node.kmer.is_some() { 1 } else { 0 };
                Unitig {
                    fragment: node.kmer.unwrap_or_default(),
                    span,
                    edges: node.edges,
                    parents: node.parents,
                    ends: node.ends,
                }
            })
            .collect();

        let absorbed = vec![false; unitigs.len()];

        Compressor {
            kmer_length,
            moltype,
            registry,
            unitigs,
            absorbed,
        }
    }

    fn extends_to(&self, node: NodeId) -> Option<NodeId> {
        let unitig = &self.unitigs[node.ix()];
        if unitig.edges.len() != 1 || !unitig.ends.is_empty() {
            return None;
        }
        let target = unitig.edges[0].target;
        if target.is_root() || target == node {
            return None;
        }
        if self.unitigs[target.ix()].parents != 1 {
            return None;
        }
        Some(target)
    }

    /// The maximal run starting at `node`, `node` included.
    pub(crate) fn run(&self, node: NodeId) -> Vec<NodeId> {
        let mut run = vec![node];
        if node.is_root() {
            return run;
        }

        let mut visited: FnvHashSet<NodeId> = FnvHashSet::default();
        visited.insert(node);

        let mut current = node;
        while let Some(next) = self.extends_to(current) {
            if !visited.insert(next) {
                trace!("run from {} wraps onto {}", node, next);
                break;
            }
            run.push(next);
            current = next;
        }
        run
    }

    /// Folds `run` into its first node.
    pub(crate) fn merge(&mut self, run: &[NodeId]) {
        let (base, rest) = match run.split_first() {
            Some((&base, rest)) if !rest.is_empty() => (base, rest),
            _ => return,
        };

        let mut fragment = std::mem::take(&mut self.unitigs[base.ix()].fragment);
        for &id in rest {
            if let Some(&last) = self.unitigs[id.ix()].fragment.last() {
                fragment.push(last);
            }
            self.absorbed[id.ix()] = true;
        }

        let last = &mut self.unitigs[rest[rest.len() - 1].ix()];
        let edges = std::mem::take(&mut last.edges);
        let ends = std::mem::take(&mut last.ends);

        let unitig = &mut self.unitigs[base.ix()];
        unitig.fragment = fragment;
        unitig.span = run.len();
        unitig.edges = edges;
        unitig.ends = ends;
    }

    pub(crate) fn compress(mut self) -> PartialOrderGraph {
        let before = self.unitigs.len() - 1;

        for ix in 1..self.unitigs.len() {
            if self.absorbed[ix] {
                continue;
            }
            let run = self.run(NodeId::from(ix));
            if run.len() > 1 {
                trace!("merging run of {} nodes into {}", run.len(), ix);
                self.merge(&run);
            }
        }

        let graph = self.finish();
        debug!(
            "compressed {} k-mer nodes into {} nodes",
            before,
            graph.node_count()
        );
        graph
    }

    /// Renumbers the surviving nodes and builds the per-node sequence
    /// sets.
    fn finish(self) -> PartialOrderGraph {
        let Compressor {
            kmer_length,
            moltype,
            registry,
            unitigs,
            absorbed,
        } = self;

        let mut new_ids: Vec<Option<NodeId>> = vec![None; unitigs.len()];
        let mut next = 0usize;
        for (ix, &gone) in absorbed.iter().enumerate() {
            if !gone {
                new_ids[ix] = Some(NodeId::from(next));
                next += 1;
            }
        }

        let mut sequence_sets: Vec<SequenceSet> = vec![SequenceSet::default(); next];
        sequence_sets[0] = registry.indices().collect();

        let mut nodes: Vec<PogNode> = Vec::with_capacity(next);
        for (unitig, gone) in unitigs.into_iter().zip(absorbed) {
            if gone {
                continue;
            }
            let edges: Vec<PogEdge> = unitig
                .edges
                .into_iter()
                .filter_map(|edge| {
                    let target = new_ids[edge.target.ix()]?;
                    Some(PogEdge {
                        target,
                        traversals: edge.traversals,
                    })
                })
                .collect();

            for edge in edges.iter() {
                sequence_sets[edge.target.ix()]
                    .extend(edge.traversals.iter().map(|t: &Traversal| t.sequence));
            }

            nodes.push(PogNode {
                fragment: BString::from(unitig.fragment),
                span: unitig.span,
                sequence_set: SequenceSet::default(),
                edges,
                ends: unitig.ends,
            });
        }

        for (node, set) in nodes.iter_mut().zip(sequence_sets) {
            node.sequence_set = set;
        }

        PartialOrderGraph::from_parts(kmer_length, moltype, registry, nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dbg(seqs: Vec<&str>) -> DeBruijnGraph {
        let mut graph = DeBruijnGraph::new(3);
        graph.add_sequence(seqs).unwrap();
        graph
    }

    #[test]
    fn linear_sequence_is_one_run() {
        let graph = dbg(vec!["ACGTTGCA"]);
        let first = graph.node_for_kmer(b"ACG").unwrap();
        let compressor = Compressor::new(graph);

        assert_eq!(compressor.run(first).len(), 6);
        assert_eq!(compressor.run(NodeId::ROOT), vec![NodeId::ROOT]);

        let pog = compressor.compress();
        assert_eq!(pog.node_count(), 1);
        assert_eq!(pog.node(NodeId(1)).unwrap().fragment, "ACGTTGCA");
        assert_eq!(pog.node(NodeId(1)).unwrap().span, 6);
    }

    #[test]
    fn runs_stop_at_sequence_ends() {
        let graph = dbg(vec!["ACGTT", "ACGTTGC"]);
        let first = graph.node_for_kmer(b"ACG").unwrap();
        let compressor = Compressor::new(graph);

        // ACG CGT GTT, then GTT is where sequence 1 ends
        assert_eq!(compressor.run(first).len(), 3);

        let pog = compressor.compress();
        assert_eq!(pog.node_count(), 2);
        assert_eq!(pog.sequence(1).unwrap(), "ACGTT");
        assert_eq!(pog.sequence(2).unwrap(), "ACGTTGC");
    }

    #[test]
    fn split_and_join_are_kept() {
        let graph = dbg(vec!["ACGTACG", "ACGCACG"]);
        let compressor = Compressor::new(graph);
        let pog = compressor.compress();

        // ACG is revisited by both sequences, so it keeps two parents
        // and stays a node of its own
        assert!(pog.node_count() >= 3);
        assert_eq!(pog.sequence(1).unwrap(), "ACGTACG");
        assert_eq!(pog.sequence(2).unwrap(), "ACGCACG");
    }

    #[test]
    fn single_node_run_is_left_alone() {
        let graph = dbg(vec!["ACGTT", "CCGTA"]);
        let cgt = graph.node_for_kmer(b"CGT").unwrap();
        let acg = graph.node_for_kmer(b"ACG").unwrap();
        let mut compressor = Compressor::new(graph);

        // CGT has two parents and two children
        assert_eq!(compressor.run(acg), vec![acg]);

        let run = compressor.run(cgt);
        assert_eq!(run, vec![cgt]);

        compressor.merge(&run);
        assert!(!compressor.absorbed[cgt.ix()]);
        assert_eq!(compressor.unitigs[cgt.ix()].span, 1);
    }

    #[test]
    fn merge_moves_edges_to_base() {
        // the runs rejoin at GCA, which keeps two parents
        let graph = dbg(vec!["ACGTTGCA", "ACGTAGCA"]);
        let gtt = graph.node_for_kmer(b"GTT").unwrap();
        let ttg = graph.node_for_kmer(b"TTG").unwrap();
        let tgc = graph.node_for_kmer(b"TGC").unwrap();
        let mut compressor = Compressor::new(graph);

        let run = compressor.run(gtt);
        assert_eq!(run, vec![gtt, ttg, tgc]);

        let moved = compressor.unitigs[tgc.ix()].edges.clone();
        assert_eq!(moved.len(), 1);

        compressor.merge(&run);

        let base = &compressor.unitigs[gtt.ix()];
        assert_eq!(base.fragment, b"GTTGC");
        assert_eq!(base.span, 3);
        assert_eq!(base.edges, moved);
        assert!(compressor.unitigs[tgc.ix()].edges.is_empty());

        assert!(!compressor.absorbed[gtt.ix()]);
        assert!(compressor.absorbed[ttg.ix()]);
        assert!(compressor.absorbed[tgc.ix()]);
    }

    #[test]
    fn merge_moves_ends_to_base() {
        let graph = dbg(vec!["ACGTTGCA", "ACGTAG"]);
        let gtt = graph.node_for_kmer(b"GTT").unwrap();
        let gca = graph.node_for_kmer(b"GCA").unwrap();
        let mut compressor = Compressor::new(graph);

        let run = compressor.run(gtt);
        assert_eq!(run.len(), 4);
        assert_eq!(run.last(), Some(&gca));

        compressor.merge(&run);

        let base = &compressor.unitigs[gtt.ix()];
        assert_eq!(base.fragment, b"GTTGCA");
        assert_eq!(base.span, 4);
        assert_eq!(base.ends, vec![1]);
        assert!(base.edges.is_empty());
        assert!(compressor.unitigs[gca.ix()].ends.is_empty());
        assert!(run[1..].iter().all(|id| compressor.absorbed[id.ix()]));
    }
}

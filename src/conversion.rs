/*!
Enumeration of graph contents for external renderers, and conversion
to GFA.

Both graphs implement [`GraphExport`]. The root and the synthetic end
node carry no sequence and are left out of GFA segments, along with
any link touching them.
*/

use gfa::gfa::{Link, Orientation, Segment, GFA};

use bstr::BString;

use crate::{
    debruijn::DeBruijnGraph,
    handle::NodeId,
    pog::PartialOrderGraph,
};

/// A link between two nodes, as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLink {
    pub source: NodeId,
    /// Position of the edge among the source's outgoing edges.
    pub ordinal: usize,
    pub target: NodeId,
    /// Number of sequence passages over the edge.
    pub traversals: usize,
}

pub trait GraphExport {
    /// Every node with its label. Sentinels have empty labels.
    fn export_nodes(&self) -> Vec<(NodeId, BString)>;

    fn export_links(&self) -> Vec<ExportLink>;

    /// Number of symbols shared by linked labels.
    fn overlap(&self) -> usize;
}

impl GraphExport for DeBruijnGraph {
    fn export_nodes(&self) -> Vec<(NodeId, BString)> {
        (0..=self.node_count())
            .filter_map(|ix| {
                let id = NodeId::from(ix);
                let node = self.node(id)?;
                Some((id, BString::from(node.kmer())))
            })
            .collect()
    }

    fn export_links(&self) -> Vec<ExportLink> {
        let mut links = Vec::new();
        for ix in 0..=self.node_count() {
            let source = NodeId::from(ix);
            if let Some(node) = self.node(source) {
                for (ordinal, edge) in node.edges.iter().enumerate() {
                    links.push(ExportLink {
                        source,
                        ordinal,
                        target: edge.target,
                        traversals: edge.traversals.len(),
                    });
                }
            }
        }
        links
    }

    fn overlap(&self) -> usize {
        self.kmer_length() - 1
    }
}

impl GraphExport for PartialOrderGraph {
    fn export_nodes(&self) -> Vec<(NodeId, BString)> {
        self.nodes()
            .map(|(id, node)| (id, node.fragment.clone()))
            .collect()
    }

    fn export_links(&self) -> Vec<ExportLink> {
        self.nodes()
            .flat_map(|(source, node)| {
                node.edges
                    .iter()
                    .enumerate()
                    .map(move |(ordinal, edge)| ExportLink {
                        source,
                        ordinal,
                        target: edge.target,
                        traversals: edge.traversals.len(),
                    })
            })
            .collect()
    }

    fn overlap(&self) -> usize {
        PartialOrderGraph::overlap(self)
    }
}

/// Builds a GFA with one segment per labelled node and one link per
/// distinct pair of labelled nodes, with a `(k-1)M` overlap.
pub fn to_gfa<G>(graph: &G) -> GFA<usize, ()>
where
    G: GraphExport,
{
    let mut gfa = GFA::new();

    let mut labelled: Vec<bool> = Vec::new();
    for (id, sequence) in graph.export_nodes() {
        let ix = usize::from(id);
        if labelled.len() <= ix {
            labelled.resize(ix + 1, false);
        }
        if sequence.is_empty() {
            continue;
        }
        labelled[ix] = true;

        let segment = Segment {
            name: ix,
            sequence: sequence.to_vec(),
            optional: (),
        };
        gfa.segments.push(segment);
    }

    let is_labelled = |id: NodeId| labelled.get(usize::from(id)).copied().unwrap_or(false);
    let overlap: Vec<u8> = format!("{}M", graph.overlap()).into_bytes();

    let mut seen: Vec<(NodeId, NodeId)> = Vec::new();
    for link in graph.export_links() {
        if !is_labelled(link.source) || !is_labelled(link.target) {
            continue;
        }
        if seen.contains(&(link.source, link.target)) {
            continue;
        }
        seen.push((link.source, link.target));

        let link = Link {
            from_segment: usize::from(link.source),
            from_orient: Orientation::Forward,
            to_segment: usize::from(link.target),
            to_orient: Orientation::Forward,
            overlap: overlap.clone(),
            optional: (),
        };
        gfa.links.push(link);
    }

    gfa
}

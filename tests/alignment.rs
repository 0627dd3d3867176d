use dbg_align::{
    alignment::{
        AlignmentBuffer, Composite, CostPlugin, CostProfile, LoggedOperand, Operand,
        OperationKind, RecordingPlugin,
    },
    DeBruijnGraph, GraphError, PartialOrderGraph,
};

use bstr::BString;

use quickcheck::{quickcheck, Arbitrary, Gen};

#[test]
fn cost_buffer_chain() {
    let mut plugin = CostPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);

    let first = buffer.add_alignment("CGT", "TACT").unwrap();
    assert_eq!(
        buffer.result(first),
        Ok(&CostProfile::new((12, 12), (4, 7)))
    );

    let second = buffer.add_alignment("AGT", first).unwrap();
    assert_eq!(
        buffer.result(second),
        Ok(&CostProfile::new((36, 36), (4, 10)))
    );

    let third = buffer.add_alignment(first, second).unwrap();
    assert_eq!(
        buffer.result(third),
        Ok(&CostProfile::new((432, 432), (4, 17)))
    );

    let fourth = buffer
        .concatenate(&[Operand::from("AGT"), Operand::from(third), Operand::from("GCAT")])
        .unwrap();
    assert_eq!(
        buffer.result(fourth),
        Ok(&CostProfile::new((0, 0), (11, 24)))
    );

    assert_eq!(buffer.total_cost(), (480, 480));

    let kinds: Vec<_> = buffer.operations().iter().map(|op| op.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::SequenceSequence,
            OperationKind::SequenceProfile,
            OperationKind::ProfileProfile,
            OperationKind::Concatenate,
        ]
    );
    assert_eq!(
        buffer.operations()[1].operands,
        vec![
            LoggedOperand::Sequence(BString::from("AGT")),
            LoggedOperand::Profile(0)
        ]
    );
}

#[test]
fn missing_profile_is_rejected() {
    let mut plugin = CostPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);
    buffer.add_alignment("CGT", "TACT").unwrap();

    assert_eq!(
        buffer.concatenate(&[Operand::from("A"), Operand::Profile(7)]),
        Err(GraphError::ProfileNotFound(7))
    );
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.plugin().records().len(), 1);
}

fn three_sequences() -> PartialOrderGraph {
    let mut graph = DeBruijnGraph::new(3);
    graph
        .add_sequence(vec![
            ("seq1", "ACAGTACGGCAT"),
            ("seq2", "ACAGTACTGGCAT"),
            ("seq3", "ACAGCGCAT"),
        ])
        .unwrap();
    graph.compress()
}

#[test]
fn graph_schedules_branch_alignment() {
    let mut graph = three_sequences();
    let mut plugin = RecordingPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);

    let last = graph.align(&mut buffer).unwrap();
    assert!(graph.end().is_some());
    assert_eq!(last, buffer.len() - 1);
    assert_eq!(buffer.len(), 4);

    // the inner split between seq1 and seq2 goes first
    let inner = Composite::Composite(vec![
        Composite::fragment("GG"),
        Composite::fragment("TGG"),
    ]);
    assert_eq!(buffer.result(0), Ok(&inner));

    // then their shared branch is put together around it
    let branch = Composite::Composite(vec![
        Composite::fragment("TAC"),
        inner,
        Composite::fragment("C"),
    ]);
    assert_eq!(buffer.result(1), Ok(&branch));

    // and aligned to the branch of seq3
    assert_eq!(
        buffer.result(2),
        Ok(&Composite::Composite(vec![
            Composite::fragment("CGC"),
            branch,
        ]))
    );

    let whole = buffer.result(last).unwrap();
    assert_eq!(whole.flatten(), "ACAGCGCTACGGTGGCAT");
    assert_eq!(whole.leaves(), 7);
}

#[test]
fn every_variant_is_scheduled() {
    let mut graph = three_sequences();
    let mut plugin = RecordingPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);
    let last = graph.align(&mut buffer).unwrap();

    let flat = buffer.result(last).unwrap().flatten();
    let flat = flat.to_string();
    // seq1, seq2 and seq3 each keep their own branch
    assert!(flat.contains("TACGG"));
    assert!(flat.contains("TGG"));
    assert!(flat.contains("CGC"));

    let kinds: Vec<_> = buffer.operations().iter().map(|op| op.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::SequenceSequence,
            OperationKind::Concatenate,
            OperationKind::SequenceProfile,
            OperationKind::Concatenate,
        ]
    );
}

#[test]
fn graph_cost_projection() {
    let mut graph = three_sequences();
    let mut plugin = CostPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);

    let last = graph.align(&mut buffer).unwrap();
    assert_eq!(buffer.len(), 4);
    assert_eq!(
        buffer.result(0),
        Ok(&CostProfile::new((6, 6), (3, 5)))
    );
    assert_eq!(
        buffer.result(1),
        Ok(&CostProfile::new((0, 0), (7, 9)))
    );
    assert_eq!(
        buffer.result(2),
        Ok(&CostProfile::new((0, 0), (7, 12)))
    );
    assert_eq!(
        buffer.result(last),
        Ok(&CostProfile::new((0, 0), (13, 18)))
    );
    assert_eq!(buffer.total_cost(), (6, 6));

    // the same schedule, recorded instead of costed
    let mut recorder = RecordingPlugin::new();
    let replayed = buffer.replay(&mut recorder).unwrap();
    assert_eq!(replayed.len(), 4);
    assert_eq!(replayed[3].flatten(), "ACAGCGCTACGGTGGCAT");
}

#[test]
fn split_at_the_root() {
    let mut graph = DeBruijnGraph::new(3);
    graph
        .add_sequence(vec![("a", "TTACGT"), ("b", "GGACGT")])
        .unwrap();
    let mut graph = graph.compress();

    let mut plugin = RecordingPlugin::new();
    let mut buffer = AlignmentBuffer::new(&mut plugin);
    let last = graph.align(&mut buffer).unwrap();

    assert_eq!(
        buffer.result(0),
        Ok(&Composite::Composite(vec![
            Composite::fragment("TTAC"),
            Composite::fragment("GGAC"),
        ]))
    );
    assert_eq!(buffer.result(last).unwrap().flatten(), "TTACGGACGT");
}

const BASES: [u8; 4] = *b"ACGT";

#[derive(Debug, Clone)]
struct Sequence(Vec<u8>);

impl Arbitrary for Sequence {
    fn arbitrary<G: Gen>(g: &mut G) -> Sequence {
        let len = 6 + usize::arbitrary(g) % 40;
        let mut seq = Vec::with_capacity(len);
        for _ in 0..len {
            seq.push(BASES[usize::arbitrary(g) % 4]);
        }
        Sequence(seq)
    }
}

#[derive(Debug, Clone)]
struct Lengths(Vec<usize>);

impl Arbitrary for Lengths {
    fn arbitrary<G: Gen>(g: &mut G) -> Lengths {
        let count = 2 + usize::arbitrary(g) % 8;
        let lengths = (0..count).map(|_| 2 + usize::arbitrary(g) % 500).collect();
        Lengths(lengths)
    }
}

quickcheck! {
    fn prop_single_sequence_aligns_to_itself(seq: Sequence) -> bool {
        let mut dbg = DeBruijnGraph::new(5);
        dbg.add_sequence(&seq.0[..]).unwrap();
        if dbg.has_cycles() {
            return true;
        }
        let mut graph = dbg.compress();
        let mut plugin = RecordingPlugin::new();
        let mut buffer = AlignmentBuffer::new(&mut plugin);
        match graph.align(&mut buffer) {
            Ok(ix) => buffer.result(ix).map(|c| c.flatten() == seq.0).unwrap_or(false),
            Err(_) => false,
        }
    }

    fn prop_acyclic_graphs_align(seqs: Vec<Sequence>) -> bool {
        if seqs.is_empty() {
            return true;
        }
        let mut dbg = DeBruijnGraph::new(4);
        for seq in seqs.iter() {
            dbg.add_sequence(&seq.0[..]).unwrap();
        }
        if dbg.has_cycles() {
            return true;
        }
        let mut graph = dbg.compress();
        let splits = graph.branch_points().len();

        let mut plugin = RecordingPlugin::new();
        let mut buffer = AlignmentBuffer::new(&mut plugin);
        match graph.align(&mut buffer) {
            Ok(ix) => ix + 1 == buffer.len() && (splits == 0 || buffer.len() > 1),
            Err(_) => false,
        }
    }

    fn prop_progressive_below_exact(lengths: Lengths) -> bool {
        dbg_align::work::progressive(lengths.0.clone())
            <= dbg_align::work::exact(lengths.0)
    }
}

use bstr::BString;

use super::{AlignmentPlugin, Element};
use crate::alignment::OperationKind;

/// A nested value mirroring the calls that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composite {
    Fragment(BString),
    Composite(Vec<Composite>),
}

impl Composite {
    pub fn fragment<S: Into<BString>>(seq: S) -> Self {
        Composite::Fragment(seq.into())
    }

    /// Number of leaf fragments.
    pub fn leaves(&self) -> usize {
        match self {
            Composite::Fragment(_) => 1,
            Composite::Composite(parts) => parts.iter().map(Composite::leaves).sum(),
        }
    }

    /// The leaf fragments joined left to right.
    pub fn flatten(&self) -> BString {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(next) = stack.pop() {
            match next {
                Composite::Fragment(seq) => out.extend_from_slice(seq),
                Composite::Composite(parts) => stack.extend(parts.iter().rev()),
            }
        }
        out.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: OperationKind,
    pub result: Composite,
}

/// Builds a [`Composite`] for every call and keeps a log of them.
#[derive(Debug, Default, Clone)]
pub struct RecordingPlugin {
    records: Vec<Record>,
}

impl RecordingPlugin {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn record(&mut self, kind: OperationKind, result: Composite) -> Composite {
        self.records.push(Record {
            kind,
            result: result.clone(),
        });
        result
    }
}

impl AlignmentPlugin for RecordingPlugin {
    type Profile = Composite;

    fn align_sequences(&mut self, a: &[u8], b: &[u8]) -> Composite {
        let value = Composite::Composite(vec![Composite::fragment(a), Composite::fragment(b)]);
        self.record(OperationKind::SequenceSequence, value)
    }

    fn align_sequence_to_profile(&mut self, sequence: &[u8], profile: &Composite) -> Composite {
        let value = Composite::Composite(vec![Composite::fragment(sequence), profile.clone()]);
        self.record(OperationKind::SequenceProfile, value)
    }

    fn align_profiles(&mut self, a: &Composite, b: &Composite) -> Composite {
        let value = Composite::Composite(vec![a.clone(), b.clone()]);
        self.record(OperationKind::ProfileProfile, value)
    }

    fn concatenate(&mut self, elements: &[Element<'_, Composite>]) -> Composite {
        let parts = elements
            .iter()
            .map(|el| match el {
                Element::Sequence(seq) => Composite::fragment(*seq),
                Element::Profile(p) => (*p).clone(),
            })
            .collect();
        self.record(OperationKind::Concatenate, Composite::Composite(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_follows_calls() {
        let mut plugin = RecordingPlugin::new();
        let ab = plugin.align_sequences(b"AC", b"AG");
        let abc = plugin.align_sequence_to_profile(b"AT", &ab);
        let both = plugin.align_profiles(&ab, &abc);

        assert_eq!(ab.leaves(), 2);
        assert_eq!(abc.leaves(), 3);
        assert_eq!(both.leaves(), 5);
        assert_eq!(both.flatten(), "ACAGATACAG");

        let kinds: Vec<_> = plugin.records().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::SequenceSequence,
                OperationKind::SequenceProfile,
                OperationKind::ProfileProfile,
            ]
        );
    }

    #[test]
    fn concatenate_keeps_order() {
        let mut plugin = RecordingPlugin::new();
        let mid = plugin.align_sequences(b"C", b"G");
        let whole = plugin.concatenate(&[
            Element::Sequence(b"AA"),
            Element::Profile(&mid),
            Element::Sequence(b"TT"),
        ]);
        assert_eq!(whole.flatten(), "AACGTT");
        assert_eq!(plugin.records().len(), 2);
    }
}

/*!
The shapes of input accepted by [`DeBruijnGraph::add_sequence`].

Every variant is normalized into a list of `(name, sequence)` records
before the graph is touched.

[`DeBruijnGraph::add_sequence`]: crate::debruijn::DeBruijnGraph::add_sequence
*/

use bstr::BString;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceInput {
    /// A single unnamed sequence.
    Raw(BString),
    /// A single sequence with a name.
    Named { name: String, sequence: BString },
    /// An ordered list of sequences, optionally with a parallel list of
    /// names.
    Batch {
        sequences: Vec<BString>,
        names: Option<Vec<String>>,
    },
    /// Name to sequence pairs, ingested in the given order.
    Mapping(Vec<(String, BString)>),
}

/// A normalized input record.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRecord {
    pub name: Option<String>,
    pub sequence: BString,
}

impl SequenceInput {
    pub fn named<N, S>(name: N, sequence: S) -> Self
    where
        N: Into<String>,
        S: Into<BString>,
    {
        SequenceInput::Named {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    pub fn batch<S: Into<BString>>(sequences: Vec<S>) -> Self {
        SequenceInput::Batch {
            sequences: sequences.into_iter().map(Into::into).collect(),
            names: None,
        }
    }

    pub fn batch_named<S, N>(sequences: Vec<S>, names: Vec<N>) -> Self
    where
        S: Into<BString>,
        N: Into<String>,
    {
        SequenceInput::Batch {
            sequences: sequences.into_iter().map(Into::into).collect(),
            names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn into_records(self) -> Result<Vec<SequenceRecord>> {
        let records = match self {
            SequenceInput::Raw(sequence) => vec![SequenceRecord {
                name: None,
                sequence,
            }],
            SequenceInput::Named { name, sequence } => vec![SequenceRecord {
                name: Some(name),
                sequence,
            }],
            SequenceInput::Batch { sequences, names } => match names {
                None => sequences
                    .into_iter()
                    .map(|sequence| SequenceRecord {
                        name: None,
                        sequence,
                    })
                    .collect(),
                Some(names) => {
                    if names.len() != sequences.len() {
                        return Err(GraphError::NameCountMismatch {
                            names: names.len(),
                            sequences: sequences.len(),
                        });
                    }
                    sequences
                        .into_iter()
                        .zip(names)
                        .map(|(sequence, name)| SequenceRecord {
                            name: Some(name),
                            sequence,
                        })
                        .collect()
                }
            },
            SequenceInput::Mapping(pairs) => pairs
                .into_iter()
                .map(|(name, sequence)| SequenceRecord {
                    name: Some(name),
                    sequence,
                })
                .collect(),
        };
        Ok(records)
    }
}

impl From<&str> for SequenceInput {
    fn from(sequence: &str) -> Self {
        SequenceInput::Raw(sequence.into())
    }
}

impl From<&[u8]> for SequenceInput {
    fn from(sequence: &[u8]) -> Self {
        SequenceInput::Raw(sequence.into())
    }
}

impl From<String> for SequenceInput {
    fn from(sequence: String) -> Self {
        SequenceInput::Raw(sequence.into())
    }
}

impl From<BString> for SequenceInput {
    fn from(sequence: BString) -> Self {
        SequenceInput::Raw(sequence)
    }
}

impl From<Vec<&str>> for SequenceInput {
    fn from(sequences: Vec<&str>) -> Self {
        SequenceInput::batch(sequences)
    }
}

impl From<Vec<(&str, &str)>> for SequenceInput {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        SequenceInput::Mapping(
            pairs
                .into_iter()
                .map(|(name, seq)| (name.to_string(), seq.into()))
                .collect(),
        )
    }
}

impl From<std::collections::BTreeMap<String, String>> for SequenceInput {
    fn from(map: std::collections::BTreeMap<String, String>) -> Self {
        SequenceInput::Mapping(
            map.into_iter().map(|(name, seq)| (name, seq.into())).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_names_must_match() {
        let input = SequenceInput::batch_named(vec!["ACGT", "CGTA"], vec!["a"]);
        assert_eq!(
            input.into_records(),
            Err(GraphError::NameCountMismatch {
                names: 1,
                sequences: 2
            })
        );
    }

    #[test]
    fn mapping_keeps_order() {
        let input = SequenceInput::from(vec![("z", "ACGT"), ("a", "CGTA")]);
        let records = input.into_records().unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec![Some("z".to_string()), Some("a".to_string())]);
        assert_eq!(records[1].sequence, "CGTA");
    }

    #[test]
    fn raw_is_unnamed() {
        let records = SequenceInput::from("ACGT").into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, None);
    }
}

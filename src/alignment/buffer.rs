use bstr::BString;

use log::{debug, trace};

use super::{AlignmentPlugin, Element, Operand};
use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    SequenceSequence,
    SequenceProfile,
    ProfileProfile,
    Concatenate,
}

/// An operand as stored in the operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggedOperand {
    Sequence(BString),
    Profile(usize),
}

impl LoggedOperand {
    fn as_operand(&self) -> Operand<'_> {
        match self {
            LoggedOperand::Sequence(seq) => Operand::Sequence(seq.as_slice()),
            LoggedOperand::Profile(ix) => Operand::Profile(*ix),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub operands: Vec<LoggedOperand>,
}

fn classify(operands: &[Operand<'_>]) -> Result<OperationKind> {
    match operands {
        [Operand::Sequence(_), Operand::Sequence(_)] => Ok(OperationKind::SequenceSequence),
        [Operand::Profile(_), Operand::Profile(_)] => Ok(OperationKind::ProfileProfile),
        [_, _] => Ok(OperationKind::SequenceProfile),
        _ => Err(GraphError::UnsupportedOperation(format!(
            "alignment takes two operands, got {}",
            operands.len()
        ))),
    }
}

fn lookup<P>(results: &[P], ix: usize) -> Result<&P> {
    results.get(ix).ok_or(GraphError::ProfileNotFound(ix))
}

/// Runs one operation against `plugin`, resolving profile operands in
/// `results`.
fn execute<Q>(
    plugin: &mut Q,
    results: &[Q::Profile],
    kind: OperationKind,
    operands: &[Operand<'_>],
) -> Result<Q::Profile>
where
    Q: AlignmentPlugin,
{
    let profile = match (kind, operands) {
        (OperationKind::SequenceSequence, [Operand::Sequence(a), Operand::Sequence(b)]) => {
            plugin.align_sequences(a, b)
        }
        (OperationKind::SequenceProfile, [Operand::Sequence(seq), Operand::Profile(ix)])
        | (OperationKind::SequenceProfile, [Operand::Profile(ix), Operand::Sequence(seq)]) => {
            let profile = lookup(results, *ix)?;
            plugin.align_sequence_to_profile(seq, profile)
        }
        (OperationKind::ProfileProfile, [Operand::Profile(a), Operand::Profile(b)]) => {
            let a = lookup(results, *a)?;
            let b = lookup(results, *b)?;
            plugin.align_profiles(a, b)
        }
        (OperationKind::Concatenate, operands) => {
            let mut elements = Vec::with_capacity(operands.len());
            for operand in operands {
                let element = match operand {
                    Operand::Sequence(seq) => Element::Sequence(*seq),
                    Operand::Profile(ix) => Element::Profile(lookup(results, *ix)?),
                };
                elements.push(element);
            }
            plugin.concatenate(&elements)
        }
        (kind, operands) => {
            return Err(GraphError::UnsupportedOperation(format!(
                "{:?} with {} operands",
                kind,
                operands.len()
            )))
        }
    };
    Ok(profile)
}

/// Sequential log of alignment operations and their results.
///
/// Operations run eagerly: the plugin is called as soon as an operation
/// is added, and the result is stored at the operation's index.
#[derive(Debug)]
pub struct AlignmentBuffer<'p, P: AlignmentPlugin> {
    plugin: &'p mut P,
    operations: Vec<Operation>,
    results: Vec<P::Profile>,
}

impl<'p, P: AlignmentPlugin> AlignmentBuffer<'p, P> {
    pub fn new(plugin: &'p mut P) -> Self {
        AlignmentBuffer {
            plugin,
            operations: Vec::new(),
            results: Vec::new(),
        }
    }

    fn push(&mut self, kind: OperationKind, operands: &[Operand<'_>]) -> Result<usize> {
        let profile = execute(&mut *self.plugin, &self.results, kind, operands)?;

        let ix = self.results.len();
        self.operations.push(Operation {
            kind,
            operands: operands.iter().map(|op| op.to_logged()).collect(),
        });
        self.results.push(profile);

        trace!("buffer operation {} ({:?})", ix, kind);
        Ok(ix)
    }

    /// Aligns exactly two operands and returns the index of the
    /// result.
    pub fn align(&mut self, operands: &[Operand<'_>]) -> Result<usize> {
        let kind = classify(operands)?;
        self.push(kind, operands)
    }

    pub fn add_alignment<'a, A, B>(&mut self, a: A, b: B) -> Result<usize>
    where
        A: Into<Operand<'a>>,
        B: Into<Operand<'a>>,
    {
        self.align(&[a.into(), b.into()])
    }

    /// Concatenates literal pieces and earlier results, in order.
    pub fn concatenate(&mut self, operands: &[Operand<'_>]) -> Result<usize> {
        if operands.is_empty() {
            return Err(GraphError::UnsupportedOperation(
                "nothing to concatenate".to_string(),
            ));
        }
        self.push(OperationKind::Concatenate, operands)
    }

    pub fn result(&self, ix: usize) -> Result<&P::Profile> {
        lookup(&self.results, ix)
    }

    pub fn results(&self) -> &[P::Profile] {
        &self.results
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn plugin(&self) -> &P {
        &*self.plugin
    }

    /// Drops every operation and result; the next index is 0 again.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.results.clear();
    }

    /// Re-runs the logged operations, in order, against another
    /// plugin.
    pub fn replay<Q>(&self, plugin: &mut Q) -> Result<Vec<Q::Profile>>
    where
        Q: AlignmentPlugin,
    {
        let mut results: Vec<Q::Profile> = Vec::with_capacity(self.operations.len());
        for op in self.operations.iter() {
            let operands: Vec<Operand<'_>> =
                op.operands.iter().map(LoggedOperand::as_operand).collect();
            let profile = execute(&mut *plugin, &results, op.kind, &operands)?;
            results.push(profile);
        }
        debug!("replayed {} operations", results.len());
        Ok(results)
    }
}

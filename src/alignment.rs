/*!
Pluggable alignment strategies and the buffer that schedules them.

An [`AlignmentPlugin`] knows how to combine sequences and profiles; the
[`AlignmentBuffer`] logs every requested operation, runs it eagerly
against its plugin, and hands out a sequential index for each result.
Later operations refer to earlier results through those indices.

Two plugins are provided. [`CostPlugin`] projects every operation onto
cost and length ranges, and [`RecordingPlugin`] builds a nested value
mirroring the shape of the calls it receives.
*/

use bstr::BString;

pub mod buffer;
pub mod composite;
pub mod cost;

pub use self::buffer::{AlignmentBuffer, LoggedOperand, Operation, OperationKind};
pub use self::composite::{Composite, Record, RecordingPlugin};
pub use self::cost::{CostPlugin, CostProfile};

/// An element handed to [`AlignmentPlugin::concatenate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element<'a, P> {
    Sequence(&'a [u8]),
    Profile(&'a P),
}

pub trait AlignmentPlugin {
    type Profile: Clone + std::fmt::Debug;

    fn align_sequences(&mut self, a: &[u8], b: &[u8]) -> Self::Profile;

    fn align_sequence_to_profile(
        &mut self,
        sequence: &[u8],
        profile: &Self::Profile,
    ) -> Self::Profile;

    fn align_profiles(&mut self, a: &Self::Profile, b: &Self::Profile) -> Self::Profile;

    fn concatenate(&mut self, elements: &[Element<'_, Self::Profile>]) -> Self::Profile;
}

/// An argument to an [`AlignmentBuffer`] operation: either raw
/// sequence content or the index of an earlier result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    Sequence(&'a [u8]),
    Profile(usize),
}

impl<'a> Operand<'a> {
    #[inline]
    pub fn is_profile(&self) -> bool {
        matches!(self, Operand::Profile(_))
    }

    pub(crate) fn to_logged(self) -> LoggedOperand {
        match self {
            Operand::Sequence(seq) => LoggedOperand::Sequence(BString::from(seq)),
            Operand::Profile(ix) => LoggedOperand::Profile(ix),
        }
    }
}

impl<'a> From<&'a [u8]> for Operand<'a> {
    fn from(seq: &'a [u8]) -> Self {
        Operand::Sequence(seq)
    }
}

impl<'a> From<&'a str> for Operand<'a> {
    fn from(seq: &'a str) -> Self {
        Operand::Sequence(seq.as_bytes())
    }
}

impl<'a> From<&'a BString> for Operand<'a> {
    fn from(seq: &'a BString) -> Self {
        Operand::Sequence(seq.as_slice())
    }
}

impl<'a> From<usize> for Operand<'a> {
    fn from(ix: usize) -> Self {
        Operand::Profile(ix)
    }
}

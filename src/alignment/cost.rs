/*!
Cost projection: instead of aligning anything, every operation returns
the range of dynamic-programming cells it would need and the range of
lengths its result could have.
*/

use super::{AlignmentBuffer, AlignmentPlugin, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostProfile {
    /// `(min, max)` alignment cost.
    pub cost: (u128, u128),
    /// `(min, max)` length of the aligned result.
    pub length_range: (usize, usize),
}

impl CostProfile {
    pub fn new(cost: (u128, u128), length_range: (usize, usize)) -> Self {
        CostProfile { cost, length_range }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CostPlugin {
    records: Vec<CostProfile>,
}

impl CostPlugin {
    pub fn new() -> Self {
        Default::default()
    }

    /// Every profile returned so far, in call order.
    pub fn records(&self) -> &[CostProfile] {
        &self.records
    }

    fn record(&mut self, profile: CostProfile) -> CostProfile {
        self.records.push(profile);
        profile
    }
}

impl AlignmentPlugin for CostPlugin {
    type Profile = CostProfile;

    fn align_sequences(&mut self, a: &[u8], b: &[u8]) -> CostProfile {
        let cost = (a.len() as u128).saturating_mul(b.len() as u128);
        let length_range = (a.len().max(b.len()), a.len() + b.len());
        self.record(CostProfile::new((cost, cost), length_range))
    }

    fn align_sequence_to_profile(
        &mut self,
        sequence: &[u8],
        profile: &CostProfile,
    ) -> CostProfile {
        let len = sequence.len();
        let (lo, hi) = profile.length_range;
        let cost = (
            (len as u128).saturating_mul(profile.cost.0),
            (len as u128).saturating_mul(profile.cost.1),
        );
        self.record(CostProfile::new(cost, (len.max(lo), len + hi)))
    }

    fn align_profiles(&mut self, a: &CostProfile, b: &CostProfile) -> CostProfile {
        let cost = (
            a.cost.0.saturating_mul(b.cost.0),
            a.cost.1.saturating_mul(b.cost.1),
        );
        let length_range = (
            a.length_range.0.max(b.length_range.0),
            a.length_range.1 + b.length_range.1,
        );
        self.record(CostProfile::new(cost, length_range))
    }

    fn concatenate(&mut self, elements: &[Element<'_, CostProfile>]) -> CostProfile {
        let length_range = elements.iter().fold((0, 0), |(lo, hi), el| match el {
            Element::Sequence(seq) => (lo + seq.len(), hi + seq.len()),
            Element::Profile(p) => (lo + p.length_range.0, hi + p.length_range.1),
        });
        self.record(CostProfile::new((0, 0), length_range))
    }
}

impl<'p> AlignmentBuffer<'p, CostPlugin> {
    /// Sum of the cost ranges of every result in the buffer.
    pub fn total_cost(&self) -> (u128, u128) {
        self.results().iter().fold((0, 0), |(lo, hi), p| {
            (lo.saturating_add(p.cost.0), hi.saturating_add(p.cost.1))
        })
    }
}

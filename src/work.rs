/*!
Estimates of how much dynamic-programming work a multiple alignment of
a sequence set would take.

All estimates are pure functions of the sequence lengths or of the
compressed graph, and saturate at `u128::MAX` instead of overflowing.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentMethod {
    /// Full-tensor dynamic programming over every sequence at once.
    Exact,
    /// Pairwise merges in ascending length order.
    Progressive,
    /// One unit per compressed k-mer node.
    DbgLength,
    /// One unit per sequence passing through each compressed node.
    DbgLengthNumber,
}

impl AlignmentMethod {
    /// True for the estimates that need a compressed graph.
    #[inline]
    pub fn needs_graph(&self) -> bool {
        matches!(
            self,
            AlignmentMethod::DbgLength | AlignmentMethod::DbgLengthNumber
        )
    }
}

/// Product of all lengths. An empty set costs nothing.
pub fn exact<I>(lengths: I) -> u128
where
    I: IntoIterator<Item = usize>,
{
    let mut iter = lengths.into_iter().peekable();
    if iter.peek().is_none() {
        return 0;
    }
    iter.fold(1u128, |acc, len| acc.saturating_mul(len as u128))
}

/// Sum of the products of consecutive lengths, sorted ascending.
pub fn progressive<I>(lengths: I) -> u128
where
    I: IntoIterator<Item = usize>,
{
    let mut sorted: Vec<u128> = lengths.into_iter().map(|l| l as u128).collect();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .map(|w| w[0].saturating_mul(w[1]))
        .fold(0u128, |acc, w| acc.saturating_add(w))
}

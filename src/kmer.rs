/// Iterator over the k-mers of a sequence, left to right.
///
/// Yields nothing if the sequence is shorter than `k`.
#[inline]
pub fn kmers(sequence: &[u8], k: usize) -> std::slice::Windows<'_, u8> {
    assert!(k > 0, "k-mer length must be positive");
    sequence.windows(k)
}

/// Number of k-mers in a sequence of length `len`.
#[inline]
pub fn kmer_count(len: usize, k: usize) -> usize {
    (len + 1).saturating_sub(k)
}

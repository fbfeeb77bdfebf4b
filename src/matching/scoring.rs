use crate::matching::fingerprint::Fingerprint;

/// Safely convert usize to f64 for ratio calculations
///
/// Bit counts are bounded by the fingerprint length, far inside the range f64
/// represents exactly.
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Tanimoto similarity: |a ∧ b| / |a ∨ b|.
///
/// Symmetric, in `[0, 1]`, and exactly 1.0 for identical non-empty fingerprints.
/// Two fingerprints with no bits set score 0.0.
///
/// # Panics
///
/// Panics if the fingerprints have different lengths; fingerprints built with
/// different parameters are not comparable.
#[must_use]
pub fn tanimoto_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    assert_eq!(
        a.nbits(),
        b.nbits(),
        "fingerprints must have the same length"
    );

    let union = a.union_count(b);
    if union == 0 {
        return 0.0;
    }
    count_to_f64(a.intersection_count(b)) / count_to_f64(union)
}

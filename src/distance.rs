//! Squared Euclidean distance and exhaustive nearest-codeword search.
//!
//! Training (assignment) and reconstruction share [`nearest`], so a vector
//! always lands on the same codeword in both phases.
//!
//! ## Tie-break
//!
//! The scan keeps the first codeword whose distance is *strictly* smaller
//! than the best seen so far. Equal distances therefore resolve to the lowest
//! codeword index. Results under a fixed seed depend on this.

/// Squared L2 distance between two 8-bit vectors.
///
/// Exact: the largest possible value for `D` components is `D * 255^2`, far
/// below `u64::MAX` for any dimension this crate produces.
#[inline]
#[must_use]
pub fn squared_l2(a: &[u8], b: &[u8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = u64::from(x.abs_diff(y));
            d * d
        })
        .sum()
}

/// Index and distance of the codeword closest to `query`.
///
/// `codewords` holds codewords back to back, `dimension` components each.
/// Returns `None` only when there are no codewords.
#[inline]
#[must_use]
pub fn nearest(query: &[u8], codewords: &[u8], dimension: usize) -> Option<(usize, u64)> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, codeword) in codewords.chunks_exact(dimension).enumerate() {
        let dist = squared_l2(query, codeword);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((idx, dist)),
        }
    }
    best
}

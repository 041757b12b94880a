//! k-means++ seeding.
//!
//! The first codeword is a uniformly random training vector. Each following
//! codeword is drawn with probability proportional to `D(x)^2`, the squared
//! distance from `x` to its nearest codeword so far, by inverting the
//! cumulative weight at `u * total` for a uniform `u` in `[0, 1)`.
//!
//! When every remaining weight is zero (all vectors coincide with chosen
//! codewords) there is nothing left to sample from, and the remaining slots
//! are filled with copies of the first training vector.

use rand::Rng;

use super::VectorSet;
use crate::distance::squared_l2;

/// Initial codewords produced by [`kmeans_plus_plus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeding {
    /// `size` codewords, back to back.
    pub codewords: Vec<u8>,
    /// Whether the zero-weight fallback filled any slots.
    pub fallback: bool,
}

/// Pick `size` initial codewords from a non-empty `vectors`.
///
/// Consumes one `random_range` draw for the first pick and one `f64` draw per
/// further weighted pick, so a fixed source gives a fixed seeding.
pub fn kmeans_plus_plus<R: Rng>(vectors: &VectorSet, size: usize, rng: &mut R) -> Seeding {
    let n = vectors.len();
    let dimension = vectors.dimension();
    let mut codewords = Vec::with_capacity(size * dimension);
    if n == 0 || size == 0 {
        return Seeding {
            codewords,
            fallback: false,
        };
    }

    let first = rng.random_range(0..n);
    codewords.extend_from_slice(vectors.get(first));

    // Squared distance from each vector to its nearest chosen codeword.
    let mut weights: Vec<u64> = vectors
        .iter()
        .map(|v| squared_l2(v, vectors.get(first)))
        .collect();

    let mut chosen = 1;
    let mut fallback = false;
    while chosen < size {
        let total: u64 = weights.iter().sum();
        if total == 0 {
            tracing::debug!(
                filled = size - chosen,
                "seeding weight collapsed; padding with the first training vector"
            );
            for _ in chosen..size {
                codewords.extend_from_slice(vectors.get(0));
            }
            fallback = true;
            break;
        }

        let pick = sample_weighted(&weights, total, rng);
        let codeword = vectors.get(pick);
        codewords.extend_from_slice(codeword);
        chosen += 1;

        for (weight, v) in weights.iter_mut().zip(vectors.iter()) {
            let d = squared_l2(v, codeword);
            if d < *weight {
                *weight = d;
            }
        }
    }

    Seeding {
        codewords,
        fallback,
    }
}

/// Cumulative-sum inversion over `weights` (which sum to `total > 0`).
///
/// Zero-weight entries are never picked. If float rounding leaves the
/// cumulative sum short of the threshold, the last positive entry wins.
fn sample_weighted<R: Rng>(weights: &[u64], total: u64, rng: &mut R) -> usize {
    let threshold = rng.random::<f64>() * total as f64;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w == 0 {
            continue;
        }
        cumulative += w as f64;
        last_positive = i;
        if cumulative >= threshold {
            return i;
        }
    }
    last_positive
}

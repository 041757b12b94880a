//! Bounded Lloyd refinement with empty-cluster repair.
//!
//! Each iteration is a pure step from one codebook snapshot to the next:
//!
//! ```text
//! codebook_t --assign--> Assignment --update--> codebook_{t+1}
//! ```
//!
//! - **Assign**: every vector joins its nearest codeword (lowest index on ties).
//! - **Update**: a non-empty cluster's codeword becomes the per-component
//!   integer mean of its members, truncated toward zero. An empty cluster is
//!   re-seeded halfway between the previous codeword of the largest cluster
//!   and that cluster's farthest member.
//! - **Stop** when the summed squared movement of all codewords drops below
//!   the epsilon, or at the iteration cap.

use super::{TrainParams, VectorSet};
use crate::distance::{nearest, squared_l2};

/// One iteration's cluster membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Codeword index for each training vector.
    pub labels: Vec<usize>,
    /// Member count per codeword.
    pub sizes: Vec<usize>,
}

/// Result of [`refine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    pub codewords: Vec<u8>,
    pub iterations: usize,
    pub converged: bool,
    pub final_change: u64,
    pub empty_repairs: usize,
}

/// Assign every vector to its nearest codeword.
pub fn assign(vectors: &VectorSet, codewords: &[u8]) -> Assignment {
    let dimension = vectors.dimension();
    let k = codewords.len() / dimension;
    let mut labels = Vec::with_capacity(vectors.len());
    let mut sizes = vec![0usize; k];

    for v in vectors.iter() {
        let (label, _) = nearest(v, codewords, dimension).unwrap_or_default();
        labels.push(label);
        sizes[label] += 1;
    }

    Assignment { labels, sizes }
}

/// Build the next codebook from `previous` and its assignment.
///
/// Returns the new codewords and the number of empty clusters repaired.
pub fn update(vectors: &VectorSet, previous: &[u8], assignment: &Assignment) -> (Vec<u8>, usize) {
    let dimension = vectors.dimension();
    let k = assignment.sizes.len();

    let mut sums = vec![0u64; k * dimension];
    for (v, &label) in vectors.iter().zip(&assignment.labels) {
        let row = &mut sums[label * dimension..(label + 1) * dimension];
        for (s, &x) in row.iter_mut().zip(v) {
            *s += u64::from(x);
        }
    }

    let mut next = vec![0u8; k * dimension];
    let mut repair: Option<Vec<u8>> = None;
    let mut repaired = 0;

    for (cluster, &count) in assignment.sizes.iter().enumerate() {
        let out = &mut next[cluster * dimension..(cluster + 1) * dimension];
        if count > 0 {
            let row = &sums[cluster * dimension..(cluster + 1) * dimension];
            for (o, &s) in out.iter_mut().zip(row) {
                // Mean of u8 values always fits in u8.
                *o = (s / count as u64) as u8;
            }
        } else {
            // Every empty cluster in this pass gets the same replacement.
            let replacement =
                repair.get_or_insert_with(|| split_largest(vectors, previous, assignment));
            out.copy_from_slice(replacement.as_slice());
            repaired += 1;
            tracing::debug!(cluster, "re-seeded empty cluster");
        }
    }

    (next, repaired)
}

/// Replacement codeword for an empty cluster.
///
/// Midpoint between the largest cluster's previous codeword and its member
/// farthest from that codeword. Falls back to the first training vector when
/// no cluster has members.
fn split_largest(vectors: &VectorSet, previous: &[u8], assignment: &Assignment) -> Vec<u8> {
    let dimension = vectors.dimension();

    let mut largest: Option<(usize, usize)> = None;
    for (cluster, &size) in assignment.sizes.iter().enumerate() {
        if size > largest.map_or(0, |(_, s)| s) {
            largest = Some((cluster, size));
        }
    }
    let Some((largest, _)) = largest else {
        return vectors.get(0).to_vec();
    };

    let center = &previous[largest * dimension..(largest + 1) * dimension];
    let mut farthest: Option<(&[u8], u64)> = None;
    for (v, &label) in vectors.iter().zip(&assignment.labels) {
        if label != largest {
            continue;
        }
        let d = squared_l2(v, center);
        if farthest.map_or(true, |(_, best)| d > best) {
            farthest = Some((v, d));
        }
    }

    match farthest {
        Some((member, _)) => center
            .iter()
            .zip(member)
            .map(|(&c, &m)| ((u16::from(c) + u16::from(m)) / 2) as u8)
            .collect(),
        None => center.to_vec(),
    }
}

/// Summed squared movement between two codebook snapshots.
pub fn movement(old: &[u8], new: &[u8], dimension: usize) -> u64 {
    old.chunks_exact(dimension)
        .zip(new.chunks_exact(dimension))
        .map(|(a, b)| squared_l2(a, b))
        .sum()
}

/// Run Lloyd iterations from `initial` until convergence or the cap.
pub fn refine(vectors: &VectorSet, initial: Vec<u8>, params: &TrainParams) -> Refinement {
    let dimension = vectors.dimension();
    let mut codewords = initial;
    let mut iterations = 0;
    let mut converged = false;
    let mut final_change = 0;
    let mut empty_repairs = 0;

    for iteration in 0..params.max_iterations {
        let assignment = assign(vectors, &codewords);
        let (next, repaired) = update(vectors, &codewords, &assignment);
        let change = movement(&codewords, &next, dimension);

        codewords = next;
        iterations = iteration + 1;
        final_change = change;
        empty_repairs += repaired;

        tracing::debug!(iteration, change, repaired, "lloyd iteration");
        if (change as f64) < params.convergence_epsilon {
            converged = true;
            break;
        }
    }

    Refinement {
        codewords,
        iterations,
        converged,
        final_change,
        empty_repairs,
    }
}

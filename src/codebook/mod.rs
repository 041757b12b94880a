//! Codebook training.
//!
//! A codebook is a fixed-size list of codewords: representative vectors that
//! stand in for every vector assigned to them. Training runs in two phases:
//!
//! 1. **Seeding** ([`seeding`]): k-means++ picks `N` initial codewords from
//!    the training set, each with probability proportional to its squared
//!    distance from the codewords chosen so far.
//! 2. **Refinement** ([`kmeans`]): bounded Lloyd iteration. Every pass builds
//!    a fresh assignment, then a fresh codebook of per-cluster integer means.
//!    Clusters that come out empty are re-seeded next to the farthest member
//!    of the largest cluster instead of being dropped.
//!
//! Randomness only enters through seeding, and the random source is passed
//! in by the caller. The same source state and the same vectors always give
//! the same codebook.
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use vqpress::codebook::{CodebookTrainer, VectorSet};
//!
//! let vectors = VectorSet::from_flat(2, vec![0, 0, 1, 1, 250, 250, 251, 251]).unwrap();
//! let trainer = CodebookTrainer::new(2).unwrap();
//! let training = trainer.train(&vectors, &mut StdRng::seed_from_u64(7)).unwrap();
//! assert_eq!(training.codebook.len(), 2);
//! ```

pub mod kmeans;
pub mod seeding;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::distance;
use crate::error::{Result, VqError};

/// Ordered training vectors, stored back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSet {
    dimension: usize,
    data: Vec<u8>,
}

impl VectorSet {
    /// Wrap `data` as consecutive vectors of `dimension` components.
    pub fn from_flat(dimension: usize, data: Vec<u8>) -> Result<Self> {
        if dimension == 0 {
            return Err(VqError::Configuration(
                "vector dimension must be greater than 0".into(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(VqError::Configuration(format!(
                "{} components do not split into vectors of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Vector `idx`. Panics when out of range.
    #[inline]
    pub fn get(&self, idx: usize) -> &[u8] {
        let start = idx * self.dimension;
        &self.data[start..start + self.dimension]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.dimension)
    }
}

/// Trained codewords, stored back to back.
///
/// Always holds at least one codeword. Codewords are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    dimension: usize,
    words: Vec<u8>,
}

impl Codebook {
    /// Build a codebook from consecutive codewords.
    pub fn from_flat(dimension: usize, words: Vec<u8>) -> Result<Self> {
        if dimension == 0 || words.is_empty() || words.len() % dimension != 0 {
            return Err(VqError::Configuration(format!(
                "{} components are not a non-empty list of {dimension}-component codewords",
                words.len()
            )));
        }
        Ok(Self { dimension, words })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Codeword `idx`. Panics when out of range.
    #[inline]
    pub fn get(&self, idx: usize) -> &[u8] {
        let start = idx * self.dimension;
        &self.words[start..start + self.dimension]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.words.chunks_exact(self.dimension)
    }

    /// All codewords as one flat slice.
    #[inline]
    pub fn as_flat(&self) -> &[u8] {
        &self.words
    }

    /// Index and squared distance of the codeword closest to `query`.
    ///
    /// Ties go to the lowest index.
    #[inline]
    pub fn nearest(&self, query: &[u8]) -> (usize, u64) {
        // Non-empty by construction.
        distance::nearest(query, &self.words, self.dimension).unwrap_or_default()
    }
}

/// Refinement settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Hard cap on Lloyd iterations.
    pub max_iterations: usize,
    /// Stop once the summed squared codeword movement drops below this.
    pub convergence_epsilon: f64,
    /// Seed for [`CodebookTrainer::fit`]. `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            convergence_epsilon: 0.5,
            seed: None,
        }
    }
}

impl TrainParams {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }
}

/// What happened during one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    /// Seed the random source was built from, when the trainer built it.
    pub seed: Option<u64>,
    /// Lloyd iterations actually run (never above `max_iterations`).
    pub iterations: usize,
    /// Whether the movement dropped below the epsilon before the cap.
    pub converged: bool,
    /// Summed squared codeword movement of the last iteration.
    pub final_change: u64,
    /// Empty clusters re-seeded across all iterations.
    pub empty_repairs: usize,
    /// Seeding ran out of distinct vectors and padded with the first one.
    pub seeding_fallback: bool,
}

/// A trained codebook and its report.
#[derive(Debug, Clone)]
pub struct Training {
    pub codebook: Codebook,
    pub report: TrainReport,
}

/// Trains fixed-size codebooks with k-means++ seeding and Lloyd refinement.
#[derive(Debug, Clone)]
pub struct CodebookTrainer {
    size: usize,
    params: TrainParams,
}

impl CodebookTrainer {
    /// Trainer producing `size` codewords.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(VqError::Configuration(
                "codebook size must be greater than 0".into(),
            ));
        }
        Ok(Self {
            size,
            params: TrainParams::default(),
        })
    }

    #[must_use]
    pub fn with_params(mut self, params: TrainParams) -> Self {
        self.params = params;
        self
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn params(&self) -> &TrainParams {
        &self.params
    }

    /// Train on `vectors`, drawing seeding randomness from `rng`.
    pub fn train<R: Rng>(&self, vectors: &VectorSet, rng: &mut R) -> Result<Training> {
        if vectors.is_empty() {
            return Err(VqError::EmptyInput);
        }

        let seeded = seeding::kmeans_plus_plus(vectors, self.size, rng);
        let refined = kmeans::refine(vectors, seeded.codewords, &self.params);

        tracing::info!(
            codewords = self.size,
            dimension = vectors.dimension(),
            vectors = vectors.len(),
            iterations = refined.iterations,
            converged = refined.converged,
            "trained codebook"
        );

        Ok(Training {
            codebook: Codebook::from_flat(vectors.dimension(), refined.codewords)?,
            report: TrainReport {
                seed: None,
                iterations: refined.iterations,
                converged: refined.converged,
                final_change: refined.final_change,
                empty_repairs: refined.empty_repairs,
                seeding_fallback: seeded.fallback,
            },
        })
    }

    /// Train with a [`StdRng`] built from the configured seed.
    ///
    /// Without a configured seed one is drawn from OS entropy; either way the
    /// seed is recorded in the report so the run can be replayed.
    pub fn fit(&self, vectors: &VectorSet) -> Result<Training> {
        let seed = self.params.seed.unwrap_or_else(|| rand::rng().random());
        tracing::debug!(seed, "seeding codebook trainer");
        let mut rng = StdRng::seed_from_u64(seed);
        let mut training = self.train(vectors, &mut rng)?;
        training.report.seed = Some(seed);
        Ok(training)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(dimension: usize, data: &[u8]) -> VectorSet {
        VectorSet::from_flat(dimension, data.to_vec()).unwrap()
    }

    #[test]
    fn vector_set_rejects_ragged_data() {
        assert!(VectorSet::from_flat(3, vec![0; 7]).is_err());
        assert!(VectorSet::from_flat(0, vec![]).is_err());
        assert!(VectorSet::from_flat(3, vec![]).unwrap().is_empty());
    }

    #[test]
    fn codebook_must_be_non_empty() {
        assert!(Codebook::from_flat(2, vec![]).is_err());
        assert!(Codebook::from_flat(2, vec![1, 2, 3]).is_err());
        assert_eq!(Codebook::from_flat(2, vec![1, 2, 3, 4]).unwrap().len(), 2);
    }

    #[test]
    fn zero_size_trainer_is_rejected() {
        assert!(matches!(
            CodebookTrainer::new(0),
            Err(VqError::Configuration(_))
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        let trainer = CodebookTrainer::new(4).unwrap();
        let empty = set(2, &[]);
        let err = trainer
            .train(&empty, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, VqError::EmptyInput));
    }

    #[test]
    fn fit_records_seed_and_is_reproducible() {
        let data: Vec<u8> = (0..200u32).map(|i| (i * 37 % 251) as u8).collect();
        let vectors = set(4, &data);
        let trainer = CodebookTrainer::new(8)
            .unwrap()
            .with_params(TrainParams::default().with_seed(99));

        let a = trainer.fit(&vectors).unwrap();
        let b = trainer.fit(&vectors).unwrap();
        assert_eq!(a.report.seed, Some(99));
        assert_eq!(a.codebook, b.codebook);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn more_codewords_than_vectors() {
        let vectors = set(2, &[10, 10, 200, 200]);
        let training = CodebookTrainer::new(5)
            .unwrap()
            .train(&vectors, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(training.codebook.len(), 5);
        assert!(training.report.seeding_fallback);
        for v in vectors.iter() {
            assert_eq!(training.codebook.nearest(v).1, 0);
        }
    }

    #[test]
    fn iterations_respect_cap() {
        let data: Vec<u8> = (0..=255).collect();
        let vectors = set(1, &data);
        let params = TrainParams::default()
            .with_max_iterations(2)
            .with_convergence_epsilon(0.0);
        let training = CodebookTrainer::new(16)
            .unwrap()
            .with_params(params)
            .train(&vectors, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(training.report.iterations, 2);
        assert!(!training.report.converged);
    }
}

//! End-to-end compression of one buffer.
//!
//! ```text
//! buffer -> extract -> train -> quantize -> reconstructed buffer
//! ```
//!
//! All configuration is checked before training starts.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::codebook::{Codebook, CodebookTrainer, TrainParams, TrainReport, Training};
use crate::error::Result;
use crate::partition::{self, Partitioning};
use crate::quantize::Quantizer;

/// What to run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub partitioning: Partitioning,
    /// Number of codewords `N`.
    pub codebook_size: usize,
    pub params: TrainParams,
}

impl Settings {
    /// Settings from the raw selectors `M` (vector shape) and `N` (codebook size).
    pub fn from_selectors(m: usize, n: usize) -> Result<Self> {
        let settings = Self {
            partitioning: Partitioning::from_m(m)?,
            codebook_size: n,
            params: TrainParams::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    #[must_use]
    pub fn with_params(mut self, params: TrainParams) -> Self {
        self.params = params;
        self
    }

    /// Check everything that can be checked without data.
    pub fn validate(&self) -> Result<()> {
        self.partitioning.validate()?;
        CodebookTrainer::new(self.codebook_size)?;
        Ok(())
    }

    /// Whether `N` is a power of two; other sizes run but are unusual.
    #[must_use]
    pub fn is_conventional_size(&self) -> bool {
        self.codebook_size.is_power_of_two()
    }

    fn trainer(&self) -> Result<CodebookTrainer> {
        self.validate()?;
        if !self.is_conventional_size() {
            tracing::warn!(
                codebook_size = self.codebook_size,
                "codebook size is not a power of two"
            );
        }
        Ok(CodebookTrainer::new(self.codebook_size)?.with_params(self.params))
    }
}

/// Output of one run.
#[derive(Debug, Clone)]
pub struct Compression {
    pub codebook: Codebook,
    pub reconstructed: PixelBuffer,
    pub report: TrainReport,
}

/// Compress `buffer`, seeding from `settings.params.seed` (or OS entropy).
pub fn compress(buffer: &PixelBuffer, settings: &Settings) -> Result<Compression> {
    let trainer = settings.trainer()?;
    let vectors = partition::extract(buffer, settings.partitioning)?;
    let training = trainer.fit(&vectors)?;
    finish(buffer, settings, training)
}

/// Compress `buffer` with an explicit random source.
pub fn compress_with<R: Rng>(
    buffer: &PixelBuffer,
    settings: &Settings,
    rng: &mut R,
) -> Result<Compression> {
    let trainer = settings.trainer()?;
    let vectors = partition::extract(buffer, settings.partitioning)?;
    let training = trainer.train(&vectors, rng)?;
    finish(buffer, settings, training)
}

fn finish(buffer: &PixelBuffer, settings: &Settings, training: Training) -> Result<Compression> {
    let Training { codebook, report } = training;
    let reconstructed = Quantizer::new(settings.partitioning, &codebook)?.reconstruct(buffer)?;
    Ok(Compression {
        codebook,
        reconstructed,
        report,
    })
}

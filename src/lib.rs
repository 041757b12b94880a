//! vqpress: lossy image compression by vector quantization.
//!
//! An image is cut into small fixed-size vectors (pixel pairs or square
//! tiles), a codebook of `N` representative codewords is trained on them with
//! k-means++ seeding and Lloyd refinement, and every vector is replaced by its
//! nearest codeword.
//!
//! - [`partition`]: buffer to vectors, and the unit layout used to write back
//! - [`distance`]: squared L2 and exhaustive nearest-codeword search
//! - [`codebook`]: vector sets, codebooks, and training
//! - [`quantize`]: buffer plus codebook to reconstructed buffer
//! - [`raw`], [`compose`], [`quality`]: file input, composite output, error metrics
//!
//! # Example
//!
//! ```
//! use vqpress::buffer::{Channels, PixelBuffer};
//! use vqpress::codebook::TrainParams;
//! use vqpress::pipeline::{compress, Settings};
//!
//! let image = PixelBuffer::filled(16, 16, Channels::Gray, 128);
//! let settings = Settings::from_selectors(2, 2)?.with_params(TrainParams::default().with_seed(42));
//! let out = compress(&image, &settings)?;
//! assert_eq!(out.reconstructed, image);
//! # Ok::<(), vqpress::VqError>(())
//! ```
//!
//! # Nuances
//!
//! ## Integer codewords
//!
//! Codewords stay 8-bit. Cluster means are truncated toward zero, which
//! biases codewords slightly low compared to rounding. Distances are exact
//! `u64` sums, so tie-breaks never depend on float rounding.
//!
//! ## Edges
//!
//! Pairwise mode never covers the last column of an odd-width image; those
//! pixels pass through unchanged. Block mode pads edge tiles by repeating the
//! border pixel when reading, and discards the padded part when writing.

pub mod buffer;
pub mod codebook;
pub mod compose;
pub mod distance;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod quality;
pub mod quantize;
pub mod raw;

// Re-exports
pub use buffer::{Channels, PixelBuffer};
pub use codebook::{Codebook, CodebookTrainer, TrainParams, TrainReport, VectorSet};
pub use error::{Result, VqError};
pub use partition::Partitioning;
pub use quantize::Quantizer;

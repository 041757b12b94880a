//! Error types for vqpress.

use thiserror::Error;

/// Errors that can occur while loading, training, or quantizing.
///
/// Everything except [`VqError::Io`] and [`VqError::Image`] is detected before
/// training starts, so a failed run never yields a partial codebook.
#[derive(Debug, Error)]
pub enum VqError {
    /// Invalid vector-shape selector, codebook size, or buffer shape.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Raw input length matches neither the grayscale nor the color layout.
    #[error(
        "input size mismatch: expected {expected_gray} bytes (grayscale) or \
         {expected_color} bytes (color), got {actual}"
    )]
    InputSize {
        expected_gray: usize,
        expected_color: usize,
        actual: usize,
    },

    /// Read failure or truncated input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Training was asked to run on zero vectors.
    #[error("cannot train a codebook from an empty vector set")]
    EmptyInput,

    /// Codeword dimension does not match the vectors the partitioning produces.
    #[error("dimension mismatch: expected {expected} components, codebook has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Composite image encoding failed.
    #[error("image encoding error: {0}")]
    Image(String),
}

impl From<image::ImageError> for VqError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}

/// Result type for vqpress operations.
pub type Result<T> = std::result::Result<T, VqError>;

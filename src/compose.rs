//! Side-by-side composite for visual comparison.
//!
//! The composite is twice as wide as its inputs: original on the left,
//! reconstruction on the right. Showing it on screen is left to whatever
//! viewer opens the PNG.

use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::buffer::{Channels, PixelBuffer};
use crate::error::{Result, VqError};

/// Place `original` and `reconstructed` next to each other.
pub fn side_by_side(original: &PixelBuffer, reconstructed: &PixelBuffer) -> Result<PixelBuffer> {
    if !original.same_shape(reconstructed) {
        return Err(VqError::Configuration(
            "composite halves must have the same shape".into(),
        ));
    }
    if original.width() == 0 || original.height() == 0 {
        return Err(VqError::Configuration("cannot compose empty buffers".into()));
    }
    let row = original.width() * original.channels().count();
    let mut data = Vec::with_capacity(2 * row * original.height());
    for (left, right) in original
        .as_slice()
        .chunks_exact(row)
        .zip(reconstructed.as_slice().chunks_exact(row))
    {
        data.extend_from_slice(left);
        data.extend_from_slice(right);
    }
    PixelBuffer::from_interleaved(
        2 * original.width(),
        original.height(),
        original.channels(),
        data,
    )
    .ok_or_else(|| VqError::Configuration("composite has the wrong length".into()))
}

/// Write `buffer` as an 8-bit grayscale or RGB PNG.
pub fn save_png(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let width = u32::try_from(buffer.width())
        .map_err(|_| VqError::Configuration("image too wide for PNG".into()))?;
    let height = u32::try_from(buffer.height())
        .map_err(|_| VqError::Configuration("image too tall for PNG".into()))?;
    let data = buffer.as_slice().to_vec();

    match buffer.channels() {
        Channels::Gray => GrayImage::from_raw(width, height, data)
            .ok_or_else(|| VqError::Image("grayscale buffer length mismatch".into()))?
            .save(path)?,
        Channels::Rgb => RgbImage::from_raw(width, height, data)
            .ok_or_else(|| VqError::Image("RGB buffer length mismatch".into()))?
            .save(path)?,
    }
    tracing::info!(path = %path.display(), width, height, "wrote composite");
    Ok(())
}

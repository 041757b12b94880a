//! Reconstruction error.

use crate::buffer::PixelBuffer;
use crate::error::{Result, VqError};

/// Mean squared error over every sample.
pub fn mse(original: &PixelBuffer, reconstructed: &PixelBuffer) -> Result<f64> {
    if !original.same_shape(reconstructed) {
        return Err(VqError::Configuration(
            "cannot compare buffers of different shape".into(),
        ));
    }
    let samples = original.as_slice().len();
    if samples == 0 {
        return Ok(0.0);
    }
    let total: u64 = original
        .as_slice()
        .iter()
        .zip(reconstructed.as_slice())
        .map(|(&a, &b)| {
            let d = u64::from(a.abs_diff(b));
            d * d
        })
        .sum();
    Ok(total as f64 / samples as f64)
}

/// Peak signal-to-noise ratio in dB for 8-bit samples.
///
/// Identical buffers give `f64::INFINITY`.
pub fn psnr(original: &PixelBuffer, reconstructed: &PixelBuffer) -> Result<f64> {
    let mse = mse(original, reconstructed)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn identical_buffers() {
        let a = PixelBuffer::filled(4, 4, Channels::Rgb, 77);
        assert_eq!(mse(&a, &a).unwrap(), 0.0);
        assert!(psnr(&a, &a).unwrap().is_infinite());
    }

    #[test]
    fn known_error() {
        let a = PixelBuffer::from_interleaved(2, 1, Channels::Gray, vec![0, 0]).unwrap();
        let b = PixelBuffer::from_interleaved(2, 1, Channels::Gray, vec![2, 0]).unwrap();
        assert_eq!(mse(&a, &b).unwrap(), 2.0);
        let expected = 10.0 * (65025.0f64 / 2.0).log10();
        assert!((psnr(&a, &b).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn shape_mismatch() {
        let a = PixelBuffer::filled(2, 2, Channels::Gray, 0);
        let b = PixelBuffer::filled(2, 2, Channels::Rgb, 0);
        assert!(mse(&a, &b).is_err());
    }
}

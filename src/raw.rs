//! Raw image files.
//!
//! Inputs are headerless byte streams at a known resolution:
//!
//! ```text
//! grayscale: W*H bytes          row-major intensities
//! color:     3*W*H bytes        R plane | G plane | B plane, each row-major
//! ```
//!
//! The layout is chosen from the length alone; anything else is an
//! [`VqError::InputSize`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::buffer::{Channels, PixelBuffer};
use crate::error::{Result, VqError};

/// Default frame width.
pub const DEFAULT_WIDTH: usize = 352;
/// Default frame height.
pub const DEFAULT_HEIGHT: usize = 288;

/// Decode an in-memory raw frame.
pub fn decode(bytes: &[u8], width: usize, height: usize) -> Result<PixelBuffer> {
    let channels = detect_channels(bytes.len(), width, height)?;
    let frame = width * height;

    let data = match channels {
        Channels::Gray => bytes.to_vec(),
        Channels::Rgb => {
            let (r, rest) = bytes.split_at(frame);
            let (g, b) = rest.split_at(frame);
            let mut data = Vec::with_capacity(3 * frame);
            for i in 0..frame {
                data.extend_from_slice(&[r[i], g[i], b[i]]);
            }
            data
        }
    };

    PixelBuffer::from_interleaved(width, height, channels, data)
        .ok_or_else(|| VqError::Configuration("decoded frame has the wrong length".into()))
}

/// Read and decode a raw frame from disk.
///
/// The expected layout is picked from the file's reported length before any
/// bytes are read; a file that turns out shorter than reported fails with
/// [`VqError::Io`].
pub fn read(path: impl AsRef<Path>, width: usize, height: usize) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let len = usize::try_from(file.metadata()?.len())
        .map_err(|_| VqError::Configuration(format!("{} is too large", path.display())))?;
    detect_channels(len, width, height)?;

    let mut bytes = vec![0u8; len];
    file.read_exact(&mut bytes)?;
    tracing::debug!(path = %path.display(), bytes = len, "read raw frame");

    decode(&bytes, width, height)
}

fn detect_channels(len: usize, width: usize, height: usize) -> Result<Channels> {
    if width == 0 || height == 0 {
        return Err(VqError::Configuration(format!(
            "frame dimensions must be non-zero, got {width}x{height}"
        )));
    }
    let sizes = width
        .checked_mul(height)
        .and_then(|gray| gray.checked_mul(3).map(|color| (gray, color)));
    let Some((gray, color)) = sizes else {
        return Err(VqError::Configuration(format!(
            "frame dimensions {width}x{height} are too large"
        )));
    };
    if len == gray {
        Ok(Channels::Gray)
    } else if len == color {
        Ok(Channels::Rgb)
    } else {
        Err(VqError::InputSize {
            expected_gray: gray,
            expected_color: color,
            actual: len,
        })
    }
}

//! Vector extraction.
//!
//! A [`Partitioning`] splits a [`PixelBuffer`] into *units*: horizontally
//! adjacent pixel pairs, or square tiles. Each unit becomes one vector. The
//! unit sequence is a pure function of the partitioning and the buffer shape,
//! so the quantizer regenerates exactly the positions the extractor used.
//!
//! # Layouts
//!
//! ```text
//! Pairwise (D = 2 * channels)      Block, size 2 (D = 4 * channels)
//!
//!   x: 0 1 | 2 3 | 4 (dropped)       +-----+-----+
//!      [a b] [c d]  e                | a b | c d |
//!                                    | e f | g h |
//!                                    +-----+-----+
//!                                    vector = [a b e f], [c d g h]
//! ```
//!
//! Pairwise units advance two columns at a time; with an odd width the last
//! column is never covered and keeps its original value on reconstruction.
//! Block tiles that cross the right or bottom edge read clamped edge pixels
//! but only ever write back to in-bounds coordinates.

use serde::{Deserialize, Serialize};

use crate::buffer::{Channels, PixelBuffer};
use crate::codebook::VectorSet;
use crate::error::{Result, VqError};

/// How a buffer is cut into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partitioning {
    /// Two horizontally adjacent pixels per vector.
    Pairwise,
    /// `size x size` tiles in raster order.
    Block { size: usize },
}

/// Top-left pixel of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub x: usize,
    pub y: usize,
}

impl Partitioning {
    /// Parse the vector-shape selector `M`.
    ///
    /// `2` selects pairwise vectors; a perfect square `>= 4` selects
    /// `sqrt(M) x sqrt(M)` blocks. Everything else is rejected.
    pub fn from_m(m: usize) -> Result<Self> {
        if m == 2 {
            return Ok(Partitioning::Pairwise);
        }
        let size = (m as f64).sqrt().round() as usize;
        if m >= 4 && size.checked_mul(size) == Some(m) {
            let block = Partitioning::Block { size };
            block.validate()?;
            Ok(block)
        } else {
            Err(VqError::Configuration(format!(
                "M must be 2 or a perfect square >= 4, got {m}"
            )))
        }
    }

    /// Reject hand-built block sizes that `from_m` would never produce, and
    /// sizes whose color vector dimension does not fit in `usize`.
    pub fn validate(self) -> Result<()> {
        match self {
            Partitioning::Block { size } if size < 2 => Err(VqError::Configuration(format!(
                "block size must be at least 2, got {size}"
            ))),
            Partitioning::Block { size }
                if size
                    .checked_mul(size)
                    .and_then(|p| p.checked_mul(Channels::Rgb.count()))
                    .is_none() =>
            {
                Err(VqError::Configuration(format!("block size {size} is too large")))
            }
            _ => Ok(()),
        }
    }

    /// Check that this partitioning can cut a `width x height` buffer.
    ///
    /// A tile may overhang the image, but its side may not exceed the longer
    /// image side.
    pub fn check_fits(self, width: usize, height: usize) -> Result<()> {
        self.validate()?;
        if width == 0 || height == 0 {
            return Err(VqError::Configuration("cannot partition an empty buffer".into()));
        }
        match self {
            Partitioning::Block { size } if size > width.max(height) => {
                Err(VqError::Configuration(format!(
                    "block size {size} exceeds the {width}x{height} frame"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Pixels covered by one unit (before clipping at the border).
    #[inline]
    #[must_use]
    pub const fn pixels_per_unit(self) -> usize {
        match self {
            Partitioning::Pairwise => 2,
            Partitioning::Block { size } => size * size,
        }
    }

    /// Vector dimension for a buffer with the given channel layout.
    #[inline]
    #[must_use]
    pub const fn dimension(self, channels: Channels) -> usize {
        self.pixels_per_unit() * channels.count()
    }

    /// Units of a `width x height` grid in raster order.
    ///
    /// Call [`validate`](Self::validate) first for hand-built block sizes.
    pub fn units(self, width: usize, height: usize) -> impl Iterator<Item = Unit> {
        let (step_x, step_y, limit_x) = match self {
            Partitioning::Pairwise => (2, 1, width.saturating_sub(1)),
            Partitioning::Block { size } => (size, size, width),
        };
        (0..height)
            .step_by(step_y)
            .flat_map(move |y| (0..limit_x).step_by(step_x).map(move |x| Unit { x, y }))
    }

    /// Number of units [`units`](Self::units) yields.
    #[must_use]
    pub fn unit_count(self, width: usize, height: usize) -> usize {
        match self {
            Partitioning::Pairwise => (width / 2) * height,
            Partitioning::Block { size } => width.div_ceil(size) * height.div_ceil(size),
        }
    }

    /// Append the vector for `unit` to `out`.
    ///
    /// Components are unit-row-major and channel-interleaved.
    pub fn gather(self, buffer: &PixelBuffer, unit: Unit, out: &mut Vec<u8>) {
        match self {
            Partitioning::Pairwise => {
                out.extend_from_slice(buffer.pixel(unit.x, unit.y));
                out.extend_from_slice(buffer.pixel(unit.x + 1, unit.y));
            }
            Partitioning::Block { size } => {
                for dy in 0..size {
                    for dx in 0..size {
                        out.extend_from_slice(buffer.pixel_clamped(unit.x + dx, unit.y + dy));
                    }
                }
            }
        }
    }

    /// Write `codeword` back over `unit`, skipping out-of-bounds positions.
    ///
    /// Returns the number of pixels written.
    pub fn scatter(self, buffer: &mut PixelBuffer, unit: Unit, codeword: &[u8]) -> usize {
        let channels = buffer.channels().count();
        let mut pixels = codeword.chunks_exact(channels);
        let mut written = 0;
        match self {
            Partitioning::Pairwise => {
                for dx in 0..2 {
                    if let Some(px) = pixels.next() {
                        written += usize::from(buffer.set_pixel(unit.x + dx, unit.y, px));
                    }
                }
            }
            Partitioning::Block { size } => {
                for dy in 0..size {
                    for dx in 0..size {
                        if let Some(px) = pixels.next() {
                            written +=
                                usize::from(buffer.set_pixel(unit.x + dx, unit.y + dy, px));
                        }
                    }
                }
            }
        }
        written
    }
}

/// Cut `buffer` into its ordered vector set.
pub fn extract(buffer: &PixelBuffer, partitioning: Partitioning) -> Result<VectorSet> {
    partitioning.check_fits(buffer.width(), buffer.height())?;

    let dimension = partitioning.dimension(buffer.channels());
    let count = partitioning.unit_count(buffer.width(), buffer.height());
    let total = count
        .checked_mul(dimension)
        .ok_or_else(|| VqError::Configuration("vector set size overflows usize".into()))?;
    let mut data = Vec::with_capacity(total);
    for unit in partitioning.units(buffer.width(), buffer.height()) {
        partitioning.gather(buffer, unit, &mut data);
    }

    tracing::debug!(?partitioning, dimension, vectors = count, "extracted vectors");
    VectorSet::from_flat(dimension, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize) -> PixelBuffer {
        let data = (0..width * height).map(|i| i as u8).collect();
        PixelBuffer::from_interleaved(width, height, Channels::Gray, data).unwrap()
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(Partitioning::from_m(2).unwrap(), Partitioning::Pairwise);
        assert_eq!(
            Partitioning::from_m(4).unwrap(),
            Partitioning::Block { size: 2 }
        );
        assert_eq!(
            Partitioning::from_m(64).unwrap(),
            Partitioning::Block { size: 8 }
        );
        for bad in [0, 1, 3, 5, 8, 15, usize::MAX, usize::MAX - 1] {
            assert!(
                matches!(Partitioning::from_m(bad), Err(VqError::Configuration(_))),
                "M={bad} should be rejected"
            );
        }
    }

    #[test]
    fn dimensions_per_mode() {
        assert_eq!(Partitioning::Pairwise.dimension(Channels::Gray), 2);
        assert_eq!(Partitioning::Pairwise.dimension(Channels::Rgb), 6);
        let block = Partitioning::Block { size: 3 };
        assert_eq!(block.dimension(Channels::Gray), 9);
        assert_eq!(block.dimension(Channels::Rgb), 27);
    }

    #[test]
    fn pairwise_drops_trailing_odd_column() {
        let buf = gray(5, 2);
        let set = extract(&buf, Partitioning::Pairwise).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.get(0), &[0, 1]);
        assert_eq!(set.get(1), &[2, 3]);
        assert_eq!(set.get(2), &[5, 6]);
        assert_eq!(set.get(3), &[7, 8]);
    }

    #[test]
    fn block_vectors_are_tile_row_major() {
        let buf = gray(4, 2);
        let set = extract(&buf, Partitioning::Block { size: 2 }).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), &[0, 1, 4, 5]);
        assert_eq!(set.get(1), &[2, 3, 6, 7]);
    }

    #[test]
    fn edge_tiles_read_clamped_pixels() {
        // 3x3 image, 2x2 tiles: the right column and bottom row are padded.
        let buf = gray(3, 3);
        let set = extract(&buf, Partitioning::Block { size: 2 }).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.get(1), &[2, 2, 5, 5]);
        assert_eq!(set.get(2), &[6, 7, 6, 7]);
        assert_eq!(set.get(3), &[8, 8, 8, 8]);
    }

    #[test]
    fn color_blocks_interleave_channels() {
        let data: Vec<u8> = (0..12).collect();
        let buf = PixelBuffer::from_interleaved(2, 2, Channels::Rgb, data).unwrap();
        let set = extract(&buf, Partitioning::Block { size: 2 }).unwrap();
        assert_eq!(set.dimension(), 12);
        assert_eq!(set.get(0), (0..12).collect::<Vec<u8>>().as_slice());
    }

    #[test]
    fn scatter_skips_padding() {
        let mut buf = PixelBuffer::filled(3, 3, Channels::Gray, 0);
        let corner = Unit { x: 2, y: 2 };
        let written = Partitioning::Block { size: 2 }.scatter(&mut buf, corner, &[9, 8, 7, 6]);
        assert_eq!(written, 1);
        assert_eq!(buf.pixel(2, 2), &[9]);
        assert_eq!(buf.as_slice().iter().filter(|&&s| s != 0).count(), 1);
    }

    #[test]
    fn unit_count_matches_iterator() {
        for (w, h) in [(1, 1), (5, 3), (8, 8), (7, 2)] {
            for p in [
                Partitioning::Pairwise,
                Partitioning::Block { size: 2 },
                Partitioning::Block { size: 3 },
            ] {
                assert_eq!(p.unit_count(w, h), p.units(w, h).count(), "{p:?} {w}x{h}");
            }
        }
    }

    #[test]
    fn hand_built_block_size_one_is_rejected() {
        let buf = gray(2, 2);
        assert!(extract(&buf, Partitioning::Block { size: 1 }).is_err());
    }

    #[test]
    fn huge_hand_built_block_is_rejected() {
        let block = Partitioning::Block { size: usize::MAX / 2 };
        assert!(matches!(block.validate(), Err(VqError::Configuration(_))));
        assert!(matches!(
            extract(&gray(2, 2), block),
            Err(VqError::Configuration(_))
        ));
    }

    #[test]
    fn block_may_overhang_but_not_exceed_longer_side() {
        let block = Partitioning::Block { size: 4 };
        assert!(block.check_fits(4, 1).is_ok());
        assert!(block.check_fits(1, 4).is_ok());
        assert!(matches!(
            block.check_fits(3, 3),
            Err(VqError::Configuration(_))
        ));
        assert!(Partitioning::Pairwise.check_fits(1, 1).is_ok());
    }
}

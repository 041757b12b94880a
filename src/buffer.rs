//! Pixel buffers.
//!
//! A [`PixelBuffer`] is a fixed-resolution grid of 8-bit samples stored as one
//! flat row-major array. Color buffers are channel-interleaved per pixel
//! (`R G B R G B ...`), regardless of how the source file laid them out.

/// Samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channels {
    /// One intensity sample.
    Gray,
    /// Red, green, blue.
    Rgb,
}

impl Channels {
    /// Number of samples per pixel.
    #[inline]
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Row-major grid of samples with `channels` samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Buffer with every sample set to `value`.
    ///
    /// Zero width or height is allowed here; the partitioning rejects it.
    #[must_use]
    pub fn filled(width: usize, height: usize, channels: Channels, value: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels.count()],
        }
    }

    /// Wrap interleaved samples.
    ///
    /// Returns `None` when `data.len() != width * height * channels`.
    #[must_use]
    pub fn from_interleaved(
        width: usize,
        height: usize,
        channels: Channels,
        data: Vec<u8>,
    ) -> Option<Self> {
        if data.len() != width * height * channels.count() {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its interleaved samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Flat index of the first sample of pixel `(x, y)`.
    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels.count()
    }

    /// Samples of pixel `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let start = self.offset(x, y);
        &self.data[start..start + self.channels.count()]
    }

    /// Samples of pixel `(x, y)`, with coordinates clamped to the nearest edge.
    ///
    /// This is the "virtual padding" read used for tiles that cross the
    /// right or bottom border.
    #[inline]
    pub fn pixel_clamped(&self, x: usize, y: usize) -> &[u8] {
        self.pixel(x.min(self.width - 1), y.min(self.height - 1))
    }

    /// Overwrite pixel `(x, y)`.
    ///
    /// Writes outside the grid are ignored and reported as `false`; virtual
    /// padding is never written back.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, samples: &[u8]) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let n = self.channels.count();
        debug_assert_eq!(samples.len(), n);
        let start = self.offset(x, y);
        self.data[start..start + n].copy_from_slice(samples);
        true
    }

    /// Whether `other` has the same width, height, and channel layout.
    #[must_use]
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }
}

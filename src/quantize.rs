//! Quantization and reconstruction.
//!
//! The quantizer walks the same units the extractor produced, looks up each
//! unit's nearest codeword (same metric and tie-break as training), and
//! writes the codeword back over the unit. Only in-bounds pixels are written;
//! pixels no unit covers keep their original values.

use crate::buffer::PixelBuffer;
use crate::codebook::Codebook;
use crate::error::{Result, VqError};
use crate::partition::Partitioning;

/// Maps buffers onto a trained codebook.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer<'a> {
    partitioning: Partitioning,
    codebook: &'a Codebook,
}

impl<'a> Quantizer<'a> {
    pub fn new(partitioning: Partitioning, codebook: &'a Codebook) -> Result<Self> {
        partitioning.validate()?;
        Ok(Self {
            partitioning,
            codebook,
        })
    }

    #[inline]
    pub fn codebook(&self) -> &'a Codebook {
        self.codebook
    }

    /// Nearest codeword index for every unit of `buffer`, in unit order.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<usize>> {
        self.check(buffer)?;
        let dimension = self.codebook.dimension();
        let mut scratch = Vec::with_capacity(dimension);
        let indices = self
            .partitioning
            .units(buffer.width(), buffer.height())
            .map(|unit| {
                scratch.clear();
                self.partitioning.gather(buffer, unit, &mut scratch);
                self.codebook.nearest(&scratch).0
            })
            .collect();
        Ok(indices)
    }

    /// Write the codewords named by `indices` over a copy of `buffer`.
    ///
    /// `indices` must hold one in-range index per unit.
    pub fn decode(&self, buffer: &PixelBuffer, indices: &[usize]) -> Result<PixelBuffer> {
        self.check(buffer)?;
        let (width, height) = (buffer.width(), buffer.height());
        let expected = self.partitioning.unit_count(width, height);
        if indices.len() != expected {
            return Err(VqError::Configuration(format!(
                "index stream has {} entries, buffer has {expected} units",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.codebook.len()) {
            return Err(VqError::Configuration(format!(
                "codeword index {bad} out of range for a codebook of {}",
                self.codebook.len()
            )));
        }

        let mut out = buffer.clone();
        for (unit, &idx) in self.partitioning.units(width, height).zip(indices) {
            self.partitioning.scatter(&mut out, unit, self.codebook.get(idx));
        }
        Ok(out)
    }

    /// Replace every unit of `buffer` with its nearest codeword.
    pub fn reconstruct(&self, buffer: &PixelBuffer) -> Result<PixelBuffer> {
        let indices = self.encode(buffer)?;
        self.decode(buffer, &indices)
    }

    fn check(&self, buffer: &PixelBuffer) -> Result<()> {
        self.partitioning.check_fits(buffer.width(), buffer.height())?;
        let expected = self.partitioning.dimension(buffer.channels());
        if self.codebook.dimension() != expected {
            return Err(VqError::DimensionMismatch {
                expected,
                actual: self.codebook.dimension(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    fn gray(width: usize, height: usize, data: Vec<u8>) -> PixelBuffer {
        PixelBuffer::from_interleaved(width, height, Channels::Gray, data).unwrap()
    }

    #[test]
    fn pairwise_reconstruction_keeps_odd_column() {
        let buf = gray(3, 1, vec![10, 12, 99]);
        let codebook = Codebook::from_flat(2, vec![11, 11]).unwrap();
        let q = Quantizer::new(Partitioning::Pairwise, &codebook).unwrap();
        let rec = q.reconstruct(&buf).unwrap();
        assert_eq!(rec.as_slice(), &[11, 11, 99]);
    }

    #[test]
    fn block_reconstruction_clips_at_edges() {
        let buf = gray(3, 3, vec![0; 9]);
        let codebook = Codebook::from_flat(4, vec![1, 2, 3, 4]).unwrap();
        let q = Quantizer::new(Partitioning::Block { size: 2 }, &codebook).unwrap();
        let rec = q.reconstruct(&buf).unwrap();
        // Each tile writes only the in-bounds part of [1 2 / 3 4].
        assert_eq!(rec.as_slice(), &[1, 2, 1, 3, 4, 3, 1, 2, 1]);
    }

    #[test]
    fn encode_uses_lowest_index_on_ties() {
        let buf = gray(2, 1, vec![5, 5]);
        let codebook = Codebook::from_flat(2, vec![0, 0, 10, 10]).unwrap();
        let q = Quantizer::new(Partitioning::Pairwise, &codebook).unwrap();
        assert_eq!(q.encode(&buf).unwrap(), vec![0]);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let buf = gray(2, 2, vec![0; 4]);
        let codebook = Codebook::from_flat(2, vec![0, 0]).unwrap();
        let q = Quantizer::new(Partitioning::Block { size: 2 }, &codebook).unwrap();
        assert!(matches!(
            q.encode(&buf),
            Err(VqError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn decode_validates_index_stream() {
        let buf = gray(4, 1, vec![0; 4]);
        let codebook = Codebook::from_flat(2, vec![0, 0, 9, 9]).unwrap();
        let q = Quantizer::new(Partitioning::Pairwise, &codebook).unwrap();
        assert!(q.decode(&buf, &[0]).is_err());
        assert!(q.decode(&buf, &[0, 2]).is_err());
        let out = q.decode(&buf, &[1, 0]).unwrap();
        assert_eq!(out.as_slice(), &[9, 9, 0, 0]);
    }
}

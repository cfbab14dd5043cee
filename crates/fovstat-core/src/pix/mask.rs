//! Binary mask operations
//!
//! Word-wise logical operations and pixel counting on 1 bpp images.

use super::{Pix, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    fn require_binary(&self) -> Result<()> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        Ok(())
    }

    /// Logical AND of two 1 bpp images of identical size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if either image is not 1 bpp and
    /// [`Error::DimensionMismatch`] if the sizes differ.
    pub fn and(&self, other: &Pix) -> Result<Pix> {
        self.require_binary()?;
        other.require_binary()?;
        if self.width() != other.width() || self.height() != other.height() {
            return Err(Error::DimensionMismatch {
                expected: (self.width(), self.height()),
                actual: (other.width(), other.height()),
            });
        }

        let mut out = self.create_template().to_mut();
        for ((d, a), b) in out
            .data_mut()
            .iter_mut()
            .zip(self.data())
            .zip(other.data())
        {
            *d = a & b;
        }
        Ok(out.into())
    }

    /// Count the foreground (set) pixels of a 1 bpp image.
    pub fn count_foreground(&self) -> Result<u64> {
        self.require_binary()?;
        let full_words = (self.width() / 32) as usize;
        let tail_bits = self.width() % 32;
        let tail_mask = if tail_bits == 0 {
            0
        } else {
            u32::MAX << (32 - tail_bits)
        };

        let mut count = 0u64;
        for y in 0..self.height() {
            let row = self.row_data(y);
            count += row[..full_words]
                .iter()
                .map(|w| u64::from(w.count_ones()))
                .sum::<u64>();
            if tail_bits != 0 {
                count += u64::from((row[full_words] & tail_mask).count_ones());
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_with(w: u32, h: u32, pts: &[(u32, u32)]) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for &(x, y) in pts {
            pm.set_pixel(x, y, 1).unwrap();
        }
        pm.into()
    }

    #[test]
    fn test_and() {
        let a = binary_with(40, 2, &[(0, 0), (35, 1), (10, 1)]);
        let b = binary_with(40, 2, &[(0, 0), (35, 1), (11, 1)]);
        let c = a.and(&b).unwrap();
        assert_eq!(c.count_foreground().unwrap(), 2);
        assert_eq!(c.get_pixel(35, 1), Some(1));
        assert_eq!(c.get_pixel(10, 1), Some(0));
    }

    #[test]
    fn test_and_size_mismatch() {
        let a = binary_with(4, 4, &[]);
        let b = binary_with(5, 4, &[]);
        assert!(matches!(a.and(&b), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_count_ignores_padding() {
        let mut pm = Pix::new(33, 1, PixelDepth::Bit1).unwrap().to_mut();
        pm.data_mut().fill(u32::MAX);
        let pix: Pix = pm.into();
        assert_eq!(pix.count_foreground().unwrap(), 33);
    }

    #[test]
    fn test_count_requires_binary() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        assert!(pix.count_foreground().is_err());
    }
}

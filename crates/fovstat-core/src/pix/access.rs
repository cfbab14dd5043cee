//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.
//!
//! # Pixel packing
//!
//! Pixels are packed MSB-to-LSB within each 32-bit word. For example,
//! in a 1-bit image, pixel 0 occupies bit 31 (MSB) of the first word.

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

/// Locate the word index and bit shift holding pixel `x` of row `y`.
#[inline]
fn locate(x: u32, y: u32, wpl: u32, depth: PixelDepth) -> (usize, u32) {
    let bits = depth.bits();
    let bit_offset = x * bits;
    let word = (y * wpl + bit_offset / 32) as usize;
    let shift = 32 - bits - (bit_offset % 32);
    (word, shift)
}

#[inline]
fn read(data: &[u32], x: u32, y: u32, wpl: u32, depth: PixelDepth) -> u32 {
    let (word, shift) = locate(x, y, wpl, depth);
    if depth == PixelDepth::Bit32 {
        data[word]
    } else {
        (data[word] >> shift) & depth.max_value()
    }
}

#[inline]
fn write(data: &mut [u32], x: u32, y: u32, wpl: u32, depth: PixelDepth, val: u32) {
    let (word, shift) = locate(x, y, wpl, depth);
    if depth == PixelDepth::Bit32 {
        data[word] = val;
    } else {
        let mask = depth.max_value() << shift;
        data[word] = (data[word] & !mask) | ((val << shift) & mask);
    }
}

impl Pix {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the word index falls outside the data buffer.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        read(self.data(), x, y, self.wpl(), self.depth())
    }
}

impl PixMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        read(self.data(), x, y, self.wpl(), self.depth())
    }

    /// Set a pixel value at (x, y).
    ///
    /// Values wider than the pixel depth are truncated to the depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the word index falls outside the data buffer.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let (wpl, depth) = (self.wpl(), self.depth());
        write(self.data_mut(), x, y, wpl, depth, val);
    }

    /// Set a pixel if it lies inside the image, ignoring it otherwise.
    ///
    /// Convenient for rendering shapes that may be clipped by the frame.
    #[inline]
    pub fn set_pixel_clipped(&mut self, x: i64, y: i64, val: u32) {
        if x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height()) {
            self.set_pixel_unchecked(x as u32, y as u32, val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_access() {
        let pix = Pix::new(40, 3, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_pixel(0, 0, 1).unwrap();
        pm.set_pixel(31, 1, 1).unwrap();
        pm.set_pixel(32, 2, 1).unwrap();
        assert_eq!(pm.data()[0], 0x8000_0000);
        assert_eq!(pm.data()[2], 0x0000_0001);
        assert_eq!(pm.data()[5], 0x8000_0000);

        let pix: Pix = pm.into();
        assert_eq!(pix.get_pixel(0, 0), Some(1));
        assert_eq!(pix.get_pixel(1, 0), Some(0));
        assert_eq!(pix.get_pixel(32, 2), Some(1));
        assert_eq!(pix.get_pixel(40, 0), None);
    }

    #[test]
    fn test_gray_access() {
        let pix = Pix::new(5, 5, PixelDepth::Bit8).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_pixel(3, 4, 200).unwrap();
        pm.set_pixel(4, 4, 0x1ff).unwrap();
        assert_eq!(pm.get_pixel(3, 4), Some(200));
        assert_eq!(pm.get_pixel(4, 4), Some(0xff));
        assert_eq!(pm.get_pixel(2, 4), Some(0));
    }

    #[test]
    fn test_rgb_access() {
        let pix = Pix::new(2, 2, PixelDepth::Bit32).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_pixel(1, 1, 0x11223344).unwrap();
        assert_eq!(pm.get_pixel(1, 1), Some(0x11223344));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        assert!(pm.set_pixel(4, 0, 1).is_err());
        pm.set_pixel_clipped(-1, 2, 1);
        pm.set_pixel_clipped(2, 2, 1);
        assert_eq!(pm.get_pixel(2, 2), Some(1));
    }
}

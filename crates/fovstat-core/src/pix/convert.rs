//! Depth conversion
//!
//! Conversions between the three depths fovstat works with: 8 bpp gray
//! (decoded micrographs), 1 bpp masks and 32 bpp RGB (overlays).

use super::{Color, Pix, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

/// Luma weights applied to RGB when converting to gray.
const LUMA_WEIGHTS: (f32, f32, f32) = (0.299, 0.587, 0.114);

impl Pix {
    /// Convert to an 8 bpp gray image.
    ///
    /// - 1 bpp: set pixels become 255
    /// - 2, 4, 16 bpp: values are rescaled to 0..=255
    /// - 8 bpp: a shared copy is returned
    /// - 32 bpp: weighted luma of the RGB channels
    pub fn convert_to_gray8(&self) -> Result<Pix> {
        let depth = self.depth();
        if depth == PixelDepth::Bit8 {
            return Ok(self.clone());
        }

        let (w, h) = (self.width(), self.height());
        let mut out = Pix::new(w, h, PixelDepth::Bit8)?.to_mut();
        let max = depth.max_value();
        for y in 0..h {
            for x in 0..w {
                let v = self.get_pixel_unchecked(x, y);
                let g = match depth {
                    PixelDepth::Bit32 => {
                        let (r, g, b) = color::extract_rgb(v);
                        let (wr, wg, wb) = LUMA_WEIGHTS;
                        (wr * r as f32 + wg * g as f32 + wb * b as f32).round() as u32
                    }
                    _ => (v * 255 + max / 2) / max,
                };
                out.set_pixel_unchecked(x, y, g.min(255));
            }
        }
        Ok(out.into())
    }

    /// Binarize an image: every nonzero gray value becomes foreground.
    ///
    /// With `invert`, gray values are complemented (`255 - v`) first, so
    /// only pure white pixels end up as background.
    pub fn binarize_nonzero(&self, invert: bool) -> Result<Pix> {
        let gray = self.convert_to_gray8()?;
        let (w, h) = (gray.width(), gray.height());
        let mut out = Pix::new(w, h, PixelDepth::Bit1)?.to_mut();
        for y in 0..h {
            for x in 0..w {
                let v = gray.get_pixel_unchecked(x, y);
                let v = if invert { 255 - v } else { v };
                if v != 0 {
                    out.set_pixel_unchecked(x, y, 1);
                }
            }
        }
        Ok(out.into())
    }

    /// Render a 1 bpp image as 32 bpp RGB with the given colors.
    pub fn binary_to_rgb(&self, fg: Color, bg: Color) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let (w, h) = (self.width(), self.height());
        let mut out = Pix::new(w, h, PixelDepth::Bit32)?.to_mut();
        let (fg, bg) = (fg.to_pixel32(), bg.to_pixel32());
        for y in 0..h {
            for x in 0..w {
                let v = if self.get_pixel_unchecked(x, y) != 0 { fg } else { bg };
                out.set_pixel_unchecked(x, y, v);
            }
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_gray() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_pixel(0, 0, color::compose_rgb(255, 255, 255)).unwrap();
        pm.set_pixel(1, 0, color::compose_rgb(255, 0, 0)).unwrap();
        let gray = Pix::from(pm).convert_to_gray8().unwrap();
        assert_eq!(gray.get_pixel(0, 0), Some(255));
        assert_eq!(gray.get_pixel(1, 0), Some(76));
    }

    #[test]
    fn test_binary_to_gray() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit1).unwrap().to_mut();
        pm.set_pixel(1, 0, 1).unwrap();
        let gray = Pix::from(pm).convert_to_gray8().unwrap();
        assert_eq!(gray.get_pixel(0, 0), Some(0));
        assert_eq!(gray.get_pixel(1, 0), Some(255));
    }

    #[test]
    fn test_binarize_nonzero_and_invert() {
        let mut pm = Pix::new(3, 1, PixelDepth::Bit8).unwrap().to_mut();
        pm.set_pixel(0, 0, 0).unwrap();
        pm.set_pixel(1, 0, 1).unwrap();
        pm.set_pixel(2, 0, 255).unwrap();
        let gray: Pix = pm.into();

        let plain = gray.binarize_nonzero(false).unwrap();
        assert_eq!(plain.get_pixel(0, 0), Some(0));
        assert_eq!(plain.get_pixel(1, 0), Some(1));
        assert_eq!(plain.get_pixel(2, 0), Some(1));

        let inverted = gray.binarize_nonzero(true).unwrap();
        assert_eq!(inverted.get_pixel(0, 0), Some(1));
        assert_eq!(inverted.get_pixel(1, 0), Some(1));
        assert_eq!(inverted.get_pixel(2, 0), Some(0));
    }

    #[test]
    fn test_binary_to_rgb() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit1).unwrap().to_mut();
        pm.set_pixel(0, 0, 1).unwrap();
        let rgb = Pix::from(pm).binary_to_rgb(Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), Some(Color::WHITE.to_pixel32()));
        assert_eq!(rgb.get_pixel(1, 0), Some(Color::BLACK.to_pixel32()));
    }
}

//! TIFF image format support
//!
//! Reads the first page of a TIFF file into a `Pix` and writes gray, binary
//! and RGB images. Gray images with `WhiteIsZero` photometric interpretation
//! are inverted on read, so pixel values are always intensities.

use crate::{IoError, IoResult};
use fovstat_core::{ImageFormat, Pix, PixMut, PixelDepth, color};
use std::io::{Read, Seek, Write};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray8, Gray16, RGB8};
use tiff::encoder::{Compression, TiffEncoder};

/// TIFF compression format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression
    #[default]
    None,
    /// PackBits compression
    PackBits,
    /// LZW compression
    Lzw,
    /// ZIP/Deflate compression
    Zip,
}

impl TiffCompression {
    /// Convert to tiff crate's Compression enum
    fn to_tiff_compression(self) -> Compression {
        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::PackBits => Compression::Packbits,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Zip => Compression::Deflate(tiff::encoder::DeflateLevel::default()),
        }
    }
}

/// Read the first page of a TIFF image
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| IoError::DecodeError(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF dimensions: {}", e)))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF color type: {}", e)))?;

    // PhotometricInterpretation 0 is WhiteIsZero
    let white_is_zero = decoder
        .get_tag_u32(tiff::tags::Tag::PhotometricInterpretation)
        .map(|v| v == 0)
        .unwrap_or(false);

    let pix_depth = match color_type {
        ColorType::Gray(1) => PixelDepth::Bit1,
        ColorType::Gray(2) => PixelDepth::Bit2,
        ColorType::Gray(4) => PixelDepth::Bit4,
        ColorType::Gray(8) => PixelDepth::Bit8,
        ColorType::Gray(16) => PixelDepth::Bit16,
        ColorType::GrayA(8) | ColorType::GrayA(16) => PixelDepth::Bit8,
        ColorType::RGB(8) | ColorType::RGB(16) | ColorType::RGBA(8) | ColorType::RGBA(16) => {
            PixelDepth::Bit32
        }
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {:?}",
                color_type
            )));
        }
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| IoError::DecodeError(format!("Failed to read TIFF image data: {}", e)))?;

    let mut pix_mut = Pix::new(width, height, pix_depth)?.to_mut();
    match image_data {
        DecodingResult::U8(data) => convert_u8_to_pix(&data, &mut pix_mut, color_type)?,
        DecodingResult::U16(data) => convert_u16_to_pix(&data, &mut pix_mut, color_type)?,
        DecodingResult::F16(data) => {
            let values: Vec<f32> = data.iter().map(|v: &half::f16| v.to_f32()).collect();
            convert_float_to_pix(&values, &mut pix_mut, color_type)?;
        }
        DecodingResult::F32(data) => convert_float_to_pix(&data, &mut pix_mut, color_type)?,
        _ => {
            return Err(IoError::UnsupportedFormat(
                "unsupported TIFF sample format".to_string(),
            ));
        }
    }

    if white_is_zero && pix_depth != PixelDepth::Bit32 {
        let max = pix_depth.max_value();
        for y in 0..height {
            for x in 0..width {
                let v = pix_mut.get_pixel_unchecked(x, y);
                pix_mut.set_pixel_unchecked(x, y, max - v);
            }
        }
    }

    pix_mut.set_informat(ImageFormat::Tiff);
    Ok(pix_mut.into())
}

fn check_len(data_len: usize, needed: usize) -> IoResult<()> {
    if data_len < needed {
        return Err(IoError::InvalidData(format!(
            "TIFF data too short: {} samples, expected {}",
            data_len, needed
        )));
    }
    Ok(())
}

/// Convert U8 data to Pix format
fn convert_u8_to_pix(data: &[u8], pix_mut: &mut PixMut, color_type: ColorType) -> IoResult<()> {
    let width = pix_mut.width() as usize;
    let height = pix_mut.height() as usize;

    match color_type {
        ColorType::Gray(bits @ (1 | 2 | 4)) => {
            // Packed MSB first, rows padded to a byte boundary
            let bits = bits as usize;
            let bytes_per_row = (width * bits).div_ceil(8);
            check_len(data.len(), bytes_per_row * height)?;
            let mask = (1u8 << bits) - 1;
            for y in 0..height {
                for x in 0..width {
                    let bit = x * bits;
                    let shift = 8 - bits - bit % 8;
                    let val = (data[y * bytes_per_row + bit / 8] >> shift) & mask;
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, u32::from(val));
                }
            }
        }
        ColorType::Gray(8) | ColorType::GrayA(8) => {
            let samples = if color_type == ColorType::Gray(8) { 1 } else { 2 };
            check_len(data.len(), width * height * samples)?;
            for y in 0..height {
                for x in 0..width {
                    let val = data[(y * width + x) * samples];
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, u32::from(val));
                }
            }
        }
        ColorType::RGB(8) | ColorType::RGBA(8) => {
            let samples = if color_type == ColorType::RGB(8) { 3 } else { 4 };
            check_len(data.len(), width * height * samples)?;
            for y in 0..height {
                for x in 0..width {
                    let idx = (y * width + x) * samples;
                    let pixel = color::compose_rgb(data[idx], data[idx + 1], data[idx + 2]);
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, pixel);
                }
            }
        }
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported color type for U8 data: {:?}",
                color_type
            )));
        }
    }
    Ok(())
}

/// Convert U16 data to Pix format
fn convert_u16_to_pix(data: &[u16], pix_mut: &mut PixMut, color_type: ColorType) -> IoResult<()> {
    let width = pix_mut.width() as usize;
    let height = pix_mut.height() as usize;

    match color_type {
        ColorType::Gray(16) => {
            check_len(data.len(), width * height)?;
            for y in 0..height {
                for x in 0..width {
                    let val = data[y * width + x];
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, u32::from(val));
                }
            }
        }
        ColorType::GrayA(16) => {
            // Stored as 8 bpp: keep the high byte
            check_len(data.len(), width * height * 2)?;
            for y in 0..height {
                for x in 0..width {
                    let val = data[(y * width + x) * 2] >> 8;
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, u32::from(val));
                }
            }
        }
        ColorType::RGB(16) | ColorType::RGBA(16) => {
            let samples = if color_type == ColorType::RGB(16) { 3 } else { 4 };
            check_len(data.len(), width * height * samples)?;
            for y in 0..height {
                for x in 0..width {
                    let idx = (y * width + x) * samples;
                    let r = (data[idx] >> 8) as u8;
                    let g = (data[idx + 1] >> 8) as u8;
                    let b = (data[idx + 2] >> 8) as u8;
                    pix_mut.set_pixel_unchecked(x as u32, y as u32, color::compose_rgb(r, g, b));
                }
            }
        }
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported color type for U16 data: {:?}",
                color_type
            )));
        }
    }
    Ok(())
}

/// Convert floating-point gray data to 8 bpp by min/max normalization
fn convert_float_to_pix(data: &[f32], pix_mut: &mut PixMut, color_type: ColorType) -> IoResult<()> {
    if !matches!(color_type, ColorType::Gray(_)) || pix_mut.depth() == PixelDepth::Bit32 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported color type for float data: {:?}",
            color_type
        )));
    }
    let width = pix_mut.width() as usize;
    let height = pix_mut.height() as usize;
    check_len(data.len(), width * height)?;

    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = if (max - min).abs() < f32::EPSILON {
        1.0
    } else {
        max - min
    };

    let top = pix_mut.depth().max_value() as f32;
    for y in 0..height {
        for x in 0..width {
            let v = (data[y * width + x] - min) / range * top;
            pix_mut.set_pixel_unchecked(x as u32, y as u32, v.round().clamp(0.0, top) as u32);
        }
    }
    Ok(())
}

/// Write a single-page TIFF image
///
/// Binary images are stored as 8-bit gray with values 0 and 255; 2 and
/// 4 bpp images are widened to 8 bits.
pub fn write_tiff<W: Write + Seek>(
    pix: &Pix,
    writer: W,
    compression: TiffCompression,
) -> IoResult<()> {
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| IoError::EncodeError(format!("TIFF encoder error: {}", e)))?
        .with_compression(compression.to_tiff_compression());

    let width = pix.width();
    let height = pix.height();
    let write_err = |e: tiff::TiffError| IoError::EncodeError(format!("TIFF write error: {}", e));

    match pix.depth() {
        PixelDepth::Bit16 => {
            let mut data = Vec::with_capacity((width * height) as usize);
            for y in 0..height {
                for x in 0..width {
                    data.push(pix.get_pixel_unchecked(x, y) as u16);
                }
            }
            encoder
                .write_image::<Gray16>(width, height, &data)
                .map_err(write_err)?;
        }
        PixelDepth::Bit32 => {
            let mut data = Vec::with_capacity((width * height * 3) as usize);
            for y in 0..height {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    data.extend_from_slice(&[r, g, b]);
                }
            }
            encoder
                .write_image::<RGB8>(width, height, &data)
                .map_err(write_err)?;
        }
        _ => {
            let gray = pix.convert_to_gray8()?;
            let mut data = Vec::with_capacity((width * height) as usize);
            for y in 0..height {
                for x in 0..width {
                    data.push(gray.get_pixel_unchecked(x, y) as u8);
                }
            }
            encoder
                .write_image::<Gray8>(width, height, &data)
                .map_err(write_err)?;
        }
    }

    Ok(())
}

//! PNG image format support
//!
//! Gray images keep their bit depth. Palette images are expanded to
//! 32 bpp RGB, and alpha channels are dropped.

use crate::{IoError, IoResult};
use fovstat_core::{ImageFormat, Pix, PixelDepth, color};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    let (color_type, bit_depth) = reader.output_color_type();

    let pix_depth = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::One) => PixelDepth::Bit1,
        (ColorType::Grayscale, BitDepth::Two) => PixelDepth::Bit2,
        (ColorType::Grayscale, BitDepth::Four) => PixelDepth::Bit4,
        (ColorType::Grayscale, BitDepth::Eight) => PixelDepth::Bit8,
        (ColorType::Grayscale, BitDepth::Sixteen) => PixelDepth::Bit16,
        (ColorType::GrayscaleAlpha, _) => PixelDepth::Bit8,
        _ => PixelDepth::Bit32,
    };

    let palette: Option<Vec<u8>> = reader.info().palette.as_ref().map(|p| p.to_vec());
    if color_type == ColorType::Indexed && palette.is_none() {
        return Err(IoError::InvalidData(
            "indexed PNG without palette".to_string(),
        ));
    }

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let mut pix_mut = Pix::new(width, height, pix_depth)?.to_mut();
    pix_mut.set_informat(ImageFormat::Png);

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let bits = bit_depth as usize;

    // Sub-byte samples are packed MSB first within each byte.
    let packed = |row: &[u8], x: u32| -> u8 {
        let bit = x as usize * bits;
        let shift = 8 - bits - bit % 8;
        (row[bit / 8] >> shift) & ((1u16 << bits) - 1) as u8
    };

    for y in 0..height {
        let row = &data[y as usize * bytes_per_row..(y as usize + 1) * bytes_per_row];
        for x in 0..width {
            let xi = x as usize;
            let val = match color_type {
                ColorType::Grayscale if bits < 8 => u32::from(packed(row, x)),
                ColorType::Grayscale if bits == 16 => {
                    (u32::from(row[xi * 2]) << 8) | u32::from(row[xi * 2 + 1])
                }
                ColorType::Grayscale => u32::from(row[xi]),
                ColorType::GrayscaleAlpha => {
                    let samples = if bits == 16 { 4 } else { 2 };
                    u32::from(row[xi * samples])
                }
                ColorType::Indexed => {
                    let index = usize::from(if bits < 8 { packed(row, x) } else { row[xi] });
                    let entry = palette
                        .as_deref()
                        .and_then(|p| p.get(index * 3..index * 3 + 3))
                        .ok_or_else(|| {
                            IoError::InvalidData(format!("palette index {} out of range", index))
                        })?;
                    color::compose_rgb(entry[0], entry[1], entry[2])
                }
                _ => {
                    let channels = if color_type == ColorType::Rgba { 4 } else { 3 };
                    let step = if bits == 16 { 2 } else { 1 };
                    let idx = xi * channels * step;
                    color::compose_rgb(row[idx], row[idx + step], row[idx + 2 * step])
                }
            };
            pix_mut.set_pixel_unchecked(x, y, val);
        }
    }

    Ok(pix_mut.into())
}

/// Write a PNG image
///
/// 1, 8 and 16 bpp images are written as grayscale at that depth, 2 and
/// 4 bpp images are widened to 8 bpp gray, and 32 bpp images as RGB.
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let pix = match pix.depth() {
        PixelDepth::Bit2 | PixelDepth::Bit4 => pix.convert_to_gray8()?,
        _ => pix.clone(),
    };
    let width = pix.width();
    let height = pix.height();

    let (color_type, bit_depth, bytes_per_row) = match pix.depth() {
        PixelDepth::Bit1 => (ColorType::Grayscale, BitDepth::One, width.div_ceil(8)),
        PixelDepth::Bit16 => (ColorType::Grayscale, BitDepth::Sixteen, width * 2),
        PixelDepth::Bit32 => (ColorType::Rgb, BitDepth::Eight, width * 3),
        _ => (ColorType::Grayscale, BitDepth::Eight, width),
    };
    let bytes_per_row = bytes_per_row as usize;

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(bit_depth);
    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let mut data = vec![0u8; bytes_per_row * height as usize];
    for y in 0..height {
        let row = &mut data[y as usize * bytes_per_row..(y as usize + 1) * bytes_per_row];
        for x in 0..width {
            let val = pix.get_pixel_unchecked(x, y);
            let xi = x as usize;
            match pix.depth() {
                PixelDepth::Bit1 => {
                    if val != 0 {
                        row[xi / 8] |= 1 << (7 - xi % 8);
                    }
                }
                PixelDepth::Bit16 => {
                    row[xi * 2] = (val >> 8) as u8;
                    row[xi * 2 + 1] = val as u8;
                }
                PixelDepth::Bit32 => {
                    let (r, g, b) = color::extract_rgb(val);
                    row[xi * 3..xi * 3 + 3].copy_from_slice(&[r, g, b]);
                }
                _ => row[xi] = val as u8,
            }
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

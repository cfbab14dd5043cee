//! fovstat-io - Image I/O for fovstat
//!
//! Reads and writes the two formats segmented micrographs come in:
//!
//! - **TIFF** via the `tiff` crate (first page only)
//! - **PNG** via the `png` crate
//!
//! The format is detected from the file's magic bytes on read, and from
//! the requested [`ImageFormat`] on write.

mod error;
pub mod format;
pub mod png;
pub mod tiff;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};
pub use fovstat_core::ImageFormat;
pub use self::tiff::TiffCompression;

use fovstat_core::Pix;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

/// Read an image from a file path
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let format = detect_format(path.as_ref())?;
    let reader = BufReader::new(File::open(path.as_ref())?);
    match format {
        ImageFormat::Png => png::read_png(reader),
        ImageFormat::Tiff => tiff::read_tiff(reader),
        ImageFormat::Unknown => Err(IoError::UnsupportedFormat(
            "unknown image format".to_string(),
        )),
    }
}

/// Read an image from memory
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    match detect_format_from_bytes(data)? {
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        ImageFormat::Tiff => tiff::read_tiff(Cursor::new(data)),
        ImageFormat::Unknown => Err(IoError::UnsupportedFormat(
            "unknown image format".to_string(),
        )),
    }
}

/// Write an image to a file path
///
/// TIFF output is LZW compressed.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let file = File::create(path)?;
    match format {
        ImageFormat::Png => png::write_png(pix, BufWriter::new(file)),
        ImageFormat::Tiff => tiff::write_tiff(pix, BufWriter::new(file), TiffCompression::Lzw),
        ImageFormat::Unknown => Err(IoError::UnsupportedFormat(
            "cannot write unknown format".to_string(),
        )),
    }
}

/// Write an image to memory
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => png::write_png(pix, &mut buffer)?,
        ImageFormat::Tiff => tiff::write_tiff(pix, &mut buffer, TiffCompression::Lzw)?,
        ImageFormat::Unknown => {
            return Err(IoError::UnsupportedFormat(
                "cannot write unknown format".to_string(),
            ));
        }
    }
    Ok(buffer.into_inner())
}

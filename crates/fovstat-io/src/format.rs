//! Image format detection
//!
//! Detects image formats by examining magic numbers in the file header.

use crate::{IoError, IoResult};
use fovstat_core::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic numbers for image format detection
mod magic {
    /// PNG: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// TIFF little-endian: II 2A 00
    pub const TIFF_LE: &[u8] = &[0x49, 0x49, 0x2A, 0x00];

    /// TIFF big-endian: MM 00 2A
    pub const TIFF_BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];

    /// BigTIFF little-endian: II 2B 00
    pub const BIGTIFF_LE: &[u8] = &[0x49, 0x49, 0x2B, 0x00];

    /// BigTIFF big-endian: MM 00 2B
    pub const BIGTIFF_BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2B];
}

/// Detect image format from a file path
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<ImageFormat> {
    let mut file = File::open(path).map_err(IoError::Io)?;
    let mut header = [0u8; 8];
    let bytes_read = file.read(&mut header).map_err(IoError::Io)?;
    detect_format_from_bytes(&header[..bytes_read])
}

/// Detect image format from bytes
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 4 {
        return Err(IoError::InvalidData(
            "not enough data to detect format".to_string(),
        ));
    }

    if data.len() >= 8 && data.starts_with(magic::PNG) {
        return Ok(ImageFormat::Png);
    }

    if [
        magic::TIFF_LE,
        magic::TIFF_BE,
        magic::BIGTIFF_LE,
        magic::BIGTIFF_BE,
    ]
    .iter()
    .any(|m| data.starts_with(m))
    {
        return Ok(ImageFormat::Tiff);
    }

    Err(IoError::UnsupportedFormat(
        "unknown image format".to_string(),
    ))
}

/// Guess the format from a file extension (case-insensitive).
///
/// Used to pick an output encoder; reading always goes by magic bytes.
pub fn format_from_extension<P: AsRef<Path>>(path: P) -> ImageFormat {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => ImageFormat::Png,
        Some("tif" | "tiff") => ImageFormat::Tiff,
        _ => ImageFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_tiff() {
        let le = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        let be = [0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
        assert_eq!(detect_format_from_bytes(&le).unwrap(), ImageFormat::Tiff);
        assert_eq!(detect_format_from_bytes(&be).unwrap(), ImageFormat::Tiff);
    }

    #[test]
    fn test_detect_unknown() {
        assert!(matches!(
            detect_format_from_bytes(b"BM\x00\x00\x00\x00"),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format_from_bytes(b"II"),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_from_extension("a/b/Frame1.TIF"), ImageFormat::Tiff);
        assert_eq!(format_from_extension("x.tiff"), ImageFormat::Tiff);
        assert_eq!(format_from_extension("x.png"), ImageFormat::Png);
        assert_eq!(format_from_extension("x.csv"), ImageFormat::Unknown);
    }
}

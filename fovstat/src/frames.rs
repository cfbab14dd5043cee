//! Overlay frames
//!
//! [`FrameWriter`] saves one diagnostic overlay per accepted window as
//! `<dir>/<image id>/Frame<i>.tif`: the part of the mask inside the window
//! in white, with the counted borders in red. A frame that cannot be
//! written is logged and skipped; the statistics are not affected.

use crate::io::{self, IoError, IoResult};
use crate::sampling::{Extraction, SampleRecord, Window, WindowObserver};
use crate::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Writes overlay frames as TIFF files
#[derive(Debug, Clone)]
pub struct FrameWriter {
    dir: PathBuf,
}

impl FrameWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of frame `index` of image `image_id`
    pub fn frame_path(&self, image_id: &str, index: usize) -> PathBuf {
        self.dir.join(image_id).join(format!("Frame{}.tif", index))
    }

    fn write_frame(&self, path: &Path, extraction: &Extraction) -> IoResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let overlay = extraction
            .overlay()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        io::write_image(&overlay, path, ImageFormat::Tiff)
    }
}

impl WindowObserver for FrameWriter {
    fn on_window(&self, image_id: &str, index: usize, _window: &Window, extraction: &Extraction, _record: &SampleRecord) {
        let path = self.frame_path(image_id, index);
        if let Err(e) = self.write_frame(&path, extraction) {
            warn!(path = %path.display(), error = %e, "failed to write frame");
        }
    }
}

//! Image discovery and per-image configuration
//!
//! [`collect_images`] walks an input folder recursively and keeps every
//! file whose magic bytes name a supported format. [`ImageFile`] is the
//! [`MaskSource`] for one such file, keyed by its extension-stripped name.

use crate::io::{self, IoResult};
use crate::sampling::{ImageConfig, MaskSource, SamplingError, SamplingResult};
use crate::{ImageFormat, Pix};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identifier for an image file: its name without extension.
pub fn image_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Find every readable image under `root`, sorted by path.
///
/// Files that are not TIFF or PNG are skipped with a warning.
pub fn collect_images(root: &Path) -> IoResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            match io::detect_format(&path) {
                Ok(ImageFormat::Png | ImageFormat::Tiff) => images.push(path),
                Ok(ImageFormat::Unknown) => warn!(path = %path.display(), "skipping file"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
            }
        }
    }
    images.sort();
    debug!(root = %root.display(), count = images.len(), "images collected");
    Ok(images)
}

/// Per-image configuration: defaults plus overrides by identifier
#[derive(Debug, Clone, Default)]
pub struct ImageConfigs {
    default: ImageConfig,
    scales: HashMap<String, f64>,
    inverted: HashSet<String>,
}

impl ImageConfigs {
    pub fn new(default: ImageConfig) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    /// Use `scale` for the image named `id`
    pub fn set_scale(&mut self, id: impl Into<String>, scale: f64) {
        self.scales.insert(id.into(), scale);
    }

    /// Invert the image named `id`
    pub fn set_invert(&mut self, id: impl Into<String>) {
        self.inverted.insert(id.into());
    }

    /// Whether `id` has its own scale
    pub fn has_scale(&self, id: &str) -> bool {
        self.scales.contains_key(id)
    }

    /// Resolve the configuration for `id`
    pub fn resolve(&self, id: &str) -> ImageConfig {
        ImageConfig {
            invert: self.default.invert || self.inverted.contains(id),
            scale: self.scales.get(id).copied().unwrap_or(self.default.scale),
        }
    }
}

/// An image file on disk
#[derive(Debug, Clone)]
pub struct ImageFile {
    id: String,
    path: PathBuf,
    config: ImageConfig,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, config: ImageConfig) -> Self {
        let path = path.into();
        Self {
            id: image_id(&path),
            path,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MaskSource for ImageFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> ImageConfig {
        self.config
    }

    fn load_image(&self) -> SamplingResult<Pix> {
        io::read_image(&self.path)
            .map_err(|e| SamplingError::Input(format!("{}: {}", self.path.display(), e)))
    }
}

/// Pair every collected path with its resolved configuration.
pub fn image_files(paths: &[PathBuf], configs: &ImageConfigs) -> Vec<ImageFile> {
    paths
        .iter()
        .map(|p| ImageFile::new(p.clone(), configs.resolve(&image_id(p))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id() {
        assert_eq!(image_id(Path::new("/data/run1/500X-BSE_001.tif")), "500X-BSE_001");
        assert_eq!(image_id(Path::new("sample.v2.png")), "sample.v2");
        assert_eq!(image_id(Path::new("noext")), "noext");
    }

    #[test]
    fn test_configs_resolve() {
        let mut configs = ImageConfigs::new(ImageConfig {
            invert: false,
            scale: 2.0,
        });
        configs.set_scale("a", 3.5);
        configs.set_invert("b");
        assert_eq!(configs.resolve("a"), ImageConfig { invert: false, scale: 3.5 });
        assert_eq!(configs.resolve("b"), ImageConfig { invert: true, scale: 2.0 });
        assert_eq!(configs.resolve("c"), ImageConfig { invert: false, scale: 2.0 });
        assert!(configs.has_scale("a"));
        assert!(!configs.has_scale("b"));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let file = ImageFile::new("/nonexistent/fovstat/image.tif", ImageConfig::default());
        assert_eq!(file.id(), "image");
        assert!(matches!(file.load_image(), Err(SamplingError::Input(_))));
    }
}

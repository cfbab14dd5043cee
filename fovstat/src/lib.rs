//! fovstat - Field-of-view feature statistics for segmented micrographs
//!
//! Emulates a small fixed sensing window (90 x 60 physical units) over a
//! much larger segmented image: windows are dropped at random positions
//! and angles, and for each one the number of features inside and their
//! area fraction are recorded.
//!
//! # Overview
//!
//! - Image I/O (TIFF, PNG) in [`io`]
//! - Border following in [`region`]
//! - Window sampling, extraction and statistics in [`sampling`]
//! - Folder input, overlay frames and CSV export in [`input`],
//!   [`frames`] and [`export`]
//!
//! # Example
//!
//! ```
//! use fovstat::sampling::{BatchRunner, ImageConfig, InMemoryImage, NoopObserver, SamplingConfig};
//! use fovstat::{Pix, PixelDepth};
//!
//! let mask = Pix::new(300, 200, PixelDepth::Bit1).unwrap();
//! let runner = BatchRunner::new(SamplingConfig {
//!     run_count: 5,
//!     seed: Some(7),
//!     ..SamplingConfig::default()
//! });
//! let report = runner.run_batch(
//!     &[InMemoryImage::new("empty", mask, ImageConfig::default())],
//!     &NoopObserver,
//! );
//! assert_eq!(report.results.get("empty").map(|t| t.len()), Some(5));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use fovstat_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use fovstat_io as io;
pub use fovstat_region as region;
pub use fovstat_sampling as sampling;

pub mod export;
pub mod frames;
pub mod input;

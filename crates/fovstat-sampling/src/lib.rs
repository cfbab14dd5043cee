//! fovstat-sampling - Field-of-view sampling over segmented images
//!
//! Estimates what a small fixed sensing window would see of a segmented
//! micrograph by dropping randomly placed, randomly rotated windows on the
//! feature mask and measuring the features inside each one.
//!
//! - [`window`] - [`RandomWindowGenerator`] and the [`Window`] value type
//! - [`acceptance`] - [`AcceptanceSampler`], rejection sampling with an
//!   attempt ceiling
//! - [`extract`] - [`FeatureExtractor`], window mask, AND, border tracing
//! - [`stats`] - [`WindowStatistics`], count and area fraction
//! - [`batch`] - [`BatchRunner`] over one image or a collection
//! - [`table`] - [`ResultTable`], [`ResultSet`] and CSV output
//!
//! # Example
//!
//! ```
//! use fovstat_core::{Pix, PixelDepth};
//! use fovstat_sampling::{BatchRunner, ImageConfig, InMemoryImage, NoopObserver, SamplingConfig};
//!
//! let image = Pix::new(300, 200, PixelDepth::Bit8).unwrap();
//! let sources = vec![InMemoryImage::new("blank", image, ImageConfig::default())];
//! let runner = BatchRunner::new(SamplingConfig {
//!     run_count: 10,
//!     seed: Some(1),
//!     ..SamplingConfig::default()
//! });
//! let report = runner.run_batch(&sources, &NoopObserver);
//! let table = report.results.get("blank").unwrap();
//! assert_eq!(table.len(), 10);
//! assert!(table.iter().all(|r| r.number == 0 && r.area_fraction == 0.0));
//! ```

pub mod acceptance;
pub mod batch;
mod error;
pub mod extract;
pub mod stats;
pub mod table;
pub mod window;

pub use acceptance::{AcceptanceSampler, DEFAULT_MAX_ATTEMPTS, DEFAULT_RUN_COUNT, SamplingStats, check_feasible};
pub use batch::{
    BatchReport, BatchRunner, ImageConfig, ImageFailure, InMemoryImage, MaskSource, NoopObserver, PMT_BREADTH,
    PMT_LENGTH, SamplingConfig, WindowObserver, prepare_mask,
};
pub use error::{SamplingError, SamplingResult};
pub use extract::{Component, Extraction, FeatureExtractor};
pub use fovstat_region::ContourRetrieval;
pub use stats::WindowStatistics;
pub use table::{CSV_HEADER, ColumnSummary, ResultSet, ResultTable, SampleRecord, TableSummary};
pub use window::{Domain, MAX_ANGLE_DEG, RandomWindowGenerator, Window};

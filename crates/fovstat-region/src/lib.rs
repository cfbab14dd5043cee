//! fovstat-region - Border following for binary masks
//!
//! This crate provides:
//!
//! - **Border following** - Outer and hole borders of every 8-connected
//!   foreground component, with their nesting ([`ccbord`])
//! - **Contour moments** - Area and centroid of a traced border ([`moments`])
//!
//! # Examples
//!
//! ```
//! use fovstat_core::{Pix, PixelDepth};
//! use fovstat_region::get_all_borders;
//!
//! let pix = Pix::new(20, 20, PixelDepth::Bit1).unwrap();
//! let mut pm = pix.try_into_mut().unwrap();
//! for y in 5..10 {
//!     for x in 5..10 {
//!         pm.set_pixel(x, y, 1).unwrap();
//!     }
//! }
//! let pix: fovstat_core::Pix = pm.into();
//!
//! let borders = get_all_borders(&pix).unwrap();
//! assert_eq!(borders.len(), 1);
//! assert_eq!(borders[0].area(), 16.0);
//! ```

pub mod ccbord;
pub mod error;
pub mod moments;

pub use ccbord::{
    Border, BorderPoint, BorderType, ContourRetrieval, Direction, ScanBox, find_borders,
    find_borders_in, get_all_borders, get_outer_borders,
};
pub use error::{RegionError, RegionResult};
pub use moments::ContourMoments;

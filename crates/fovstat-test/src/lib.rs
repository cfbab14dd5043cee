//! fovstat-test - Regression test framework for fovstat
//!
//! Provides [`RegParams`] for accumulating value checks across one
//! regression test, plus builders for the synthetic masks the tests run on,
//! so no binary fixtures are needed.
//!
//! # Usage
//!
//! ```ignore
//! use fovstat_test::{RegParams, block_mask};
//!
//! let mut rp = RegParams::new("extract");
//! let mask = block_mask(300, 200, 100, 100, 150, 150);
//! rp.compare_values(2601.0, mask.count_foreground().unwrap() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use fovstat_core::{Pix, PixelDepth};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // fovstat-test is at crates/fovstat-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/target/regout", workspace_root())
}

/// Build a 1 bpp mask whose foreground is where `f(x, y)` holds.
pub fn mask_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Pix {
    let mut pm = Pix::new(width, height, PixelDepth::Bit1)
        .expect("valid mask dimensions")
        .to_mut();
    for y in 0..height {
        for x in 0..width {
            if f(x, y) {
                pm.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    pm.into()
}

/// Mask with every pixel foreground.
pub fn filled_mask(width: u32, height: u32) -> Pix {
    mask_from_fn(width, height, |_, _| true)
}

/// Mask with no foreground.
pub fn empty_mask(width: u32, height: u32) -> Pix {
    mask_from_fn(width, height, |_, _| false)
}

/// Mask with one filled block covering `x0..=x1` by `y0..=y1`.
pub fn block_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Pix {
    mask_from_fn(width, height, |x, y| (x0..=x1).contains(&x) && (y0..=y1).contains(&y))
}

/// 8 bpp gray image with the given value inside `x0..=x1` by `y0..=y1`
/// and `background` elsewhere.
pub fn gray_block(
    width: u32,
    height: u32,
    (x0, y0, x1, y1): (u32, u32, u32, u32),
    value: u8,
    background: u8,
) -> Pix {
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)
        .expect("valid image dimensions")
        .to_mut();
    for y in 0..height {
        for x in 0..width {
            let inside = (x0..=x1).contains(&x) && (y0..=y1).contains(&y);
            let v = if inside { value } else { background };
            pm.set_pixel_unchecked(x, y, u32::from(v));
        }
    }
    pm.into()
}

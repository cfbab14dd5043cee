//! Per-window statistics

use crate::error::{SamplingError, SamplingResult};
use crate::table::SampleRecord;

/// Computes component count and area fraction against a fixed nominal
/// window area.
///
/// The nominal area is `length * breadth` regardless of how the window is
/// rotated, matching the fixed field of view being emulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStatistics {
    nominal_area: f64,
}

impl WindowStatistics {
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] if the window has zero area.
    pub fn new(length: u32, breadth: u32) -> SamplingResult<Self> {
        let nominal_area = f64::from(length) * f64::from(breadth);
        if nominal_area <= 0.0 {
            return Err(SamplingError::Configuration(format!(
                "window {}x{} has zero area",
                length, breadth
            )));
        }
        Ok(Self { nominal_area })
    }

    pub fn nominal_area(&self) -> f64 {
        self.nominal_area
    }

    /// Summarize the areas of the valid components in one window.
    pub fn measure(&self, areas: &[f64]) -> SampleRecord {
        SampleRecord {
            number: areas.len(),
            area_fraction: areas.iter().fold(0.0, |acc, a| acc + a) / self.nominal_area,
        }
    }
}

//! Error types for fovstat-sampling

use thiserror::Error;

/// Errors that abort sampling of one image
#[derive(Debug, Error)]
pub enum SamplingError {
    /// Parameters for which sampling cannot succeed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unreadable or malformed feature mask
    #[error("input error: {0}")]
    Input(String),

    /// Raster operation failed
    #[error(transparent)]
    Core(#[from] fovstat_core::Error),

    /// Border tracing failed
    #[error(transparent)]
    Region(#[from] fovstat_region::RegionError),
}

/// Result type for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;

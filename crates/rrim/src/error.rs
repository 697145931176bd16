//! Pipeline error type

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the RRIM pipeline
#[derive(Error, Debug)]
pub enum RrimError {
    #[error(transparent)]
    Core(#[from] rrim_core::Error),

    #[error("input DEM not found or unreadable: {path}")]
    DemNotFound { path: PathBuf },

    #[error("cached raster not found: {path} (run once with save_intermediates before reuse_cached)")]
    MissingCachedRaster { path: PathBuf },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RrimError>;

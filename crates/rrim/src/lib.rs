//! # rrim
//!
//! Red Relief Image Map generation from a DEM, after Chiba, Kaneta &
//! Suzuki (2008). One call runs the whole pipeline:
//!
//! ```ignore
//! use rrim::{rrim, RrimParams};
//!
//! let params = RrimParams {
//!     fill_depressions: true,
//!     ..Default::default()
//! };
//! let composite = rrim("dem.tif", &params)?;
//! ```
//!
//! The pipeline is strictly sequential: load → optional depression fill →
//! slope → openness → HSV composition → georeferenced write-out.
//! Intermediate rasters (slope, positive/negative/differential openness)
//! are written next to the DEM when `save_intermediates` is set and reused
//! on later runs with `reuse_cached`, which is the cheap path for iterating
//! on color parameters only.

pub mod artifacts;
pub mod error;
pub mod params;
pub mod pipeline;

pub use artifacts::Artifact;
pub use error::RrimError;
pub use params::RrimParams;
pub use pipeline::{rrim, z_factor};

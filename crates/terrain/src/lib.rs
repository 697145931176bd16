//! # rrim-terrain
//!
//! Terrain metrics backing the RRIM pipeline:
//!
//! - **fill**: depression filling (Planchon-Darboux 2001)
//! - **slope**: rate of change of elevation (Horn 1981)
//! - **openness**: positive/negative/differential openness
//!   (Yokoyama et al. 2002) via multi-directional ray casting
//!
//! All functions take and return [`rrim_core::Raster<f64>`] and treat NaN
//! as no-data.

pub mod fill;
pub mod openness;
pub mod slope;

pub use fill::{fill_depressions, FillParams};
pub use openness::{
    differential_openness, negative_openness, openness, positive_openness, OpennessParams,
    OpennessSet,
};
pub use slope::{slope, SlopeParams};

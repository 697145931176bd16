//! # rrim-core
//!
//! Core raster types and GeoTIFF I/O for the rrim workspace.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced 2D grid over `ndarray`
//! - `GeoTransform`: affine pixel-to-map transformation
//! - `Crs`: coordinate reference system handle
//! - GDAL-backed GeoTIFF reading and writing, including the 3-band
//!   8-bit writer used for the final composite

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod transform;

pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{Raster, RasterElement};
pub use transform::GeoTransform;

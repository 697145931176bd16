//! # rrim-composite
//!
//! Color composition for Red Relief Image Maps.
//!
//! Slope drives the saturation channel, differential openness drives the
//! value channel, the hue is fixed red. The result is three 8-bit rasters
//! (R, G, B) sharing the DEM's georeferencing, ready for
//! [`rrim_core::io::write_rgb_geotiff`].

mod compose;
mod hsv;

pub use compose::{
    compose, saturation_channel, value_channel, ComposeParams, RRIM_HUE_DEG,
};
pub use hsv::{hsv_to_rgb, Rgb};

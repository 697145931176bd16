//! Slope + differential openness -> RGB composite

use crate::hsv::{hsv_to_rgb, Rgb};
use rayon::prelude::*;
use rrim_core::{Error, Raster, Result};

/// The fixed RRIM hue: red.
pub const RRIM_HUE_DEG: f64 = 0.0;

/// Parameters for color composition
#[derive(Debug, Clone)]
pub struct ComposeParams {
    /// Red saturation scaling. At the default of 90 a 90° slope maps to
    /// full saturation; larger values push moderate slopes toward full red.
    pub saturation: f64,
    /// Brightness scaling for the openness channel. At the default of 150
    /// a differential openness of 0° maps to mid gray.
    pub brightness: f64,
    /// Color for no-data pixels
    pub nodata_color: [u8; 3],
}

impl Default for ComposeParams {
    fn default() -> Self {
        Self {
            saturation: 90.0,
            brightness: 150.0,
            nodata_color: [0, 0, 0],
        }
    }
}

impl ComposeParams {
    /// Reject scaling values the channel math cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.saturation <= 0.0 || !self.saturation.is_finite() {
            return Err(Error::InvalidParameter {
                name: "saturation",
                value: self.saturation.to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
        if self.brightness <= 0.0 || !self.brightness.is_finite() {
            return Err(Error::InvalidParameter {
                name: "brightness",
                value: self.brightness.to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Saturation channel in [0, 1] for a slope value in degrees.
///
/// The slope is clamped to [0°, 90°] first, then scaled by
/// `saturation / 90`; increasing the saturation parameter never lowers the
/// channel (it saturates at 1).
pub fn saturation_channel(slope_deg: f64, saturation: f64) -> f64 {
    let t = (slope_deg.abs() / 90.0).clamp(0.0, 1.0);
    (t * saturation / 90.0).clamp(0.0, 1.0)
}

/// Value channel in [0, 1] for a differential openness value in degrees.
///
/// Differential openness is clamped to [-90°, 90°] and shifted so 0° is mid
/// gray, then scaled by `brightness / 150`; increasing brightness never
/// lowers the channel.
pub fn value_channel(diff_openness: f64, brightness: f64) -> f64 {
    let t = ((diff_openness + 90.0) / 180.0).clamp(0.0, 1.0);
    (t * brightness / 150.0).clamp(0.0, 1.0)
}

/// Compose slope and differential openness into an RGB composite.
///
/// Both inputs must share the DEM grid; the output bands carry the same
/// transform and CRS. Pixels that are no-data in either input get
/// `params.nodata_color`.
pub fn compose(
    slope: &Raster<f64>,
    diff_openness: &Raster<f64>,
    params: &ComposeParams,
) -> Result<[Raster<u8>; 3]> {
    params.validate()?;

    let (rows, cols) = slope.shape();
    let (ar, ac) = diff_openness.shape();
    if (ar, ac) != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar,
            ac,
        });
    }

    let nodata = Rgb::new(
        params.nodata_color[0],
        params.nodata_color[1],
        params.nodata_color[2],
    );

    let pixels: Vec<Rgb> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_pixels = vec![nodata; cols];

            for col in 0..cols {
                let s_val = unsafe { slope.get_unchecked(row, col) };
                let o_val = unsafe { diff_openness.get_unchecked(row, col) };
                if s_val.is_nan() || o_val.is_nan() {
                    continue;
                }

                let s = saturation_channel(s_val, params.saturation);
                let v = value_channel(o_val, params.brightness);
                row_pixels[col] = hsv_to_rgb(RRIM_HUE_DEG, s, v);
            }

            row_pixels
        })
        .collect();

    let mut bands: [Raster<u8>; 3] = [
        slope.with_same_meta(),
        slope.with_same_meta(),
        slope.with_same_meta(),
    ];

    for (i, pixel) in pixels.iter().enumerate() {
        let (row, col) = (i / cols, i % cols);
        bands[0].data_mut()[(row, col)] = pixel.r;
        bands[1].data_mut()[(row, col)] = pixel.g;
        bands[2].data_mut()[(row, col)] = pixel.b;
    }

    Ok(bands)
}

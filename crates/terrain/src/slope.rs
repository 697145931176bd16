//! Slope from a DEM
//!
//! Horn (1981) 3x3 finite differences, output in degrees. Border cells are
//! computed with edge replication instead of being dropped, so the slope
//! raster covers the full DEM grid (the compositor expects no NaN fringe
//! around valid data).

use ndarray::Array2;
use rayon::prelude::*;
use rrim_core::{Error, Raster, Result};

/// Parameters for slope calculation
#[derive(Debug, Clone)]
pub struct SlopeParams {
    /// Vertical exaggeration / unit correction factor. Use the latitude
    /// correction for geographic DEMs with elevations in meters.
    pub z_factor: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self { z_factor: 1.0 }
    }
}

/// Calculate slope in degrees from a DEM.
///
/// Horn's method over the 3x3 neighborhood:
/// ```text
/// a b c
/// d e f
/// g h i
/// ```
/// dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cellsize)
/// dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cellsize)
/// slope = atan(sqrt(dz/dx² + dz/dy²))
///
/// Cells whose neighborhood contains no-data produce NaN.
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    if params.z_factor <= 0.0 || !params.z_factor.is_finite() {
        return Err(Error::InvalidParameter {
            name: "z_factor",
            value: params.z_factor.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }

    let (rows, cols) = dem.shape();
    let cell_size = dem.cell_size() / params.z_factor;
    let eight_cell_size = 8.0 * cell_size;

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            // Edge replication: clamp neighbor indices to the grid
            let rm = row.saturating_sub(1);
            let rp = (row + 1).min(rows - 1);

            for col in 0..cols {
                let e = unsafe { dem.get_unchecked(row, col) };
                if e.is_nan() {
                    continue;
                }

                let cm = col.saturating_sub(1);
                let cp = (col + 1).min(cols - 1);

                let a = unsafe { dem.get_unchecked(rm, cm) };
                let b = unsafe { dem.get_unchecked(rm, col) };
                let c = unsafe { dem.get_unchecked(rm, cp) };
                let d = unsafe { dem.get_unchecked(row, cm) };
                let f = unsafe { dem.get_unchecked(row, cp) };
                let g = unsafe { dem.get_unchecked(rp, cm) };
                let h = unsafe { dem.get_unchecked(rp, col) };
                let i = unsafe { dem.get_unchecked(rp, cp) };

                if [a, b, c, d, f, g, h, i].iter().any(|v| v.is_nan()) {
                    continue;
                }

                let dz_dx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / eight_cell_size;
                let dz_dy = ((g + 2.0 * h + i) - (a + 2.0 * b + c)) / eight_cell_size;

                row_data[col] = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan().to_degrees();
            }

            row_data
        })
        .collect();

    let mut output: Raster<f64> = dem.with_same_meta();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

//! Terrain openness (Yokoyama et al. 2002)
//!
//! Positive openness: mean over all azimuth directions of (90° - max
//! elevation angle to the horizon). Negative openness: the same looking
//! down. Differential openness (positive minus negative) is the value
//! channel of the RRIM composite: ridges go positive, valleys negative.

use ndarray::Array2;
use rayon::prelude::*;
use rrim_core::{Error, Raster, Result};

/// Parameters for openness computation
#[derive(Debug, Clone)]
pub struct OpennessParams {
    /// Number of azimuth directions (default 8)
    pub directions: usize,
    /// Search radius in cells (default 10)
    pub radius: usize,
    /// Noise suppression level 0-3. Level n takes the (n+1)-th highest
    /// elevation angle along each ray instead of the maximum, so single-cell
    /// spikes stop dominating the horizon.
    pub noise: u8,
}

impl Default for OpennessParams {
    fn default() -> Self {
        Self {
            directions: 8,
            radius: 10,
            noise: 0,
        }
    }
}

impl OpennessParams {
    /// Reject parameter combinations the ray caster cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: self.radius.to_string(),
                reason: "search radius must be > 0".to_string(),
            });
        }
        if self.directions == 0 {
            return Err(Error::InvalidParameter {
                name: "directions",
                value: self.directions.to_string(),
                reason: "need at least one direction".to_string(),
            });
        }
        if self.noise > 3 {
            return Err(Error::InvalidParameter {
                name: "noise",
                value: self.noise.to_string(),
                reason: "noise level ranges 0-3".to_string(),
            });
        }
        Ok(())
    }
}

/// The three openness rasters produced for one DEM
#[derive(Debug, Clone)]
pub struct OpennessSet {
    pub positive: Raster<f64>,
    pub negative: Raster<f64>,
    pub differential: Raster<f64>,
}

/// Compute positive, negative and differential openness in one call
pub fn openness(dem: &Raster<f64>, params: &OpennessParams) -> Result<OpennessSet> {
    let positive = positive_openness(dem, params)?;
    let negative = negative_openness(dem, params)?;
    let differential = differential_openness(&positive, &negative)?;

    Ok(OpennessSet {
        positive,
        negative,
        differential,
    })
}

/// Compute positive terrain openness in degrees.
///
/// Flat open terrain approaches 90°; pits and gorges go lower.
pub fn positive_openness(dem: &Raster<f64>, params: &OpennessParams) -> Result<Raster<f64>> {
    compute_openness(dem, params, Aspect::Up)
}

/// Compute negative terrain openness in degrees.
///
/// The mirror of positive openness: low values mark peaks and ridges.
pub fn negative_openness(dem: &Raster<f64>, params: &OpennessParams) -> Result<Raster<f64>> {
    compute_openness(dem, params, Aspect::Down)
}

/// Differential openness: positive minus negative, elementwise.
///
/// NaN in either input propagates to the output.
pub fn differential_openness(
    positive: &Raster<f64>,
    negative: &Raster<f64>,
) -> Result<Raster<f64>> {
    let (rows, cols) = positive.shape();
    let (ar, ac) = negative.shape();
    if (ar, ac) != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar,
            ac,
        });
    }

    let mut output: Raster<f64> = positive.with_same_meta();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = positive.data() - negative.data();

    Ok(output)
}

#[derive(Clone, Copy)]
enum Aspect {
    Up,
    Down,
}

fn compute_openness(
    dem: &Raster<f64>,
    params: &OpennessParams,
    aspect: Aspect,
) -> Result<Raster<f64>> {
    params.validate()?;

    let (rows, cols) = dem.shape();
    let cell_size = dem.cell_size();
    let n_dirs = params.directions;

    let dir_vectors: Vec<(f64, f64)> = (0..n_dirs)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n_dirs as f64;
            (angle.sin(), angle.cos())
        })
        .collect();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            let mut angles = Vec::with_capacity(params.radius);

            for col in 0..cols {
                let z0 = unsafe { dem.get_unchecked(row, col) };
                if z0.is_nan() {
                    continue;
                }

                let mut angle_sum = 0.0;

                for &(dc_step, dr_step) in &dir_vectors {
                    angles.clear();
                    cast_ray(
                        dem, row, col, z0, dr_step, dc_step, params.radius, cell_size, rows,
                        cols, aspect, &mut angles,
                    );
                    let horizon = horizon_angle(&angles, params.noise);
                    angle_sum += (90.0_f64.to_radians() - horizon.max(0.0)).to_degrees();
                }

                row_data[col] = angle_sum / n_dirs as f64;
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

/// March one ray and collect the elevation (or depression) angle to every
/// cell along it. Stops at the grid edge or at no-data.
#[allow(clippy::too_many_arguments)]
fn cast_ray(
    dem: &Raster<f64>,
    row: usize,
    col: usize,
    z0: f64,
    dr_step: f64,
    dc_step: f64,
    radius: usize,
    cell_size: f64,
    rows: usize,
    cols: usize,
    aspect: Aspect,
    angles: &mut Vec<f64>,
) {
    for step in 1..=radius {
        let fr = row as f64 + dr_step * step as f64;
        let fc = col as f64 + dc_step * step as f64;
        let nr = fr.round() as isize;
        let nc = fc.round() as isize;

        if nr < 0 || nc < 0 || (nr as usize) >= rows || (nc as usize) >= cols {
            break;
        }

        let z = unsafe { dem.get_unchecked(nr as usize, nc as usize) };
        if z.is_nan() {
            break;
        }

        let dist = ((fr - row as f64).powi(2) + (fc - col as f64).powi(2)).sqrt() * cell_size;
        if dist < f64::EPSILON {
            continue;
        }

        let dz = match aspect {
            Aspect::Up => z - z0,
            Aspect::Down => z0 - z,
        };
        angles.push((dz / dist).atan());
    }
}

/// Horizon angle from the collected ray angles.
///
/// noise = 0 takes the maximum; level n skips the n highest angles, falling
/// back to the lowest available when the ray is shorter than n + 1 cells.
fn horizon_angle(angles: &[f64], noise: u8) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    if noise == 0 {
        return angles.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    }

    let mut sorted = angles.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let idx = (noise as usize).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rrim_core::GeoTransform;

    fn georeferenced(mut dem: Raster<f64>) -> Raster<f64> {
        let rows = dem.rows() as f64;
        dem.set_transform(GeoTransform::new(0.0, rows, 1.0, -1.0));
        dem
    }

    fn cone(rows: usize, cols: usize, scale: f64, base: f64) -> Raster<f64> {
        let mut dem: Raster<f64> = Raster::new(rows, cols);
        let cr = rows as f64 / 2.0;
        let cc = cols as f64 / 2.0;
        for row in 0..rows {
            for col in 0..cols {
                let d = ((row as f64 - cr).powi(2) + (col as f64 - cc).powi(2)).sqrt();
                dem.set(row, col, base + d * scale).unwrap();
            }
        }
        georeferenced(dem)
    }

    #[test]
    fn flat_terrain_is_fully_open() {
        let dem = georeferenced(Raster::filled(21, 21, 100.0));
        let set = openness(&dem, &OpennessParams::default()).unwrap();

        let pos = set.positive.get(10, 10).unwrap();
        let neg = set.negative.get(10, 10).unwrap();
        assert!((pos - 90.0).abs() < 1e-9, "flat positive openness: {}", pos);
        assert!((neg - 90.0).abs() < 1e-9, "flat negative openness: {}", neg);
        assert!(set.differential.get(10, 10).unwrap().abs() < 1e-9);
    }

    #[test]
    fn pit_lowers_positive_openness() {
        // Upward cone: the center sits in a funnel
        let dem = cone(21, 21, 10.0, 0.0);
        let result = positive_openness(&dem, &OpennessParams::default()).unwrap();
        let center = result.get(10, 10).unwrap();
        assert!(center < 80.0, "funnel center should be enclosed, got {}", center);
    }

    #[test]
    fn peak_lowers_negative_openness() {
        // Downward cone: the center is a summit
        let dem = cone(21, 21, -5.0, 100.0);
        let result = negative_openness(&dem, &OpennessParams::default()).unwrap();
        let center = result.get(10, 10).unwrap();
        assert!(center < 80.0, "summit should have low negative openness, got {}", center);
    }

    #[test]
    fn differential_is_positive_minus_negative() {
        let dem = cone(15, 15, 3.0, 50.0);
        let params = OpennessParams::default();
        let set = openness(&dem, &params).unwrap();

        for row in 0..15 {
            for col in 0..15 {
                let p = set.positive.get(row, col).unwrap();
                let n = set.negative.get(row, col).unwrap();
                let d = set.differential.get(row, col).unwrap();
                assert!(
                    (d - (p - n)).abs() < 1e-12,
                    "diff mismatch at ({}, {}): {} vs {} - {}",
                    row,
                    col,
                    d,
                    p,
                    n
                );
            }
        }
    }

    #[test]
    fn noise_level_ignores_single_spike() {
        // Flat plain with one needle next to the probe cell
        let mut dem = georeferenced(Raster::filled(21, 21, 100.0));
        dem.set(10, 12, 200.0).unwrap();

        let clean = positive_openness(
            &dem,
            &OpennessParams {
                noise: 1,
                ..Default::default()
            },
        )
        .unwrap();
        let raw = positive_openness(&dem, &OpennessParams::default()).unwrap();

        let probe = (10, 10);
        assert!(
            clean.get(probe.0, probe.1).unwrap() > raw.get(probe.0, probe.1).unwrap(),
            "noise removal should open the horizon"
        );
    }

    #[test]
    fn rejects_invalid_params() {
        let dem = georeferenced(Raster::filled(5, 5, 1.0));
        let bad_radius = OpennessParams {
            radius: 0,
            ..Default::default()
        };
        let bad_dirs = OpennessParams {
            directions: 0,
            ..Default::default()
        };
        let bad_noise = OpennessParams {
            noise: 4,
            ..Default::default()
        };
        assert!(positive_openness(&dem, &bad_radius).is_err());
        assert!(positive_openness(&dem, &bad_dirs).is_err());
        assert!(positive_openness(&dem, &bad_noise).is_err());
    }

    #[test]
    fn differential_rejects_shape_mismatch() {
        let a: Raster<f64> = Raster::new(4, 4);
        let b: Raster<f64> = Raster::new(5, 4);
        assert!(differential_openness(&a, &b).is_err());
    }

    #[test]
    fn nodata_propagates() {
        let mut dem = georeferenced(Raster::filled(9, 9, 50.0));
        dem.set(4, 4, f64::NAN).unwrap();
        dem.set_nodata(Some(f64::NAN));

        let set = openness(&dem, &OpennessParams::default()).unwrap();
        assert!(set.positive.get(4, 4).unwrap().is_nan());
        assert!(set.differential.get(4, 4).unwrap().is_nan());
    }
}

//! Depression filling
//!
//! Planchon-Darboux (2001) two-pass iterative lowering. Every interior cell
//! is raised to the lowest level from which water can still drain off the
//! grid edge, so downstream openness is not distorted by single-cell pits.
//!
//! Reference:
//! Planchon, O., Darboux, F. (2001). A fast, simple and versatile algorithm
//! to fill the depressions of digital elevation models. Catena, 46(2-3).

use ndarray::Array2;
use rrim_core::{Raster, Result};

/// Parameters for depression filling
#[derive(Debug, Clone)]
pub struct FillParams {
    /// Minimum slope enforced between filled cells. 0.0 leaves flats flat,
    /// which keeps the operation idempotent.
    pub min_slope: f64,
}

impl Default for FillParams {
    fn default() -> Self {
        Self { min_slope: 0.0 }
    }
}

/// D8 neighbor offsets: (row_offset, col_offset)
const D8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// D8 step lengths relative to the cell size
const D8_DISTANCES: [f64; 8] = [
    std::f64::consts::SQRT_2, 1.0, std::f64::consts::SQRT_2,
    1.0,                           1.0,
    std::f64::consts::SQRT_2, 1.0, std::f64::consts::SQRT_2,
];

/// Fill depressions in a DEM.
///
/// The water surface W starts at the DEM on the border and at +inf in the
/// interior, then is lowered in alternating raster scans until stable.
/// NaN cells are left untouched and act as drainage outlets: a valid cell
/// next to no-data can always shed water into it, so regions fully enclosed
/// by no-data (masked seas, clipped tiles) still drain. Filling an
/// already-filled DEM returns it unchanged.
pub fn fill_depressions(dem: &Raster<f64>, params: FillParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let epsilon = params.min_slope * dem.cell_size();

    if rows < 3 || cols < 3 {
        // Nothing interior to fill
        return Ok(dem.clone());
    }

    let big_value = f64::MAX / 2.0;
    let mut w = Array2::from_elem((rows, cols), big_value);

    for row in 0..rows {
        for col in 0..cols {
            let val = unsafe { dem.get_unchecked(row, col) };
            let on_border = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;

            if val.is_nan() || on_border || touches_nodata(dem, row, col, rows, cols) {
                w[(row, col)] = val;
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;

        let forward: Vec<(usize, usize)> = (1..rows - 1)
            .flat_map(|r| (1..cols - 1).map(move |c| (r, c)))
            .collect();

        changed |= relax(dem, &mut w, forward.iter().copied(), epsilon, big_value);
        changed |= relax(dem, &mut w, forward.iter().rev().copied(), epsilon, big_value);
    }

    let mut output: Raster<f64> = dem.with_same_meta();
    output.set_nodata(dem.nodata());
    *output.data_mut() = w;

    Ok(output)
}

/// Whether any D8 neighbor of (row, col) is no-data
fn touches_nodata(dem: &Raster<f64>, row: usize, col: usize, rows: usize, cols: usize) -> bool {
    D8_OFFSETS.iter().any(|&(dr, dc)| {
        let nr = row as isize + dr;
        let nc = col as isize + dc;
        if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= cols {
            return false;
        }
        unsafe { dem.get_unchecked(nr as usize, nc as usize) }.is_nan()
    })
}

/// One scan over the interior in the given order. Returns whether any W
/// value was lowered.
fn relax(
    dem: &Raster<f64>,
    w: &mut Array2<f64>,
    order: impl Iterator<Item = (usize, usize)>,
    epsilon: f64,
    big_value: f64,
) -> bool {
    let mut changed = false;

    for (row, col) in order {
        let dem_val = unsafe { dem.get_unchecked(row, col) };
        if dem_val.is_nan() || w[(row, col)] <= dem_val {
            continue;
        }

        for (idx, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
            let nr = (row as isize + dr) as usize;
            let nc = (col as isize + dc) as usize;

            let wn = w[(nr, nc)];
            if wn.is_nan() || wn >= big_value {
                continue;
            }

            let candidate = wn + epsilon * D8_DISTANCES[idx];
            if dem_val >= candidate {
                // Cell drains over this neighbor at its own elevation
                w[(row, col)] = dem_val;
                changed = true;
                break;
            }
            if w[(row, col)] > candidate {
                w[(row, col)] = candidate;
                changed = true;
            }
        }
    }

    changed
}

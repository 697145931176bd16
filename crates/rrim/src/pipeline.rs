//! The RRIM pipeline
//!
//! Load -> optional depression fill -> slope -> openness -> composition ->
//! write-out. Strictly sequential; the only branch is `reuse_cached`, which
//! replaces the terrain metrics stage with a load of the rasters a previous
//! run saved.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use rrim_composite::{compose, ComposeParams};
use rrim_core::io::{read_geotiff, write_geotiff, write_rgb_geotiff};
use rrim_core::Raster;
use rrim_terrain::{fill_depressions, openness, slope, FillParams, OpennessParams, SlopeParams};

use crate::artifacts::Artifact;
use crate::error::{Result, RrimError};
use crate::params::RrimParams;

/// Generate a Red Relief Image Map from a DEM.
///
/// Writes the composite as `<stem>_rrim.tif` next to the input and returns
/// its path. Intermediate rasters are written when
/// `params.save_intermediates` is set and loaded instead of recomputed when
/// `params.reuse_cached` is set (failing if they are missing).
pub fn rrim<P: AsRef<Path>>(dem_path: P, params: &RrimParams) -> Result<PathBuf> {
    let dem_path = dem_path.as_ref();
    params.validate()?;

    let dem = load_dem(dem_path, params.nodata)?;
    log_dem_summary(dem_path, &dem, params);

    let (slope_raster, diff_openness) = if params.reuse_cached {
        load_cached_metrics(dem_path, &dem)?
    } else {
        compute_metrics(dem_path, dem, params)?
    };

    info!("composing RRIM image");
    let bands = compose(
        &slope_raster,
        &diff_openness,
        &ComposeParams {
            saturation: params.saturation,
            brightness: params.brightness,
            ..Default::default()
        },
    )?;

    let composite_path = Artifact::Composite.path_for(dem_path);
    write_rgb_geotiff(&bands, &composite_path, None)?;
    info!(path = %composite_path.display(), "RRIM composite written");

    Ok(composite_path)
}

/// Z-factor correcting slope for DEMs in geographic (degree) coordinates.
///
/// Elevations are assumed to be meters; one degree of longitude spans about
/// 111320 * cos(latitude) meters, with the latitude taken from the
/// transform origin. Projected DEMs get 1.0.
pub fn z_factor(dem: &Raster<f64>) -> f64 {
    let geographic = dem.crs().map(|c| c.is_geographic()).unwrap_or(false);
    if !geographic {
        return 1.0;
    }

    let lat = dem.transform().origin_y.clamp(-89.0, 89.0);
    1.0 / (111_320.0 * lat.to_radians().cos())
}

fn load_dem(path: &Path, nodata: f64) -> Result<Raster<f64>> {
    if !path.is_file() {
        return Err(RrimError::DemNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut dem: Raster<f64> = read_geotiff(path, None)?;

    // Sentinel no-data (the band's own marker or the caller's override)
    // becomes NaN so every stage shares one convention.
    if let Some(band_nodata) = dem.nodata() {
        dem.normalize_nodata(band_nodata);
    }
    dem.normalize_nodata(nodata);

    Ok(dem)
}

fn log_dem_summary(path: &Path, dem: &Raster<f64>, params: &RrimParams) {
    let (rows, cols) = dem.shape();
    let z = z_factor(dem);
    let cell_m = dem.cell_size() / z;

    info!(dem = %path.display(), rows, cols, "DEM loaded");
    if let Some((min, max)) = dem.value_range() {
        info!("elevation range: {:.1} - {:.1}", min, max);
    }
    info!(
        "cell size: {:.2} m, search radius: {} px / {:.0} m",
        cell_m,
        params.radius,
        params.radius as f64 * cell_m
    );
}

/// Terrain metrics stage: fill, slope, openness, optional save-out.
/// Returns the two rasters the compositor needs.
fn compute_metrics(
    dem_path: &Path,
    dem: Raster<f64>,
    params: &RrimParams,
) -> Result<(Raster<f64>, Raster<f64>)> {
    let dem = if params.fill_depressions {
        info!("filling depressions");
        fill_depressions(&dem, FillParams::default())?
    } else {
        debug!("depression filling skipped");
        dem
    };

    info!("computing slope");
    let slope_raster = slope(
        &dem,
        SlopeParams {
            z_factor: z_factor(&dem),
        },
    )?;

    info!(
        directions = params.directions,
        radius = params.radius,
        noise = params.noise,
        "computing openness"
    );
    let set = openness(
        &dem,
        &OpennessParams {
            directions: params.directions,
            radius: params.radius,
            noise: params.noise,
        },
    )?;

    if params.save_intermediates {
        save_intermediate(dem_path, Artifact::Slope, &slope_raster)?;
        save_intermediate(dem_path, Artifact::PositiveOpenness, &set.positive)?;
        save_intermediate(dem_path, Artifact::NegativeOpenness, &set.negative)?;
        save_intermediate(dem_path, Artifact::DifferentialOpenness, &set.differential)?;
    }

    Ok((slope_raster, set.differential))
}

fn save_intermediate(dem_path: &Path, artifact: Artifact, raster: &Raster<f64>) -> Result<()> {
    let path = artifact.path_for(dem_path);
    write_geotiff(raster, &path, None)?;
    debug!(path = %path.display(), "intermediate raster written");
    Ok(())
}

/// Cache path of the terrain metrics stage: load the slope and differential
/// openness rasters a previous run wrote. Shape must still match the DEM.
fn load_cached_metrics(
    dem_path: &Path,
    dem: &Raster<f64>,
) -> Result<(Raster<f64>, Raster<f64>)> {
    let slope_raster = load_cached(dem_path, Artifact::Slope)?;
    let diff_openness = load_cached(dem_path, Artifact::DifferentialOpenness)?;

    for cached in [&slope_raster, &diff_openness] {
        let (ar, ac) = cached.shape();
        let (er, ec) = dem.shape();
        if (ar, ac) != (er, ec) {
            return Err(rrim_core::Error::SizeMismatch { er, ec, ar, ac }.into());
        }
    }

    info!("reusing cached slope and differential openness rasters");
    Ok((slope_raster, diff_openness))
}

fn load_cached(dem_path: &Path, artifact: Artifact) -> Result<Raster<f64>> {
    let path = artifact.path_for(dem_path);
    if !path.is_file() {
        return Err(RrimError::MissingCachedRaster { path });
    }
    Ok(read_geotiff(&path, None)?)
}

//! End-to-end pipeline tests against synthetic DEMs on disk

use rrim::{rrim, Artifact, RrimError, RrimParams};
use rrim_core::io::{read_geotiff, write_geotiff};
use rrim_core::{Crs, GeoTransform, Raster};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_dem(dir: &Path, name: &str, dem: &Raster<f64>) -> PathBuf {
    let path = dir.join(name);
    write_geotiff(dem, &path, None).unwrap();
    path
}

fn flat_dem(rows: usize, cols: usize, elevation: f64) -> Raster<f64> {
    let mut dem = Raster::filled(rows, cols, elevation);
    dem.set_transform(GeoTransform::new(500_000.0, 6_000_000.0, 10.0, -10.0));
    dem.set_crs(Some(Crs::from_epsg(32633)));
    dem.set_nodata(Some(-9999.0));
    dem
}

fn hilly_dem(rows: usize, cols: usize) -> Raster<f64> {
    let mut dem = flat_dem(rows, cols, 0.0);
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 / 3.0;
            let y = row as f64 / 4.0;
            dem.set(row, col, 100.0 + 30.0 * (x.sin() + y.cos()))
                .unwrap();
        }
    }
    dem
}

fn read_bands(path: &Path) -> [Raster<u8>; 3] {
    [
        read_geotiff(path, Some(1)).unwrap(),
        read_geotiff(path, Some(2)).unwrap(),
        read_geotiff(path, Some(3)).unwrap(),
    ]
}

#[test]
fn flat_dem_yields_uniform_composite() {
    let dir = TempDir::new().unwrap();
    let dem_path = write_dem(dir.path(), "flat.tif", &flat_dem(10, 10, 100.0));

    let composite_path = rrim(&dem_path, &RrimParams::default()).unwrap();

    // Zero slope and zero differential openness everywhere
    let slope: Raster<f64> = read_geotiff(Artifact::Slope.path_for(&dem_path), None).unwrap();
    let diff: Raster<f64> =
        read_geotiff(Artifact::DifferentialOpenness.path_for(&dem_path), None).unwrap();
    for row in 0..10 {
        for col in 0..10 {
            assert!(slope.get(row, col).unwrap().abs() < 1e-9);
            assert!(diff.get(row, col).unwrap().abs() < 1e-9);
        }
    }

    // Uniform mid-gray: fixed hue, zero saturation, mid value
    let bands = read_bands(&composite_path);
    let first = (
        bands[0].get(0, 0).unwrap(),
        bands[1].get(0, 0).unwrap(),
        bands[2].get(0, 0).unwrap(),
    );
    assert_eq!(first, (128, 128, 128));
    for row in 0..10 {
        for col in 0..10 {
            assert_eq!(bands[0].get(row, col).unwrap(), first.0);
            assert_eq!(bands[1].get(row, col).unwrap(), first.1);
            assert_eq!(bands[2].get(row, col).unwrap(), first.2);
        }
    }
}

#[test]
fn composite_shape_and_georeferencing_match_dem() {
    let dir = TempDir::new().unwrap();
    let dem = hilly_dem(20, 15);
    let dem_path = write_dem(dir.path(), "hills.tif", &dem);

    let composite_path = rrim(&dem_path, &RrimParams::default()).unwrap();
    let bands = read_bands(&composite_path);

    for band in &bands {
        assert_eq!(band.shape(), (20, 15));
        assert_eq!(band.transform(), dem.transform());
    }
}

#[test]
fn cached_rerun_reproduces_composite() {
    let dir = TempDir::new().unwrap();
    let dem_path = write_dem(dir.path(), "hills.tif", &hilly_dem(16, 16));

    let params = RrimParams::default();
    let composite_path = rrim(&dem_path, &params).unwrap();

    // Keep the first composite; the rerun overwrites the original path
    let backup = dir.path().join("first_run.tif");
    std::fs::copy(&composite_path, &backup).unwrap();

    let rerun_params = RrimParams {
        reuse_cached: true,
        ..params
    };
    let rerun_path = rrim(&dem_path, &rerun_params).unwrap();
    assert_eq!(rerun_path, composite_path);

    let first = read_bands(&backup);
    let second = read_bands(&rerun_path);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.shape(), b.shape());
        for row in 0..16 {
            for col in 0..16 {
                assert_eq!(
                    a.get(row, col).unwrap(),
                    b.get(row, col).unwrap(),
                    "cached rerun diverged at ({}, {})",
                    row,
                    col
                );
            }
        }
    }
}

#[test]
fn reuse_without_cache_fails() {
    let dir = TempDir::new().unwrap();
    let dem_path = write_dem(dir.path(), "fresh.tif", &hilly_dem(8, 8));

    let params = RrimParams {
        reuse_cached: true,
        ..Default::default()
    };
    let result = rrim(&dem_path, &params);
    assert!(matches!(result, Err(RrimError::MissingCachedRaster { .. })));
}

#[test]
fn missing_dem_fails() {
    let result = rrim("/no/such/dem.tif", &RrimParams::default());
    assert!(matches!(result, Err(RrimError::DemNotFound { .. })));
}

#[test]
fn intermediates_respect_save_flag() {
    let dir = TempDir::new().unwrap();
    let dem_path = write_dem(dir.path(), "hills.tif", &hilly_dem(8, 8));

    let params = RrimParams {
        save_intermediates: false,
        ..Default::default()
    };
    let composite_path = rrim(&dem_path, &params).unwrap();

    assert!(composite_path.is_file());
    assert!(!Artifact::Slope.path_for(&dem_path).is_file());
    assert!(!Artifact::PositiveOpenness.path_for(&dem_path).is_file());
}

#[test]
fn nodata_cells_render_as_nodata_color() {
    let dir = TempDir::new().unwrap();
    let mut dem = hilly_dem(12, 12);
    dem.set(6, 6, -9999.0).unwrap();
    let dem_path = write_dem(dir.path(), "holes.tif", &dem);

    let composite_path = rrim(&dem_path, &RrimParams::default()).unwrap();
    let bands = read_bands(&composite_path);

    // Default nodata color is black
    assert_eq!(bands[0].get(6, 6).unwrap(), 0);
    assert_eq!(bands[1].get(6, 6).unwrap(), 0);
    assert_eq!(bands[2].get(6, 6).unwrap(), 0);
}

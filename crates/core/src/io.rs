//! GeoTIFF reading and writing using GDAL

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use crate::transform::GeoTransform;
use gdal::raster::{Buffer, GdalType, RasterCreationOption};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression type: "DEFLATE", "LZW", "ZSTD", "NONE"
    pub compression: String,
    /// Tile size for tiled TIFFs (0 for strips)
    pub tile_size: usize,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "DEFLATE".to_string(),
            tile_size: 0,
        }
    }
}

impl GeoTiffOptions {
    fn creation_options(&self) -> Vec<(String, String)> {
        let mut opts = vec![("COMPRESS".to_string(), self.compression.clone())];
        if self.tile_size > 0 {
            opts.push(("TILED".to_string(), "YES".to_string()));
            opts.push(("BLOCKXSIZE".to_string(), self.tile_size.to_string()));
            opts.push(("BLOCKYSIZE".to_string(), self.tile_size.to_string()));
        }
        opts
    }
}

/// Read one band of a GeoTIFF file into a `Raster`
///
/// Captures the geotransform, CRS and no-data marker when present.
///
/// # Arguments
/// * `path` - Path to the file
/// * `band` - Band number (1-indexed), defaults to 1
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let dataset = Dataset::open(path.as_ref())?;
    let band_idx = band.unwrap_or(1);
    let rasterband = dataset.rasterband(band_idx as isize)?;

    let (cols, rows) = dataset.raster_size();

    let buffer = rasterband.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;
    let mut raster = Raster::from_vec(buffer.data, rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }

    if let Ok(srs) = dataset.spatial_ref() {
        if let Ok(wkt) = srs.to_wkt() {
            let mut crs = Crs::from_wkt(wkt);
            if let Ok(code) = srs.auth_code() {
                crs = crs.with_epsg(code as u32);
            }
            raster.set_crs(Some(crs));
        }
    }

    if let Some(nodata) = rasterband.no_data_value() {
        if let Some(nd) = num_traits::cast(nodata) {
            raster.set_nodata(Some(nd));
        }
    }

    Ok(raster)
}

/// Write a single-band raster to a GeoTIFF file
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let opts = options.unwrap_or_default();
    let (rows, cols) = raster.shape();

    let mut dataset = create_dataset::<T, _>(path, cols, rows, 1, &opts)?;
    apply_georeferencing(&mut dataset, raster.transform(), raster.crs())?;

    let mut band = dataset.rasterband(1)?;
    if let Some(nodata) = raster.nodata() {
        if let Some(nd) = num_traits::cast(nodata) {
            band.set_no_data_value(Some(nd))?;
        }
    }

    let data: Vec<T> = raster.data().iter().copied().collect();
    let buffer = Buffer::new((cols, rows), data);
    band.write((0, 0), (cols, rows), &buffer)?;

    Ok(())
}

/// Write three 8-bit rasters as the R, G, B bands of one GeoTIFF
///
/// All bands must share the same shape; georeferencing is taken from the
/// first band. This is the writer for the final RRIM composite.
pub fn write_rgb_geotiff<P: AsRef<Path>>(
    bands: &[Raster<u8>; 3],
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()> {
    let opts = options.unwrap_or_default();
    let (rows, cols) = bands[0].shape();

    for band in &bands[1..] {
        let (ar, ac) = band.shape();
        if (ar, ac) != (rows, cols) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar,
                ac,
            });
        }
    }

    let mut dataset = create_dataset::<u8, _>(path, cols, rows, 3, &opts)?;
    apply_georeferencing(&mut dataset, bands[0].transform(), bands[0].crs())?;

    for (idx, raster) in bands.iter().enumerate() {
        let mut band = dataset.rasterband((idx + 1) as isize)?;
        let data: Vec<u8> = raster.data().iter().copied().collect();
        let buffer = Buffer::new((cols, rows), data);
        band.write((0, 0), (cols, rows), &buffer)?;
    }

    Ok(())
}

fn create_dataset<T: GdalType, P: AsRef<Path>>(
    path: P,
    cols: usize,
    rows: usize,
    bands: usize,
    opts: &GeoTiffOptions,
) -> Result<Dataset> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let pairs = opts.creation_options();
    let creation_options: Vec<RasterCreationOption> = pairs
        .iter()
        .map(|(key, value)| RasterCreationOption { key, value })
        .collect();

    let dataset = driver.create_with_band_type_with_options::<T, _>(
        path.as_ref(),
        cols as isize,
        rows as isize,
        bands as isize,
        &creation_options,
    )?;

    Ok(dataset)
}

fn apply_georeferencing(
    dataset: &mut Dataset,
    transform: &GeoTransform,
    crs: Option<&Crs>,
) -> Result<()> {
    dataset.set_geo_transform(&transform.to_gdal())?;

    if let Some(crs) = crs {
        if let Some(epsg) = crs.epsg() {
            let srs = SpatialRef::from_epsg(epsg)?;
            dataset.set_spatial_ref(&srs)?;
        } else if let Some(wkt) = crs.wkt() {
            let srs = SpatialRef::from_wkt(wkt)?;
            dataset.set_spatial_ref(&srs)?;
        }
    }

    Ok(())
}

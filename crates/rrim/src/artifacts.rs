//! Artifact naming
//!
//! One place decides the filenames of everything the pipeline writes, so
//! the writer and the cache loader can never disagree about where a raster
//! lives.

use std::path::{Path, PathBuf};

/// The rasters a pipeline run can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Slope,
    PositiveOpenness,
    NegativeOpenness,
    DifferentialOpenness,
    Composite,
}

impl Artifact {
    /// Filename suffix appended to the DEM stem
    pub fn suffix(&self) -> &'static str {
        match self {
            Artifact::Slope => "slope",
            Artifact::PositiveOpenness => "pos_opns",
            Artifact::NegativeOpenness => "neg_opns",
            Artifact::DifferentialOpenness => "diff_opns",
            Artifact::Composite => "rrim",
        }
    }

    /// Path of this artifact for the given DEM, alongside the input:
    /// `/data/dem.tif` -> `/data/dem_slope.tif`
    pub fn path_for(&self, dem_path: &Path) -> PathBuf {
        let stem = dem_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dem".to_string());

        dem_path.with_file_name(format!("{}_{}.tif", stem, self.suffix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_dem_stem() {
        let dem = Path::new("/data/andes.tif");
        assert_eq!(
            Artifact::Slope.path_for(dem),
            PathBuf::from("/data/andes_slope.tif")
        );
        assert_eq!(
            Artifact::Composite.path_for(dem),
            PathBuf::from("/data/andes_rrim.tif")
        );
        assert_eq!(
            Artifact::DifferentialOpenness.path_for(dem),
            PathBuf::from("/data/andes_diff_opns.tif")
        );
    }

    #[test]
    fn handles_other_extensions() {
        let dem = Path::new("relief.asc");
        assert_eq!(
            Artifact::PositiveOpenness.path_for(dem),
            PathBuf::from("relief_pos_opns.tif")
        );
    }

    #[test]
    fn suffixes_are_distinct() {
        let all = [
            Artifact::Slope,
            Artifact::PositiveOpenness,
            Artifact::NegativeOpenness,
            Artifact::DifferentialOpenness,
            Artifact::Composite,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.suffix(), b.suffix());
            }
        }
    }
}

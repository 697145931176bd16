//! Pipeline parameters

use crate::error::{Result, RrimError};

/// Tunable parameters for one RRIM run.
///
/// The defaults match the reference implementation of the method: no
/// depression filling, 8 openness directions over a 10-cell radius, no
/// noise suppression, neutral color scaling, intermediates saved.
#[derive(Debug, Clone)]
pub struct RrimParams {
    /// Value marking no-data cells in the input DEM
    pub nodata: f64,
    /// Fill depressions before computing terrain metrics
    pub fill_depressions: bool,
    /// Number of azimuth directions for openness
    pub directions: usize,
    /// Max openness search radius in cells
    pub radius: usize,
    /// Openness noise suppression level (0 = off, 1-3 increasing)
    pub noise: u8,
    /// Red saturation scaling (slope channel)
    pub saturation: f64,
    /// Brightness scaling (openness channel)
    pub brightness: f64,
    /// Write slope and openness rasters next to the DEM
    pub save_intermediates: bool,
    /// Load slope and differential openness from a previous run instead of
    /// recomputing them
    pub reuse_cached: bool,
}

impl Default for RrimParams {
    fn default() -> Self {
        Self {
            nodata: -9999.0,
            fill_depressions: false,
            directions: 8,
            radius: 10,
            noise: 0,
            saturation: 90.0,
            brightness: 150.0,
            save_intermediates: true,
            reuse_cached: false,
        }
    }
}

impl RrimParams {
    /// Validate the parameter set before the pipeline starts.
    ///
    /// Stage-level checks exist too; this catches bad combinations up front
    /// so a long openness run never starts with an unusable compositor.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(invalid("radius", self.radius, "search radius must be > 0"));
        }
        if self.directions == 0 {
            return Err(invalid("directions", self.directions, "need at least one direction"));
        }
        if self.noise > 3 {
            return Err(invalid("noise", self.noise, "noise level ranges 0-3"));
        }
        if self.saturation <= 0.0 || !self.saturation.is_finite() {
            return Err(invalid("saturation", self.saturation, "must be positive and finite"));
        }
        if self.brightness <= 0.0 || !self.brightness.is_finite() {
            return Err(invalid("brightness", self.brightness, "must be positive and finite"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: impl ToString, reason: &str) -> RrimError {
    RrimError::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

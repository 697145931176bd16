//! Coordinate reference system handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system carried alongside a raster.
///
/// Stored as WKT (what GDAL hands back) with the EPSG code kept when the
/// authority is known. Enough for round-tripping projection metadata from
/// input DEM to output rasters; no reprojection happens in this workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    wkt: Option<String>,
    epsg: Option<u32>,
}

impl Crs {
    /// Create from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// WKT representation if known
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Attach an EPSG code to a WKT-derived CRS
    pub fn with_epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    /// Whether the CRS uses angular (degree) units.
    ///
    /// Geographic DEMs need a z-factor correction before slope and openness
    /// are meaningful. Detection mirrors the usual WKT shape: a GEOGCS
    /// without an enclosing PROJCS, or EPSG:4326.
    pub fn is_geographic(&self) -> bool {
        if self.epsg == Some(4326) {
            return true;
        }
        match &self.wkt {
            Some(wkt) => {
                let has_degree = wkt.contains("degree") || wkt.contains("GEOGCS");
                has_degree && !wkt.contains("PROJCS") && !wkt.contains("PROJCRS")
            }
            None => false,
        }
    }

    /// Short identifier for display
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            // Truncate on a char boundary; WKT datum names can be non-ASCII
            let prefix: String = wkt.chars().take(50).collect();
            return format!("WKT:{}", prefix);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_identifier() {
        let crs = Crs::from_epsg(32633);
        assert_eq!(crs.epsg(), Some(32633));
        assert_eq!(crs.identifier(), "EPSG:32633");
    }

    #[test]
    fn identifier_truncates_multibyte_wkt() {
        // "ß" is 2 bytes; a byte-offset cut at 50 would land mid-character
        let wkt = format!(r#"GEOGCS["Gauß-Krüger {}"]"#, "ß".repeat(40));
        let crs = Crs::from_wkt(wkt);

        let id = crs.identifier();
        assert!(id.starts_with("WKT:GEOGCS"));
        assert_eq!(id.chars().count(), "WKT:".len() + 50);
    }

    #[test]
    fn geographic_detection() {
        assert!(Crs::from_epsg(4326).is_geographic());
        assert!(!Crs::from_epsg(32633).is_geographic());

        let geog = Crs::from_wkt(
            r#"GEOGCS["WGS 84",UNIT["degree",0.0174532925199433]]"#,
        );
        assert!(geog.is_geographic());

        let proj = Crs::from_wkt(
            r#"PROJCS["UTM 33N",GEOGCS["WGS 84",UNIT["degree",0.017]],UNIT["metre",1]]"#,
        );
        assert!(!proj.is_geographic());
    }
}

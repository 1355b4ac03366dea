//! Coordinate reference identifiers
//!
//! The engine never reprojects. A CRS is carried only so that grids built
//! in different reference systems compare unequal and fail alignment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CRS {
    /// EPSG registry code
    Epsg(u32),
    /// PROJ string
    Proj(String),
    /// WKT definition
    Wkt(String),
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        CRS::Epsg(code)
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        CRS::Wkt(wkt.into())
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        CRS::Proj(proj.into())
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        match self {
            CRS::Epsg(code) => Some(*code),
            _ => None,
        }
    }

    /// Short string identifier for logs and error messages
    pub fn identifier(&self) -> String {
        match self {
            CRS::Epsg(code) => format!("EPSG:{}", code),
            CRS::Proj(proj) => proj.clone(),
            CRS::Wkt(wkt) => {
                let head: String = wkt.chars().take(50).collect();
                format!("WKT:{}", head)
            }
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(32643);
        assert_eq!(crs.epsg(), Some(32643));
        assert_eq!(crs.identifier(), "EPSG:32643");
    }

    #[test]
    fn test_wkt_identifier_is_truncated() {
        let crs = CRS::from_wkt("X".repeat(200));
        assert_eq!(crs.identifier().len(), "WKT:".len() + 50);
        assert_eq!(crs.epsg(), None);
    }

    #[test]
    fn test_different_crs_are_unequal() {
        assert_ne!(CRS::wgs84(), CRS::from_epsg(3857));
    }
}

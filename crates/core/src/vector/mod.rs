//! Constraint geometry
//!
//! Exclusion zones (reservoirs, settlements, protected land) arrive as
//! polygons in the grid's coordinate reference system.

use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// A polygon that, when `exclude` is set, removes every cell whose center
/// it contains from consideration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintPolygon {
    /// Exterior ring plus optional interior rings
    pub polygon: Polygon<f64>,
    /// Whether this polygon excludes the area it covers
    pub exclude: bool,
    /// Optional human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConstraintPolygon {
    /// Create an exclusion polygon
    pub fn exclusion(polygon: Polygon<f64>) -> Self {
        Self {
            polygon,
            exclude: true,
            label: None,
        }
    }

    /// Create an exclusion polygon from a single ring of (x, y) vertices.
    ///
    /// The ring is closed automatically.
    pub fn from_ring(ring: Vec<(f64, f64)>) -> Self {
        Self::exclusion(Polygon::new(LineString::from(ring), vec![]))
    }

    /// Create an exclusion polygon from an exterior ring and holes
    pub fn from_rings(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>) -> Self {
        let interiors = holes.into_iter().map(LineString::from).collect();
        Self::exclusion(Polygon::new(LineString::from(exterior), interiors))
    }

    /// Attach a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Mark this polygon as informational only
    pub fn non_excluding(mut self) -> Self {
        self.exclude = false;
        self
    }

    /// All rings of the polygon, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        std::iter::once(self.polygon.exterior()).chain(self.polygon.interiors().iter())
    }

    /// Whether the exterior ring encloses any area at all
    pub fn is_degenerate(&self) -> bool {
        let mut distinct: Vec<Coord<f64>> = Vec::new();
        for c in self.polygon.exterior().coords() {
            if !distinct.contains(c) {
                distinct.push(*c);
                if distinct.len() >= 3 {
                    return false;
                }
            }
        }
        true
    }
}

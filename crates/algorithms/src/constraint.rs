//! Constraint mask rasterization
//!
//! A cell is excluded when its center lies inside any polygon flagged
//! `exclude`. Containment uses the even-odd rule over all rings of a
//! polygon, so holes are not excluded. Edges follow a half-open
//! convention: a crossing is counted when `(y_i > y) != (y_j > y)` and the
//! point lies strictly left of the edge. For an axis-aligned rectangle,
//! centers on its left or bottom edge are inside and centers on its right
//! or top edge are outside.

use crate::exec::Execution;
use geo::BoundingRect;
use geo_types::{LineString, Rect};
use rainsite_core::raster::{Raster, RasterGrid};
use rainsite_core::{ConstraintPolygon, Result};

/// Whether (x, y) lies inside `polygon` under the even-odd rule.
pub fn contains_point(polygon: &ConstraintPolygon, x: f64, y: f64) -> bool {
    let crossings: usize = polygon.rings().map(|ring| ring_crossings(ring, x, y)).sum();
    crossings % 2 == 1
}

/// Count edges of `ring` crossed by a ray from (x, y) towards +x
fn ring_crossings(ring: &LineString<f64>, x: f64, y: f64) -> usize {
    ring.lines()
        .filter(|line| {
            let (a, b) = (line.start, line.end);
            (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x
        })
        .count()
}

/// Rasterize exclusion polygons onto `grid`; `true` marks an excluded cell.
///
/// Polygons with `exclude == false` and polygons whose exterior encloses
/// no area are ignored. Overlapping polygons are unioned.
pub fn rasterize_constraints(
    polygons: &[ConstraintPolygon],
    grid: &RasterGrid,
    exec: &Execution,
) -> Result<Raster<bool>> {
    let prepared: Vec<(Rect<f64>, &ConstraintPolygon)> = polygons
        .iter()
        .filter(|p| p.exclude && !p.is_degenerate())
        .filter_map(|p| p.polygon.exterior().bounding_rect().map(|rect| (rect, p)))
        .collect();

    let (rows, cols) = grid.shape();
    let (cells, _) = exec.processor(rows, cols).generate(false, |tile, out| {
        if prepared.is_empty() {
            return;
        }
        for (offset, cell) in out.iter_mut().enumerate() {
            let (row, col) = tile.to_source_coords(offset);
            let (x, y) = grid.cell_center(row, col);
            *cell = prepared.iter().any(|(rect, poly)| {
                x >= rect.min().x
                    && x <= rect.max().x
                    && y >= rect.min().y
                    && y <= rect.max().y
                    && contains_point(poly, x, y)
            });
        }
    });

    Raster::from_vec(grid.clone(), cells)
}

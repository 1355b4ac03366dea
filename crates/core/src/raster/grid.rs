//! Grid descriptor shared by every raster in a run
//!
//! All grids are north-up with square cells: row 0 is the top row (largest
//! y) and column 0 the leftmost column (smallest x).
//! ```text
//! x = min_x + (col + 0.5) * cell_size
//! y = max_y - (row + 0.5) * cell_size
//! ```

use crate::crs::CRS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable description of a raster's extent, resolution and reference system.
///
/// Two rasters are aligned iff their grids compare equal. No stage ever
/// resamples; a mismatch is reported with [`RasterGrid::ensure_aligned`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridDef")]
pub struct RasterGrid {
    min_x: f64,
    min_y: f64,
    cell_size: f64,
    rows: usize,
    cols: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crs: Option<CRS>,
}

impl RasterGrid {
    /// Create a grid anchored at its lower-left corner.
    pub fn new(min_x: f64, min_y: f64, cell_size: f64, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidGrid(format!(
                "cell size must be finite and positive, got {}",
                cell_size
            )));
        }
        if !min_x.is_finite() || !min_y.is_finite() {
            return Err(Error::InvalidGrid(format!(
                "origin must be finite, got ({}, {})",
                min_x, min_y
            )));
        }

        Ok(Self {
            min_x,
            min_y,
            cell_size,
            rows,
            cols,
            crs: None,
        })
    }

    /// Create a grid from an extent that is an exact multiple of the cell size.
    pub fn from_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidGrid(format!(
                "cell size must be finite and positive, got {}",
                cell_size
            )));
        }
        let cols_f = (max_x - min_x) / cell_size;
        let rows_f = (max_y - min_y) / cell_size;
        let (cols, rows) = (cols_f.round(), rows_f.round());

        if (cols - cols_f).abs() > 1e-6 || (rows - rows_f).abs() > 1e-6 {
            return Err(Error::InvalidGrid(format!(
                "extent {}x{} is not a whole number of {} cells",
                max_x - min_x,
                max_y - min_y,
                cell_size
            )));
        }
        if cols < 1.0 || rows < 1.0 {
            return Err(Error::InvalidGrid("extent is empty".into()));
        }

        Self::new(min_x, min_y, cell_size, rows as usize, cols as usize)
    }

    /// Attach a coordinate reference system
    pub fn with_crs(mut self, crs: CRS) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x(), self.max_y())
    }

    pub fn max_x(&self) -> f64 {
        self.min_x + self.cols as f64 * self.cell_size
    }

    pub fn max_y(&self) -> f64 {
        self.min_y + self.rows as f64 * self.cell_size
    }

    /// Length of the extent's diagonal in grid coordinate units
    pub fn diagonal(&self) -> f64 {
        let w = self.cols as f64 * self.cell_size;
        let h = self.rows as f64 * self.cell_size;
        w.hypot(h)
    }

    /// Coordinates of the center of cell (row, col)
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.min_x + (col as f64 + 0.5) * self.cell_size;
        let y = self.max_y() - (row as f64 + 0.5) * self.cell_size;
        (x, y)
    }

    /// Cell containing the point, if it lies inside the extent.
    ///
    /// Points on the right or bottom edge of the extent belong to no cell.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.min_x) / self.cell_size).floor();
        let row = ((self.max_y() - y) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Row-major linear index of (row, col)
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// (row, col) of a row-major linear index
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Whether two grids describe exactly the same cells
    pub fn is_aligned(&self, other: &RasterGrid) -> bool {
        self == other
    }

    /// Fail with [`Error::Alignment`] unless `found` equals this grid.
    pub fn ensure_aligned(&self, stage: &'static str, input: &str, found: &RasterGrid) -> Result<()> {
        if self.is_aligned(found) {
            return Ok(());
        }
        Err(Error::Alignment {
            stage,
            input: input.to_string(),
            expected: self.to_string(),
            found: found.to_string(),
        })
    }
}

impl fmt::Display for RasterGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} cells of {} at ({}, {})",
            self.rows, self.cols, self.cell_size, self.min_x, self.min_y
        )?;
        if let Some(crs) = &self.crs {
            write!(f, " [{}]", crs)?;
        }
        Ok(())
    }
}

/// Unvalidated serde form of [`RasterGrid`]
#[derive(Deserialize)]
struct GridDef {
    min_x: f64,
    min_y: f64,
    cell_size: f64,
    rows: usize,
    cols: usize,
    #[serde(default)]
    crs: Option<CRS>,
}

impl TryFrom<GridDef> for RasterGrid {
    type Error = Error;

    fn try_from(def: GridDef) -> Result<Self> {
        let grid = RasterGrid::new(def.min_x, def.min_y, def.cell_size, def.rows, def.cols)?;
        Ok(match def.crs {
            Some(crs) => grid.with_crs(crs),
            None => grid,
        })
    }
}

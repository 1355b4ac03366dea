//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{RasterElement, RasterGrid};
use ndarray::{Array2, ArrayView2};

/// A gridded 2D array of cell values.
///
/// `Raster<T>` pairs a dense row-major [`Array2`] with the [`RasterGrid`] it
/// was produced on and an optional no-data sentinel. A stage builds its
/// output raster once and hands it downstream; consumers only borrow it.
///
/// # Example
///
/// ```ignore
/// use rainsite_core::{Raster, RasterGrid};
///
/// let grid = RasterGrid::new(0.0, 0.0, 30.0, 2, 2)?;
/// let slope = Raster::from_vec(grid, vec![2.0, 4.5, 12.0, 31.0])?;
/// assert_eq!(slope.get(1, 0)?, 12.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Cell values in row-major order (row, col)
    data: Array2<T>,
    grid: RasterGrid,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a raster on `grid` filled with the element's fill value
    pub fn new(grid: RasterGrid) -> Self {
        Self::filled(grid, T::fill_value())
    }

    /// Create a raster on `grid` filled with a specific value
    pub fn filled(grid: RasterGrid, value: T) -> Self {
        Self {
            data: Array2::from_elem(grid.shape(), value),
            grid,
            nodata: None,
        }
    }

    /// Create a raster from row-major values
    pub fn from_vec(grid: RasterGrid, data: Vec<T>) -> Result<Self> {
        let (rows, cols) = grid.shape();
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            grid,
            nodata: None,
        })
    }

    /// Create a raster from an ndarray whose shape matches `grid`
    pub fn from_array(grid: RasterGrid, data: Array2<T>) -> Result<Self> {
        if data.dim() != grid.shape() {
            let (rows, cols) = data.dim();
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self {
            data,
            grid,
            nodata: None,
        })
    }

    /// Builder-style no-data assignment
    pub fn with_nodata(mut self, nodata: T) -> Self {
        self.nodata = Some(nodata);
        self
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    // Metadata

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Whether this raster shares `other`'s grid
    pub fn is_aligned_with<U: RasterElement>(&self, other: &Raster<U>) -> bool {
        self.grid.is_aligned(&other.grid)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Check if cell at (row, col) contains no-data
    pub fn is_nodata_at(&self, row: usize, col: usize) -> Result<bool> {
        let value = self.get(row, col)?;
        Ok(self.is_nodata(value))
    }

    /// Number of cells holding no-data
    pub fn nodata_count(&self) -> usize {
        self.data.iter().filter(|v| self.is_nodata(**v)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> RasterGrid {
        RasterGrid::new(0.0, 0.0, 1.0, rows, cols).unwrap()
    }

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f64> = Raster::new(grid(100, 200));
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
        assert_eq!(raster.get(99, 199).unwrap(), 0.0);
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<f64> = Raster::new(grid(10, 10));
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.get(10, 0).is_err());
        assert!(raster.set(0, 10, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Raster::from_vec(grid(2, 2), vec![1.0f64; 3]).is_err());

        let raster = Raster::from_vec(grid(2, 3), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(raster.get(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_from_array_checks_shape() {
        let array = Array2::<u8>::zeros((3, 2));
        assert!(Raster::from_array(grid(2, 3), array.clone()).is_err());
        assert!(Raster::from_array(grid(3, 2), array).is_ok());
    }

    #[test]
    fn test_nodata_detection() {
        let raster = Raster::from_vec(grid(1, 4), vec![1.0, f64::NAN, -9999.0, 2.0])
            .unwrap()
            .with_nodata(-9999.0);
        assert!(raster.is_nodata_at(0, 1).unwrap());
        assert!(raster.is_nodata_at(0, 2).unwrap());
        assert!(!raster.is_nodata_at(0, 3).unwrap());
        assert_eq!(raster.nodata_count(), 2);
    }

    #[test]
    fn test_alignment_across_element_types() {
        let values: Raster<f64> = Raster::new(grid(4, 4));
        let mask: Raster<bool> = Raster::new(grid(4, 4));
        let other: Raster<bool> = Raster::new(grid(4, 5));
        assert!(values.is_aligned_with(&mask));
        assert!(!values.is_aligned_with(&other));
    }
}

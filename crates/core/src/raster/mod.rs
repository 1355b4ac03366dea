//! Raster data structures

mod array;
mod element;
mod grid;

pub use array::Raster;
pub use element::RasterElement;
pub use grid::RasterGrid;

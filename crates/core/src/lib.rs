//! # RainSite Core
//!
//! Core types and traits for the RainSite suitability engine.
//!
//! This crate provides:
//! - `RasterGrid`: the extent/resolution contract every layer of a run shares
//! - `Raster<T>`: generic gridded cell values with a no-data sentinel
//! - `CRS`: coordinate reference identifiers
//! - `ConstraintPolygon`: exclusion geometry
//! - The error taxonomy shared by all stages

pub mod crs;
pub mod error;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{ConfigError, Error, Result};
pub use raster::{Raster, RasterElement, RasterGrid};
pub use vector::ConstraintPolygon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{ConfigError, Error, Result};
    pub use crate::raster::{Raster, RasterElement, RasterGrid};
    pub use crate::vector::ConstraintPolygon;
    pub use crate::Algorithm;
}

/// Core trait for the pipeline stages.
///
/// Stages are pure functions that transform borrowed inputs into a new
/// owned output according to parameters.
pub trait Algorithm {
    /// Input type for the stage
    type Input;
    /// Output type for the stage
    type Output;
    /// Parameters controlling stage behavior
    type Params: Default;
    /// Error type for stage execution
    type Error: std::error::Error;

    /// Returns the stage name
    fn name(&self) -> &'static str;

    /// Returns a description of what the stage does
    fn description(&self) -> &'static str;

    /// Execute the stage
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

//! Criteria and their normalization
//!
//! - Breakpoint bands and lookup
//! - Validated criterion specs and criteria sets
//! - Normalizer: raw rasters to 0–100 scores
//! - Presets for slope, rainfall, infiltration, land cover and road distance

mod band;
mod normalize;
pub mod presets;
mod spec;

pub use band::{categorical_bands, BreakpointBand};
pub use normalize::{normalize, DomainError, NormalizedCriterion};
pub use presets::{
    standard_criteria, LandCover, LandCoverCodes, PresetInputs, SoilInput, StructureType, WeightProfile,
};
pub use spec::{CriteriaSet, CriterionSpec, ValidRange, WEIGHT_TOLERANCE};

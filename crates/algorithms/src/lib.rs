//! # RainSite Algorithms
//!
//! Multi-criteria suitability analysis for siting rainwater-harvesting
//! structures.
//!
//! ## Stages
//!
//! - **criteria**: Breakpoint bands, criterion specs, normalization, presets
//! - **constraint**: Exclusion polygons to a boolean mask
//! - **overlay**: Weighted composite of normalized criteria
//! - **classify**: Ordinal suitability classes
//! - **rank**: Candidate sites with minimum separation
//! - **diagnostics**: Counts, histograms and warnings of a run
//! - **pipeline** / **config**: The whole chain behind one validated model
//!
//! Per-cell stages run over row-band tiles and give bit-identical results
//! for any thread count or tile size.

pub mod classify;
pub mod config;
pub mod constraint;
pub mod criteria;
pub mod diagnostics;
pub mod exec;
pub mod overlay;
pub mod pipeline;
pub mod rank;

/// Sentinel score of a cell removed by a constraint or a domain error.
///
/// Distinct from no-data (NaN) and outside the [0, 100] score range.
pub const EXCLUDED: f64 = -9999.0;

/// Whether a score is the [`EXCLUDED`] sentinel
#[inline]
pub fn is_excluded(value: f64) -> bool {
    value == EXCLUDED
}

pub use classify::{classify, ClassThreshold, ClassThresholds, Classify, SuitabilityClass};
pub use config::{CriterionConfig, RankingConfig, SuitabilityConfig};
pub use constraint::{contains_point, rasterize_constraints};
pub use criteria::{
    normalize, BreakpointBand, CriteriaSet, CriterionSpec, DomainError, NormalizedCriterion, ValidRange,
};
pub use diagnostics::{DiagnosticsReport, ScoreHistogram, Warning};
pub use exec::Execution;
pub use overlay::{weighted_overlay, OverlayOutput};
pub use pipeline::{CriterionLayer, SuitabilityModel, SuitabilityRun};
pub use rank::{rank_sites, CandidateSite, RankParams, RankSites, Ranking, RankingWarning};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classify::{classify, ClassThreshold, ClassThresholds, SuitabilityClass};
    pub use crate::config::SuitabilityConfig;
    pub use crate::constraint::rasterize_constraints;
    pub use crate::criteria::presets::{
        standard_criteria, LandCover, LandCoverCodes, PresetInputs, SoilInput, StructureType, WeightProfile,
    };
    pub use crate::criteria::{normalize, BreakpointBand, CriteriaSet, CriterionSpec, ValidRange};
    pub use crate::exec::Execution;
    pub use crate::overlay::weighted_overlay;
    pub use crate::pipeline::{CriterionLayer, SuitabilityModel, SuitabilityRun};
    pub use crate::rank::{rank_sites, CandidateSite, RankParams};
    pub use crate::{is_excluded, EXCLUDED};
    pub use rainsite_core::prelude::*;
    pub use rainsite_parallel::ProcessingMode;
}

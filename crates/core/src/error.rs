//! Error types for RainSite
//!
//! Fatal errors stop a pipeline run. Per-cell problems in the input data
//! (values outside a criterion's physical range) are not errors here: they
//! are recorded by the normalizer and reported through diagnostics.

use thiserror::Error;

/// Main error type for RainSite operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("grid mismatch in {stage}: input `{input}` has grid {found}, expected {expected}")]
    Alignment {
        stage: &'static str,
        input: String,
        expected: String,
        found: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{0}")]
    Other(String),
}

/// Configuration problems, detected before any raster is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("criterion `{criterion}` has no breakpoint bands")]
    EmptyBands { criterion: String },

    #[error("criterion `{criterion}` band {index}: {reason}")]
    InvalidBand {
        criterion: String,
        index: usize,
        reason: String,
    },

    #[error("criterion `{criterion}`: gap between band {index} (ends at {upper}) and band {next} (starts at {lower})", next = .index + 1)]
    BandGap {
        criterion: String,
        index: usize,
        upper: f64,
        lower: f64,
    },

    #[error("criterion `{criterion}`: band {next} (starts at {lower}) overlaps band {index} (ends at {upper})", next = .index + 1)]
    BandOverlap {
        criterion: String,
        index: usize,
        upper: f64,
        lower: f64,
    },

    #[error("criterion `{criterion}` has invalid valid range [{min:?}, {max:?}]")]
    InvalidValidRange {
        criterion: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("criterion `{criterion}` has weight {weight}, expected a value in [0, 1]")]
    InvalidWeight { criterion: String, weight: f64 },

    #[error("criterion weights sum to {sum}, expected 1.0 (tolerance {tolerance})")]
    WeightSum { sum: f64, tolerance: f64 },

    #[error("criterion `{0}` is defined more than once")]
    DuplicateCriterion(String),

    #[error("no layer supplied for criterion `{0}`")]
    MissingCriterion(String),

    #[error("layer `{0}` does not match any configured criterion")]
    UnknownCriterion(String),

    #[error("at least one criterion is required")]
    EmptyCriteria,

    #[error("at least one class threshold is required")]
    EmptyThresholds,

    #[error("class threshold {index}: {reason}")]
    InvalidThreshold { index: usize, reason: String },

    #[error("class thresholds must be non-decreasing: {previous} is followed by {next}")]
    NonMonotonicThresholds { previous: f64, next: f64 },

    #[error("lowest class threshold must start at 0, got {0}")]
    ThresholdCoverage(f64),

    #[error("minimum site separation must be finite and non-negative, got {0}")]
    InvalidSeparation(f64),

    #[error("minimum ranking class must be low, medium or high, got {0}")]
    InvalidMinClass(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Result type alias for RainSite operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_gap_message_names_both_bands() {
        let err = ConfigError::BandGap {
            criterion: "slope".into(),
            index: 0,
            upper: 10.0,
            lower: 12.0,
        };
        assert_eq!(
            err.to_string(),
            "criterion `slope`: gap between band 0 (ends at 10) and band 1 (starts at 12)"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::EmptyCriteria.into();
        assert!(matches!(err, Error::Config(ConfigError::EmptyCriteria)));
    }
}

//! Criterion specifications
//!
//! Every invariant is checked once, when a spec or set is built. Stages
//! downstream rely on them without re-validating per cell.

use super::band::{lookup, BreakpointBand};
use rainsite_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Tolerance when matching the edges of neighbouring bands
const EDGE_TOLERANCE: f64 = 1e-9;

/// Physically meaningful raw values of a criterion (both ends inclusive).
///
/// Values outside it are data errors, not candidates for clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Unbounded range
    pub fn any() -> Self {
        Self::default()
    }

    /// Values >= 0
    pub fn non_negative() -> Self {
        Self::new(Some(0.0), None)
    }

    /// Whether `value` is a finite value inside the range; infinities never are.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }
}

/// One criterion: its weight and the bands mapping raw values to scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionSpec {
    name: String,
    weight: f64,
    bands: Vec<BreakpointBand>,
    valid_range: ValidRange,
}

impl CriterionSpec {
    /// Create a validated criterion with an unbounded valid range.
    ///
    /// Fails if the weight lies outside [0, 1], if there are no bands, if a
    /// band is inverted or scores outside [0, 100], or if consecutive bands
    /// leave a gap or overlap.
    pub fn new(name: impl Into<String>, weight: f64, bands: Vec<BreakpointBand>) -> Result<Self> {
        let name = name.into();

        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(ConfigError::InvalidWeight {
                criterion: name,
                weight,
            }
            .into());
        }
        validate_bands(&name, &bands)?;

        Ok(Self {
            name,
            weight,
            bands,
            valid_range: ValidRange::any(),
        })
    }

    /// Restrict the physically valid raw-value range
    pub fn with_valid_range(mut self, range: ValidRange) -> Result<Self> {
        let bad_bound = |b: Option<f64>| b.is_some_and(|v| !v.is_finite());
        let inverted = matches!((range.min, range.max), (Some(lo), Some(hi)) if lo > hi);
        if bad_bound(range.min) || bad_bound(range.max) || inverted {
            return Err(ConfigError::InvalidValidRange {
                criterion: self.name,
                min: range.min,
                max: range.max,
            }
            .into());
        }
        self.valid_range = range;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bands(&self) -> &[BreakpointBand] {
        &self.bands
    }

    pub fn valid_range(&self) -> ValidRange {
        self.valid_range
    }

    /// Score a raw value, or `None` if it lies outside the valid range.
    ///
    /// The caller handles no-data before calling this.
    pub fn score(&self, value: f64) -> Option<f64> {
        if !self.valid_range.contains(value) {
            return None;
        }
        Some(lookup(&self.bands, value))
    }
}

fn validate_bands(name: &str, bands: &[BreakpointBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(ConfigError::EmptyBands {
            criterion: name.to_string(),
        }
        .into());
    }

    let invalid = |index: usize, reason: String| -> rainsite_core::Error {
        ConfigError::InvalidBand {
            criterion: name.to_string(),
            index,
            reason,
        }
        .into()
    };

    for (i, band) in bands.iter().enumerate() {
        if !band.raw_low.is_finite() || !band.raw_high.is_finite() {
            return Err(invalid(i, "band edges must be finite".into()));
        }
        if band.raw_low >= band.raw_high {
            return Err(invalid(
                i,
                format!("raw_low {} must be below raw_high {}", band.raw_low, band.raw_high),
            ));
        }
        if !band.score.is_finite() || !(0.0..=100.0).contains(&band.score) {
            return Err(invalid(i, format!("score {} outside [0, 100]", band.score)));
        }
    }

    for (i, pair) in bands.windows(2).enumerate() {
        let (upper, lower) = (pair[0].raw_high, pair[1].raw_low);
        if lower - upper > EDGE_TOLERANCE {
            return Err(ConfigError::BandGap {
                criterion: name.to_string(),
                index: i,
                upper,
                lower,
            }
            .into());
        }
        if upper - lower > EDGE_TOLERANCE {
            return Err(ConfigError::BandOverlap {
                criterion: name.to_string(),
                index: i,
                upper,
                lower,
            }
            .into());
        }
    }

    Ok(())
}

/// The validated criteria of one run, kept in lexicographic name order.
///
/// This canonical order is the accumulation order of the weighted overlay,
/// which makes the composite independent of the order criteria were given.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaSet {
    specs: Vec<CriterionSpec>,
}

impl CriteriaSet {
    /// Validate names and the weight sum. Weights are never renormalized.
    pub fn new(mut specs: Vec<CriterionSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyCriteria.into());
        }

        specs.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = specs.windows(2).find(|p| p[0].name == p[1].name) {
            return Err(ConfigError::DuplicateCriterion(pair[0].name.clone()).into());
        }

        let sum: f64 = specs.iter().map(|s| s.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightSum {
                sum,
                tolerance: WEIGHT_TOLERANCE,
            }
            .into());
        }

        Ok(Self { specs })
    }

    /// Specs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &CriterionSpec> {
        self.specs.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CriterionSpec> {
        self.specs
            .binary_search_by(|s| s.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Criterion names in canonical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainsite_core::Error;

    fn bands() -> Vec<BreakpointBand> {
        vec![
            BreakpointBand::new(0.0, 500.0, 10.0),
            BreakpointBand::new(500.0, 800.0, 50.0),
            BreakpointBand::new(800.0, 5000.0, 100.0),
        ]
    }

    fn config_err(result: Result<impl std::fmt::Debug>) -> ConfigError {
        match result {
            Err(Error::Config(e)) => e,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_spec_scores() {
        let spec = CriterionSpec::new("rainfall", 0.2, bands())
            .unwrap()
            .with_valid_range(ValidRange::non_negative())
            .unwrap();
        assert_eq!(spec.score(900.0), Some(100.0));
        assert_eq!(spec.score(800.0), Some(50.0));
        assert_eq!(spec.score(9000.0), Some(100.0));
        assert_eq!(spec.score(-1.0), None);
    }

    #[test]
    fn test_infinite_values_outside_any_range() {
        assert!(!ValidRange::any().contains(f64::INFINITY));
        assert!(!ValidRange::any().contains(f64::NEG_INFINITY));
        assert!(!ValidRange::non_negative().contains(f64::INFINITY));
        assert!(ValidRange::any().contains(f64::MAX));

        let spec = CriterionSpec::new("rainfall", 1.0, bands()).unwrap();
        assert_eq!(spec.score(f64::INFINITY), None);
    }

    #[test]
    fn test_gap_rejected() {
        let mut b = bands();
        b[1].raw_low = 520.0;
        let err = config_err(CriterionSpec::new("rainfall", 0.2, b));
        assert!(matches!(err, ConfigError::BandGap { index: 0, .. }));
    }

    #[test]
    fn test_overlap_rejected() {
        let mut b = bands();
        b[2].raw_low = 700.0;
        let err = config_err(CriterionSpec::new("rainfall", 0.2, b));
        assert!(matches!(err, ConfigError::BandOverlap { index: 1, .. }));
    }

    #[test]
    fn test_bad_bands_rejected() {
        assert!(matches!(
            config_err(CriterionSpec::new("x", 0.5, vec![])),
            ConfigError::EmptyBands { .. }
        ));
        assert!(matches!(
            config_err(CriterionSpec::new("x", 0.5, vec![BreakpointBand::new(5.0, 1.0, 10.0)])),
            ConfigError::InvalidBand { index: 0, .. }
        ));
        assert!(matches!(
            config_err(CriterionSpec::new("x", 0.5, vec![BreakpointBand::new(0.0, 1.0, 120.0)])),
            ConfigError::InvalidBand { .. }
        ));
    }

    #[test]
    fn test_weight_range_rejected() {
        assert!(matches!(
            config_err(CriterionSpec::new("x", 1.5, bands())),
            ConfigError::InvalidWeight { .. }
        ));
        assert!(matches!(
            config_err(CriterionSpec::new("x", -0.1, bands())),
            ConfigError::InvalidWeight { .. }
        ));
    }

    #[test]
    fn test_inverted_valid_range_rejected() {
        let spec = CriterionSpec::new("x", 1.0, bands()).unwrap();
        let err = config_err(spec.with_valid_range(ValidRange::new(Some(10.0), Some(0.0))));
        assert!(matches!(err, ConfigError::InvalidValidRange { .. }));
    }

    #[test]
    fn test_set_sorted_and_weight_checked() {
        let set = CriteriaSet::new(vec![
            CriterionSpec::new("slope", 0.6, bands()).unwrap(),
            CriterionSpec::new("infiltration", 0.4, bands()).unwrap(),
        ])
        .unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["infiltration", "slope"]);
        assert!(set.contains("slope"));
        assert!(!set.contains("rainfall"));

        let err = config_err(CriteriaSet::new(vec![
            CriterionSpec::new("slope", 0.6, bands()).unwrap(),
            CriterionSpec::new("infiltration", 0.3, bands()).unwrap(),
        ]));
        assert!(matches!(err, ConfigError::WeightSum { .. }));
    }

    #[test]
    fn test_weight_sum_tolerance() {
        let set = CriteriaSet::new(vec![
            CriterionSpec::new("a", 0.5, bands()).unwrap(),
            CriterionSpec::new("b", 0.5 + 5e-7, bands()).unwrap(),
        ]);
        assert!(set.is_ok());
    }

    #[test]
    fn test_duplicate_and_empty_sets_rejected() {
        let err = config_err(CriteriaSet::new(vec![
            CriterionSpec::new("slope", 0.5, bands()).unwrap(),
            CriterionSpec::new("slope", 0.5, bands()).unwrap(),
        ]));
        assert_eq!(err, ConfigError::DuplicateCriterion("slope".into()));
        assert_eq!(config_err(CriteriaSet::new(vec![])), ConfigError::EmptyCriteria);
    }
}

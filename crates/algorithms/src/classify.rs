//! Suitability classes
//!
//! Buckets the composite surface into ordinal priority zones using
//! configurable lower thresholds (default: Low ≥ 0, Medium ≥ 40, High ≥ 70).

use crate::exec::Execution;
use crate::is_excluded;
use rainsite_core::raster::{Raster, RasterElement};
use rainsite_core::{Algorithm, ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal suitability class of a cell.
///
/// Ordering runs `NoData < Excluded < Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityClass {
    /// No composite score (a criterion had no data)
    NoData,
    /// Removed by a constraint or a domain error
    Excluded,
    Low,
    Medium,
    High,
}

impl SuitabilityClass {
    /// Whether the class carries a score
    pub fn is_scored(&self) -> bool {
        matches!(self, SuitabilityClass::Low | SuitabilityClass::Medium | SuitabilityClass::High)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuitabilityClass::NoData => "nodata",
            SuitabilityClass::Excluded => "excluded",
            SuitabilityClass::Low => "low",
            SuitabilityClass::Medium => "medium",
            SuitabilityClass::High => "high",
        }
    }
}

impl fmt::Display for SuitabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl RasterElement for SuitabilityClass {
    fn fill_value() -> Self {
        SuitabilityClass::NoData
    }

    fn default_nodata() -> Self {
        SuitabilityClass::NoData
    }

    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        *self == SuitabilityClass::NoData || nodata == Some(*self)
    }
}

/// Lower score bound of one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassThreshold {
    pub class: SuitabilityClass,
    pub min_score: f64,
}

impl ClassThreshold {
    pub fn new(class: SuitabilityClass, min_score: f64) -> Self {
        Self { class, min_score }
    }
}

/// Validated, ascending class thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct ClassThresholds {
    entries: Vec<ClassThreshold>,
}

impl ClassThresholds {
    /// Validate thresholds listed from the lowest class upwards.
    ///
    /// Classes must be scored classes in strictly increasing order, bounds
    /// must lie in [0, 100] and never decrease, and the first bound must be
    /// 0 so every score maps to a class.
    pub fn new(entries: Vec<ClassThreshold>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyThresholds.into());
        }

        for (index, entry) in entries.iter().enumerate() {
            if !entry.class.is_scored() {
                return Err(invalid(index, format!("class `{}` cannot be assigned a threshold", entry.class)));
            }
            if !entry.min_score.is_finite() || !(0.0..=100.0).contains(&entry.min_score) {
                return Err(invalid(index, format!("min_score {} outside [0, 100]", entry.min_score)));
            }
        }

        for (index, pair) in entries.windows(2).enumerate() {
            if pair[1].class <= pair[0].class {
                return Err(invalid(
                    index + 1,
                    format!("class `{}` listed after `{}`", pair[1].class, pair[0].class),
                ));
            }
            if pair[1].min_score < pair[0].min_score {
                return Err(ConfigError::NonMonotonicThresholds {
                    previous: pair[0].min_score,
                    next: pair[1].min_score,
                }
                .into());
            }
        }

        if entries[0].min_score != 0.0 {
            return Err(ConfigError::ThresholdCoverage(entries[0].min_score).into());
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ClassThreshold] {
        &self.entries
    }

    /// Class of a valid composite score: the highest class whose bound it reaches
    pub fn class_of(&self, score: f64) -> SuitabilityClass {
        self.entries
            .iter()
            .rev()
            .find(|t| score >= t.min_score)
            .unwrap_or(&self.entries[0])
            .class
    }
}

impl Default for ClassThresholds {
    fn default() -> Self {
        Self {
            entries: vec![
                ClassThreshold::new(SuitabilityClass::Low, 0.0),
                ClassThreshold::new(SuitabilityClass::Medium, 40.0),
                ClassThreshold::new(SuitabilityClass::High, 70.0),
            ],
        }
    }
}

fn invalid(index: usize, reason: String) -> Error {
    ConfigError::InvalidThreshold { index, reason }.into()
}

/// Classify a suitability surface.
///
/// [`EXCLUDED`](crate::EXCLUDED) cells become `Excluded` whatever the
/// thresholds; no-data cells become `NoData`.
pub fn classify(
    suitability: &Raster<f64>,
    thresholds: &ClassThresholds,
    exec: &Execution,
) -> Result<Raster<SuitabilityClass>> {
    let (rows, cols) = suitability.shape();
    let data = suitability.data();

    let (classes, _) = exec.processor(rows, cols).generate(SuitabilityClass::NoData, |tile, out| {
        for (offset, cell) in out.iter_mut().enumerate() {
            let value = data[tile.to_source_coords(offset)];
            *cell = if is_excluded(value) {
                SuitabilityClass::Excluded
            } else if suitability.is_nodata(value) {
                SuitabilityClass::NoData
            } else {
                thresholds.class_of(value)
            };
        }
    });

    let mut output = Raster::from_vec(suitability.grid().clone(), classes)?;
    output.set_nodata(Some(SuitabilityClass::NoData));
    Ok(output)
}

/// Classification stage
#[derive(Debug, Clone, Default)]
pub struct Classify;

impl Algorithm for Classify {
    type Input = Raster<f64>;
    type Output = Raster<SuitabilityClass>;
    type Params = ClassThresholds;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Classify"
    }

    fn description(&self) -> &'static str {
        "Bucket a suitability surface into Low / Medium / High / Excluded zones"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        classify(&input, &params, &Execution::default())
    }
}

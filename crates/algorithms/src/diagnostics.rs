//! Run diagnostics
//!
//! Counts and histograms gathered after a run so a caller can judge how much
//! of the study area was actually scored and why the rest was not.

use crate::classify::SuitabilityClass;
use crate::criteria::{DomainError, NormalizedCriterion};
use crate::is_excluded;
use crate::rank::{Ranking, RankingWarning};
use rainsite_core::raster::Raster;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Score at or above which a cell counts as high potential
pub const DEFAULT_HIGH_POTENTIAL_SCORE: f64 = 65.0;

/// Number of histogram bins over [0, 100]
pub const HISTOGRAM_BINS: usize = 10;

/// Histogram of scores in ten bins of width 10.
///
/// A score of exactly 100 falls in the last bin. No-data and excluded
/// cells are counted apart from the bins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreHistogram {
    pub bins: [usize; HISTOGRAM_BINS],
    pub nodata: usize,
    pub excluded: usize,
}

impl ScoreHistogram {
    pub fn from_raster(raster: &Raster<f64>) -> Self {
        let mut histogram = Self::default();
        for &value in raster.data().iter() {
            if is_excluded(value) {
                histogram.excluded += 1;
            } else if raster.is_nodata(value) {
                histogram.nodata += 1;
            } else {
                histogram.add(value);
            }
        }
        histogram
    }

    /// Count one valid score; values outside [0, 100] go to the end bins
    pub fn add(&mut self, score: f64) {
        let bin = (score / 10.0).floor().clamp(0.0, (HISTOGRAM_BINS - 1) as f64) as usize;
        self.bins[bin] += 1;
    }

    /// Cells counted in bins
    pub fn scored(&self) -> usize {
        self.bins.iter().sum()
    }
}

/// Something a caller should look at, without the run having failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Raw values outside a criterion's valid range
    DomainErrors { criterion: String, count: usize },
    /// No site reached the minimum class
    EmptyRanking { min_class: SuitabilityClass },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DomainErrors { criterion, count } => {
                write!(f, "{count} cell(s) of `{criterion}` outside the valid range were excluded")
            }
            Warning::EmptyRanking { min_class } => {
                write!(f, "no cell reached class `{min_class}`; no sites ranked")
            }
        }
    }
}

/// Per-criterion counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CriterionDiagnostics {
    pub domain_error_count: usize,
    pub histogram: ScoreHistogram,
}

/// Summary of one suitability run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub cell_count: usize,
    /// Every domain error of the run, criterion by criterion in canonical order
    pub domain_errors: Vec<DomainError>,
    pub domain_error_count: usize,
    pub criteria: BTreeMap<String, CriterionDiagnostics>,
    /// Cells inside an exclusion polygon
    pub constrained_cell_count: usize,
    /// Cells of the final surface set to EXCLUDED, by constraint or domain error
    pub excluded_cell_count: usize,
    pub nodata_cell_count: usize,
    pub scored_cell_count: usize,
    pub suitability_histogram: ScoreHistogram,
    pub class_counts: BTreeMap<SuitabilityClass, usize>,
    pub mean_suitability: Option<f64>,
    pub high_potential_score: f64,
    /// Share of scored cells at or above `high_potential_score`
    pub high_potential_fraction: Option<f64>,
    pub candidate_count: usize,
    pub site_count: usize,
    pub warnings: Vec<Warning>,
}

impl DiagnosticsReport {
    /// Gather diagnostics from the outputs of a run.
    ///
    /// # Arguments
    /// * `normalized` - Normalized criteria in canonical order
    /// * `mask` - Constraint mask
    /// * `suitability` - Final surface (mask applied)
    /// * `classes` - Class raster
    /// * `ranking` - Ranked sites
    /// * `high_potential_score` - Threshold for the high-potential share
    pub fn collect(
        normalized: &[NormalizedCriterion],
        mask: &Raster<bool>,
        suitability: &Raster<f64>,
        classes: &Raster<SuitabilityClass>,
        ranking: &Ranking,
        high_potential_score: f64,
    ) -> Self {
        let mut warnings = Vec::new();
        let mut criteria = BTreeMap::new();
        for criterion in normalized {
            let count = criterion.domain_errors.len();
            if count > 0 {
                warnings.push(Warning::DomainErrors {
                    criterion: criterion.name.clone(),
                    count,
                });
            }
            criteria.insert(
                criterion.name.clone(),
                CriterionDiagnostics {
                    domain_error_count: count,
                    histogram: ScoreHistogram::from_raster(&criterion.raster),
                },
            );
        }
        let domain_errors: Vec<DomainError> = normalized
            .iter()
            .flat_map(|c| c.domain_errors.iter().cloned())
            .collect();

        let mut class_counts: BTreeMap<SuitabilityClass, usize> = BTreeMap::new();
        for class in classes.data().iter() {
            *class_counts.entry(*class).or_default() += 1;
        }

        let mut sum = 0.0;
        let mut scored = 0usize;
        let mut high = 0usize;
        for &value in suitability.data().iter() {
            if is_excluded(value) || suitability.is_nodata(value) {
                continue;
            }
            sum += value;
            scored += 1;
            if value >= high_potential_score {
                high += 1;
            }
        }

        let suitability_histogram = ScoreHistogram::from_raster(suitability);

        if let Some(RankingWarning::EmptyResult { min_class }) = ranking.warning {
            warnings.push(Warning::EmptyRanking { min_class });
        }

        Self {
            cell_count: suitability.len(),
            domain_error_count: domain_errors.len(),
            domain_errors,
            criteria,
            constrained_cell_count: mask.data().iter().filter(|m| **m).count(),
            excluded_cell_count: suitability_histogram.excluded,
            nodata_cell_count: suitability_histogram.nodata,
            scored_cell_count: scored,
            suitability_histogram,
            class_counts,
            mean_suitability: (scored > 0).then(|| sum / scored as f64),
            high_potential_score,
            high_potential_fraction: (scored > 0).then(|| high as f64 / scored as f64),
            candidate_count: ranking.candidate_count,
            site_count: ranking.sites.len(),
            warnings,
        }
    }

    /// Cells of the given class
    pub fn class_count(&self, class: SuitabilityClass) -> usize {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }
}

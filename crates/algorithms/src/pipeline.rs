//! End-to-end suitability run
//!
//! normalize → constraint mask → overlay → classify → rank → diagnostics.
//! Every stage takes borrowed inputs and returns a new owned output; the
//! model itself is immutable and can be run any number of times.

use crate::classify::{classify, ClassThresholds, SuitabilityClass};
use crate::constraint::rasterize_constraints;
use crate::criteria::{normalize, CriteriaSet, NormalizedCriterion};
use crate::diagnostics::{DiagnosticsReport, DEFAULT_HIGH_POTENTIAL_SCORE};
use crate::exec::Execution;
use crate::overlay::weighted_overlay;
use crate::rank::{rank_sites, CandidateSite, RankParams};
use rainsite_core::raster::{Raster, RasterGrid};
use rainsite_core::{ConfigError, ConstraintPolygon, Result};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// A raw input raster tagged with the criterion it feeds
#[derive(Debug, Clone)]
pub struct CriterionLayer {
    pub name: String,
    pub raster: Raster<f64>,
}

impl CriterionLayer {
    pub fn new(name: impl Into<String>, raster: Raster<f64>) -> Self {
        Self {
            name: name.into(),
            raster,
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct SuitabilityRun {
    pub grid: RasterGrid,
    /// Normalized criteria in canonical order
    pub normalized: Vec<NormalizedCriterion>,
    pub mask: Raster<bool>,
    /// Weighted composite before masking
    pub composite: Raster<f64>,
    pub suitability: Raster<f64>,
    pub classes: Raster<SuitabilityClass>,
    pub sites: Vec<CandidateSite>,
    pub diagnostics: DiagnosticsReport,
}

/// Validated, immutable configuration of a suitability analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityModel {
    criteria: CriteriaSet,
    thresholds: ClassThresholds,
    ranking: RankParams,
    high_potential_score: f64,
    execution: Execution,
}

impl SuitabilityModel {
    /// Model with default tiling, all cores and the default high-potential score.
    pub fn new(criteria: CriteriaSet, thresholds: ClassThresholds, ranking: RankParams) -> Result<Self> {
        ranking.validate()?;
        Ok(Self {
            criteria,
            thresholds,
            ranking,
            high_potential_score: DEFAULT_HIGH_POTENTIAL_SCORE,
            execution: Execution::default(),
        })
    }

    pub fn with_execution(mut self, execution: Execution) -> Result<Self> {
        if execution.tile_rows == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "tile_rows",
                value: "0".into(),
                reason: "must be at least 1".into(),
            }
            .into());
        }
        self.execution = execution;
        Ok(self)
    }

    pub fn with_high_potential_score(mut self, score: f64) -> Result<Self> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(ConfigError::InvalidParameter {
                name: "high_potential_score",
                value: score.to_string(),
                reason: "must lie in [0, 100]".into(),
            }
            .into());
        }
        self.high_potential_score = score;
        Ok(self)
    }

    pub fn criteria(&self) -> &CriteriaSet {
        &self.criteria
    }

    pub fn thresholds(&self) -> &ClassThresholds {
        &self.thresholds
    }

    pub fn ranking(&self) -> &RankParams {
        &self.ranking
    }

    pub fn high_potential_score(&self) -> f64 {
        self.high_potential_score
    }

    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    /// Run the full pipeline.
    ///
    /// The first layer's grid is the reference every other input must
    /// match. Layers must cover every configured criterion exactly once.
    /// All stages share one worker pool for the whole run.
    pub fn run(&self, layers: &[CriterionLayer], constraints: &[ConstraintPolygon]) -> Result<SuitabilityRun> {
        let span = info_span!(
            "suitability_run",
            criteria = self.criteria.len(),
            constraints = constraints.len()
        );
        self.execution.mode.install(|| {
            let _guard = span.enter();
            self.run_stages(layers, constraints)
        })
    }

    fn run_stages(&self, layers: &[CriterionLayer], constraints: &[ConstraintPolygon]) -> Result<SuitabilityRun> {
        let started = Instant::now();

        let ordered = self.match_layers(layers)?;
        let grid = ordered[0].raster.grid().clone();
        for layer in layers {
            grid.ensure_aligned("input", &layer.name, layer.raster.grid())?;
        }
        let exec = &self.execution;

        let t = Instant::now();
        let normalized = ordered
            .iter()
            .map(|layer| -> Result<NormalizedCriterion> {
                // match_layers guarantees the spec exists
                let spec = self
                    .criteria
                    .get(&layer.name)
                    .ok_or_else(|| ConfigError::UnknownCriterion(layer.name.clone()))?;
                let out = normalize(&layer.raster, spec, exec)?;
                if !out.domain_errors.is_empty() {
                    warn!(
                        criterion = %out.name,
                        count = out.domain_errors.len(),
                        "values outside the valid range; cells excluded"
                    );
                }
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(elapsed_ms = t.elapsed().as_millis() as u64, "normalized criteria");

        let t = Instant::now();
        let mask = rasterize_constraints(constraints, &grid, exec)?;
        debug!(
            elapsed_ms = t.elapsed().as_millis() as u64,
            constrained = mask.data().iter().filter(|m| **m).count(),
            "rasterized constraints"
        );

        let t = Instant::now();
        let overlay = weighted_overlay(&normalized, &self.criteria, &mask, exec)?;
        debug!(elapsed_ms = t.elapsed().as_millis() as u64, "weighted overlay");

        let t = Instant::now();
        let classes = classify(&overlay.suitability, &self.thresholds, exec)?;
        debug!(elapsed_ms = t.elapsed().as_millis() as u64, "classified");

        let t = Instant::now();
        let ranking = rank_sites(&overlay.suitability, &classes, &self.ranking)?;
        debug!(
            elapsed_ms = t.elapsed().as_millis() as u64,
            candidates = ranking.candidate_count,
            sites = ranking.sites.len(),
            "ranked sites"
        );
        if ranking.warning.is_some() {
            warn!(min_class = %self.ranking.min_class, "no cell qualifies as a candidate site");
        }

        let diagnostics = DiagnosticsReport::collect(
            &normalized,
            &mask,
            &overlay.suitability,
            &classes,
            &ranking,
            self.high_potential_score,
        );

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            scored = diagnostics.scored_cell_count,
            excluded = diagnostics.excluded_cell_count,
            sites = ranking.sites.len(),
            "suitability run complete"
        );

        Ok(SuitabilityRun {
            grid,
            normalized,
            mask,
            composite: overlay.composite,
            suitability: overlay.suitability,
            classes,
            sites: ranking.sites,
            diagnostics,
        })
    }

    /// Layers in canonical criterion order
    fn match_layers<'a>(&self, layers: &'a [CriterionLayer]) -> Result<Vec<&'a CriterionLayer>> {
        if let Some(unknown) = layers.iter().find(|l| !self.criteria.contains(&l.name)) {
            return Err(ConfigError::UnknownCriterion(unknown.name.clone()).into());
        }

        self.criteria
            .names()
            .map(|name| -> Result<&'a CriterionLayer> {
                let mut matching = layers.iter().filter(|l| l.name == name);
                match (matching.next(), matching.next()) {
                    (None, _) => Err(ConfigError::MissingCriterion(name.to_string()).into()),
                    (Some(_), Some(_)) => Err(ConfigError::DuplicateCriterion(name.to_string()).into()),
                    (Some(layer), None) => Ok(layer),
                }
            })
            .collect()
    }
}

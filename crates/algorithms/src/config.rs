//! Serializable analysis configuration
//!
//! [`SuitabilityConfig`] is the loosely-typed form read from JSON. It is
//! validated once by [`SuitabilityConfig::validate`] into a
//! [`SuitabilityModel`]; nothing downstream re-checks it.

use crate::classify::{ClassThreshold, ClassThresholds, SuitabilityClass};
use crate::criteria::presets::{standard_criteria_with, PresetInputs, StructureType, WeightProfile};
use crate::criteria::{BreakpointBand, CriteriaSet, CriterionSpec, ValidRange};
use crate::diagnostics::DEFAULT_HIGH_POTENTIAL_SCORE;
use crate::exec::{Execution, DEFAULT_TILE_ROWS};
use crate::pipeline::SuitabilityModel;
use crate::rank::RankParams;
use rainsite_core::{ConfigError, Result};
use rainsite_parallel::ProcessingMode;
use serde::{Deserialize, Serialize};

/// One criterion as written in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionConfig {
    pub name: String,
    pub weight: f64,
    pub bands: Vec<BreakpointBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_range: Option<ValidRange>,
}

impl CriterionConfig {
    fn to_spec(&self) -> Result<CriterionSpec> {
        let spec = CriterionSpec::new(self.name.clone(), self.weight, self.bands.clone())?;
        match self.valid_range {
            Some(range) => spec.with_valid_range(range),
            None => Ok(spec),
        }
    }
}

impl From<&CriterionSpec> for CriterionConfig {
    fn from(spec: &CriterionSpec) -> Self {
        let range = spec.valid_range();
        Self {
            name: spec.name().to_string(),
            weight: spec.weight(),
            bands: spec.bands().to_vec(),
            valid_range: (range != ValidRange::any()).then_some(range),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub min_separation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sites: Option<usize>,
    pub min_class: SuitabilityClass,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let params = RankParams::default();
        Self {
            min_separation: params.min_separation,
            max_sites: params.max_sites,
            min_class: params.min_class,
        }
    }
}

fn default_high_potential_score() -> f64 {
    DEFAULT_HIGH_POTENTIAL_SCORE
}

fn default_tile_rows() -> usize {
    DEFAULT_TILE_ROWS
}

/// Full configuration of a suitability analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityConfig {
    pub criteria: Vec<CriterionConfig>,
    /// Class thresholds from the lowest class up; default Low 0 / Medium 40 / High 70
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<ClassThreshold>>,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default = "default_high_potential_score")]
    pub high_potential_score: f64,
    #[serde(default = "default_tile_rows")]
    pub tile_rows: usize,
    /// Worker threads: absent for all cores, 1 for sequential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl SuitabilityConfig {
    /// Configuration with default thresholds, ranking and execution
    pub fn new(criteria: Vec<CriterionConfig>) -> Self {
        Self {
            criteria,
            thresholds: None,
            ranking: RankingConfig::default(),
            high_potential_score: DEFAULT_HIGH_POTENTIAL_SCORE,
            tile_rows: DEFAULT_TILE_ROWS,
            threads: None,
        }
    }

    /// The five standard criteria under a regional profile
    pub fn preset(profile: WeightProfile, structure: StructureType) -> Result<Self> {
        Self::preset_with(profile, structure, PresetInputs::default())
    }

    /// Like [`SuitabilityConfig::preset`] for other land-cover and soil encodings
    pub fn preset_with(profile: WeightProfile, structure: StructureType, inputs: PresetInputs) -> Result<Self> {
        let set = standard_criteria_with(profile, structure, inputs)?;
        Ok(Self::new(set.iter().map(CriterionConfig::from).collect()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Check every invariant and build the immutable model.
    pub fn validate(&self) -> Result<SuitabilityModel> {
        let specs = self
            .criteria
            .iter()
            .map(CriterionConfig::to_spec)
            .collect::<Result<Vec<_>>>()?;
        let criteria = CriteriaSet::new(specs)?;

        let thresholds = match &self.thresholds {
            Some(entries) => ClassThresholds::new(entries.clone())?,
            None => ClassThresholds::default(),
        };

        let ranking = RankParams::new(
            self.ranking.min_separation,
            self.ranking.max_sites,
            self.ranking.min_class,
        )?;

        let execution = Execution::new(ProcessingMode::from_threads(self.threads), self.tile_rows);

        SuitabilityModel::new(criteria, thresholds, ranking)?
            .with_execution(execution)?
            .with_high_potential_score(self.high_potential_score)
    }
}

//! Ready-made criteria for rainwater-harvesting site selection
//!
//! Three-tier tables score High = 100, Medium = 50, Low = 10. Regional
//! weight profiles follow the agro-climatic zones used for Indian
//! watershed planning.

use super::band::{categorical_bands, BreakpointBand};
use super::spec::{CriteriaSet, CriterionSpec, ValidRange};
use rainsite_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

pub const SLOPE: &str = "slope";
pub const RAINFALL: &str = "rainfall";
pub const INFILTRATION: &str = "infiltration";
pub const LAND_COVER: &str = "land_cover";
pub const ROAD_DISTANCE: &str = "road_distance";

pub const HIGH_SCORE: f64 = 100.0;
pub const MEDIUM_SCORE: f64 = 50.0;
pub const LOW_SCORE: f64 = 10.0;

/// Kind of structure being sited; it decides how soil infiltration scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    /// Recharge structure: fast infiltration is desirable
    #[default]
    PercolationTank,
    /// Stream barrier for recharge: fast infiltration is desirable
    CheckDam,
    /// Storage structure: slow infiltration keeps water in the pond
    FarmPond,
}

impl StructureType {
    /// Whether the structure stores water rather than recharging it
    pub fn is_storage(&self) -> bool {
        matches!(self, StructureType::FarmPond)
    }
}

/// Regional weight profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProfile {
    /// Plateau and anything not matched below
    #[default]
    General,
    AridSemiArid,
    Hilly,
    CoastalWet,
    AlluvialPlains,
}

impl WeightProfile {
    /// Weights for (rainfall, slope, infiltration, land_cover, road_distance)
    pub fn weights(&self) -> [(&'static str, f64); 5] {
        let (rain, slope, soil, lulc, road) = match self {
            WeightProfile::General => (0.25, 0.20, 0.20, 0.15, 0.20),
            WeightProfile::AridSemiArid => (0.35, 0.15, 0.25, 0.10, 0.15),
            WeightProfile::Hilly => (0.10, 0.40, 0.15, 0.10, 0.25),
            WeightProfile::CoastalWet => (0.10, 0.30, 0.20, 0.20, 0.20),
            WeightProfile::AlluvialPlains => (0.20, 0.10, 0.15, 0.30, 0.25),
        };
        [
            (RAINFALL, rain),
            (SLOPE, slope),
            (INFILTRATION, soil),
            (LAND_COVER, lulc),
            (ROAD_DISTANCE, road),
        ]
    }

    /// Profile for an Indian state or region name (case-insensitive).
    pub fn for_region(region: &str) -> Self {
        match region.trim().to_ascii_lowercase().as_str() {
            "rajasthan" | "gujarat" | "haryana" => WeightProfile::AridSemiArid,
            "himachal pradesh" | "uttarakhand" | "sikkim" | "arunachal pradesh"
            | "jammu and kashmir" | "ladakh" => WeightProfile::Hilly,
            "kerala" | "goa" | "konkan" => WeightProfile::CoastalWet,
            "uttar pradesh" | "bihar" | "west bengal" | "punjab" => WeightProfile::AlluvialPlains,
            _ => WeightProfile::General,
        }
    }
}

/// Coding of the land-cover raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverCodes {
    /// The eight [`LandCover`] classes
    #[default]
    Standard,
    /// ESA WorldCover class codes 10 to 100
    EsaWorldCover,
}

/// What the infiltration raster holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilInput {
    /// Measured infiltration rate in cm/hr
    #[default]
    InfiltrationRate,
    /// USDA soil texture class 1 to 12
    UsdaTexture,
}

/// Encodings of the categorical preset inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresetInputs {
    #[serde(default)]
    pub land_cover: LandCoverCodes,
    #[serde(default)]
    pub soil: SoilInput,
}

/// Land-cover codes understood by [`land_cover_bands`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandCover {
    Grassland = 1,
    Scrubland = 2,
    Fallow = 3,
    MixedCrop = 4,
    Plantation = 5,
    Forest = 6,
    BuiltUp = 7,
    Water = 8,
}

impl LandCover {
    /// Raster code of this class
    pub fn code(self) -> f64 {
        self as i32 as f64
    }
}

/// Slope in degrees: gentle terrain scores high
pub fn slope_bands() -> Vec<BreakpointBand> {
    vec![
        BreakpointBand::new(0.0, 10.0, HIGH_SCORE),
        BreakpointBand::new(10.0, 30.0, MEDIUM_SCORE),
        BreakpointBand::new(30.0, 90.0, LOW_SCORE),
    ]
}

/// Mean annual rainfall in mm
pub fn rainfall_bands() -> Vec<BreakpointBand> {
    vec![
        BreakpointBand::new(0.0, 500.0, LOW_SCORE),
        BreakpointBand::new(500.0, 800.0, MEDIUM_SCORE),
        BreakpointBand::new(800.0, 5000.0, HIGH_SCORE),
    ]
}

/// Soil infiltration rate in cm/hr, scored for the structure type
pub fn infiltration_bands(structure: StructureType) -> Vec<BreakpointBand> {
    let (slow, moderate, fast) = if structure.is_storage() {
        (HIGH_SCORE, MEDIUM_SCORE, LOW_SCORE)
    } else {
        (LOW_SCORE, MEDIUM_SCORE, HIGH_SCORE)
    };
    vec![
        BreakpointBand::new(0.0, 5.0, slow),
        BreakpointBand::new(5.0, 10.0, moderate),
        BreakpointBand::new(10.0, 50.0, fast),
    ]
}

/// Distance to the nearest road in metres
pub fn road_distance_bands() -> Vec<BreakpointBand> {
    vec![
        BreakpointBand::new(0.0, 500.0, LOW_SCORE),
        BreakpointBand::new(500.0, 1500.0, MEDIUM_SCORE),
        BreakpointBand::new(1500.0, 10_000.0, HIGH_SCORE),
    ]
}

/// Bands over [`LandCover`] codes
pub fn land_cover_bands() -> Vec<BreakpointBand> {
    categorical_bands(&[
        (LandCover::Grassland.code(), HIGH_SCORE),
        (LandCover::Scrubland.code(), HIGH_SCORE),
        (LandCover::Fallow.code(), HIGH_SCORE),
        (LandCover::MixedCrop.code(), MEDIUM_SCORE),
        (LandCover::Plantation.code(), MEDIUM_SCORE),
        (LandCover::Forest.code(), MEDIUM_SCORE),
        (LandCover::BuiltUp.code(), LOW_SCORE),
        (LandCover::Water.code(), LOW_SCORE),
    ])
}

/// Bands over ESA WorldCover class codes (10 tree cover ... 100 moss)
pub fn esa_worldcover_bands() -> Vec<BreakpointBand> {
    categorical_bands(&[
        (10.0, 60.0),
        (20.0, 80.0),
        (30.0, 90.0),
        (40.0, 100.0),
        (50.0, 0.0),
        (60.0, 10.0),
        (70.0, 20.0),
        (80.0, 0.0),
        (90.0, 50.0),
        (95.0, 0.0),
        (100.0, 10.0),
    ])
}

/// Bands over the 12 USDA soil texture classes (1 clay ... 12 sand)
pub fn usda_texture_bands(structure: StructureType) -> Vec<BreakpointBand> {
    let scores: [f64; 12] = if structure.is_storage() {
        [100.0, 90.0, 70.0, 60.0, 50.0, 90.0, 50.0, 40.0, 30.0, 40.0, 10.0, 20.0]
    } else {
        [10.0, 20.0, 30.0, 40.0, 50.0, 30.0, 60.0, 70.0, 90.0, 90.0, 100.0, 90.0]
    };
    let codes: Vec<(f64, f64)> = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| ((i + 1) as f64, s))
        .collect();
    categorical_bands(&codes)
}

/// The five standard criteria with a regional weight profile.
pub fn standard_criteria(profile: WeightProfile, structure: StructureType) -> Result<CriteriaSet> {
    standard_criteria_with(profile, structure, PresetInputs::default())
}

/// Like [`standard_criteria`], reading land cover and soil in the given encodings.
pub fn standard_criteria_with(
    profile: WeightProfile,
    structure: StructureType,
    inputs: PresetInputs,
) -> Result<CriteriaSet> {
    let specs = profile
        .weights()
        .iter()
        .map(|&(name, weight)| standard_spec_with(name, weight, structure, inputs))
        .collect::<Result<Vec<_>>>()?;
    CriteriaSet::new(specs)
}

/// One standard criterion by name with the given weight.
pub fn standard_spec(name: &str, weight: f64, structure: StructureType) -> Result<CriterionSpec> {
    standard_spec_with(name, weight, structure, PresetInputs::default())
}

pub fn standard_spec_with(
    name: &str,
    weight: f64,
    structure: StructureType,
    inputs: PresetInputs,
) -> Result<CriterionSpec> {
    let (bands, range) = match name {
        SLOPE => (slope_bands(), ValidRange::new(Some(0.0), Some(90.0))),
        RAINFALL => (rainfall_bands(), ValidRange::non_negative()),
        INFILTRATION => match inputs.soil {
            SoilInput::InfiltrationRate => (infiltration_bands(structure), ValidRange::non_negative()),
            SoilInput::UsdaTexture => (usda_texture_bands(structure), ValidRange::new(Some(1.0), Some(12.0))),
        },
        LAND_COVER => match inputs.land_cover {
            LandCoverCodes::Standard => (land_cover_bands(), ValidRange::new(Some(1.0), Some(8.0))),
            LandCoverCodes::EsaWorldCover => (esa_worldcover_bands(), ValidRange::new(Some(10.0), Some(100.0))),
        },
        ROAD_DISTANCE => (road_distance_bands(), ValidRange::non_negative()),
        other => return Err(ConfigError::UnknownCriterion(other.to_string()).into()),
    };
    CriterionSpec::new(name, weight, bands)?.with_valid_range(range)
}

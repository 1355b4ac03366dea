//! RainSite CLI - rainwater-harvesting site suitability

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rainsite_algorithms::criteria::presets::{LandCoverCodes, PresetInputs, SoilInput, StructureType, WeightProfile};
use rainsite_algorithms::{CandidateSite, CriterionLayer, DiagnosticsReport, SuitabilityClass, SuitabilityConfig};
use rainsite_core::{ConstraintPolygon, Raster, RasterGrid};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rainsite")]
#[command(author, version, about = "Multi-criteria site suitability for rainwater harvesting", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suitability analysis described by a JSON scenario
    Run {
        /// Scenario file (grid, layers, constraints, config)
        scenario: PathBuf,
        /// Print at most this many sites
        #[arg(short = 'n', long)]
        top: Option<usize>,
        /// Print sites and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a configuration file without running it
    Validate {
        /// Configuration file
        config: PathBuf,
    },
    /// Print a preset configuration as JSON
    Preset {
        /// Weight profile: general, arid, hilly, coastal, plains
        #[arg(short, long, default_value = "general", conflicts_with = "region")]
        profile: String,
        /// Pick the profile from a state or region name instead
        #[arg(short, long)]
        region: Option<String>,
        /// Structure type: percolation-tank, check-dam, farm-pond
        #[arg(short, long, default_value = "percolation-tank")]
        structure: String,
        /// Land-cover raster coding: standard (1-8) or worldcover (ESA 10-100)
        #[arg(long, default_value = "standard")]
        land_cover: String,
        /// Soil raster contents: rate (cm/hr) or texture (USDA classes 1-12)
        #[arg(long, default_value = "rate")]
        soil: String,
    },
}

// ─── Scenario file ──────────────────────────────────────────────────────

/// Everything a run needs, in one JSON document
#[derive(Deserialize)]
struct Scenario {
    grid: RasterGrid,
    layers: Vec<LayerDef>,
    #[serde(default)]
    constraints: Vec<ConstraintDef>,
    config: SuitabilityConfig,
}

/// Raw criterion values row by row; `null` marks no-data
#[derive(Deserialize)]
struct LayerDef {
    name: String,
    values: Vec<Vec<Option<f64>>>,
    /// Additional no-data sentinel used by the source data
    #[serde(default)]
    nodata: Option<f64>,
}

#[derive(Deserialize)]
struct ConstraintDef {
    exterior: Vec<(f64, f64)>,
    #[serde(default)]
    holes: Vec<Vec<(f64, f64)>>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default = "default_exclude")]
    exclude: bool,
}

fn default_exclude() -> bool {
    true
}

impl LayerDef {
    fn into_layer(self, grid: &RasterGrid) -> Result<CriterionLayer> {
        let (rows, cols) = grid.shape();
        if self.values.len() != rows || self.values.iter().any(|r| r.len() != cols) {
            anyhow::bail!(
                "Layer '{}' must have {} rows of {} values to match the grid",
                self.name,
                rows,
                cols
            );
        }
        let values = self
            .values
            .into_iter()
            .flatten()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let mut raster = Raster::from_vec(grid.clone(), values)
            .with_context(|| format!("Invalid values for layer '{}'", self.name))?;
        if let Some(nodata) = self.nodata {
            raster.set_nodata(Some(nodata));
        }
        Ok(CriterionLayer::new(self.name, raster))
    }
}

impl From<ConstraintDef> for ConstraintPolygon {
    fn from(def: ConstraintDef) -> Self {
        let mut polygon = ConstraintPolygon::from_rings(def.exterior, def.holes);
        polygon.exclude = def.exclude;
        polygon.label = def.label;
        polygon
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    sites: &'a [CandidateSite],
    diagnostics: &'a DiagnosticsReport,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set default subscriber")
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_profile(s: &str) -> Result<WeightProfile> {
    match s.to_lowercase().as_str() {
        "general" | "plateau" => Ok(WeightProfile::General),
        "arid" | "semi-arid" | "arid-semi-arid" => Ok(WeightProfile::AridSemiArid),
        "hilly" | "mountain" => Ok(WeightProfile::Hilly),
        "coastal" | "wet" | "coastal-wet" => Ok(WeightProfile::CoastalWet),
        "plains" | "alluvial" | "alluvial-plains" => Ok(WeightProfile::AlluvialPlains),
        _ => anyhow::bail!(
            "Unknown profile: {}. Use general, arid, hilly, coastal, or plains.",
            s
        ),
    }
}

fn parse_structure(s: &str) -> Result<StructureType> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "percolation-tank" | "tank" => Ok(StructureType::PercolationTank),
        "check-dam" | "dam" => Ok(StructureType::CheckDam),
        "farm-pond" | "pond" => Ok(StructureType::FarmPond),
        _ => anyhow::bail!(
            "Unknown structure: {}. Use percolation-tank, check-dam, or farm-pond.",
            s
        ),
    }
}

fn parse_land_cover(s: &str) -> Result<LandCoverCodes> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "standard" => Ok(LandCoverCodes::Standard),
        "worldcover" | "esa" | "esa-worldcover" => Ok(LandCoverCodes::EsaWorldCover),
        _ => anyhow::bail!("Unknown land-cover coding: {}. Use standard or worldcover.", s),
    }
}

fn parse_soil(s: &str) -> Result<SoilInput> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "rate" | "infiltration" | "infiltration-rate" => Ok(SoilInput::InfiltrationRate),
        "texture" | "usda" | "usda-texture" => Ok(SoilInput::UsdaTexture),
        _ => anyhow::bail!("Unknown soil input: {}. Use rate or texture.", s),
    }
}

fn print_sites(sites: &[CandidateSite]) {
    if sites.is_empty() {
        println!("No candidate sites.");
        return;
    }
    println!(
        "{:>4}  {:>6}  {:>6}  {:>14}  {:>14}  {:>7}  {}",
        "rank", "row", "col", "x", "y", "score", "class"
    );
    for s in sites {
        println!(
            "{:>4}  {:>6}  {:>6}  {:>14.3}  {:>14.3}  {:>7.2}  {}",
            s.rank, s.row, s.col, s.x, s.y, s.score, s.class
        );
    }
}

fn print_diagnostics(d: &DiagnosticsReport) {
    println!("\nDiagnostics:");
    println!("  Cells: {}", d.cell_count);
    println!(
        "  Scored: {}  Excluded: {}  NoData: {}",
        d.scored_cell_count, d.excluded_cell_count, d.nodata_cell_count
    );
    println!("  Inside constraints: {}", d.constrained_cell_count);
    println!("  Domain errors: {}", d.domain_error_count);
    for class in [SuitabilityClass::High, SuitabilityClass::Medium, SuitabilityClass::Low] {
        println!("  {:<8} {}", format!("{}:", class), d.class_count(class));
    }
    if let Some(mean) = d.mean_suitability {
        println!("  Mean suitability: {:.2}", mean);
    }
    if let Some(fraction) = d.high_potential_fraction {
        println!(
            "  High potential (>= {}): {:.1}%",
            d.high_potential_score,
            100.0 * fraction
        );
    }
    for warning in &d.warnings {
        println!("  Warning: {}", warning);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Run { scenario, top, json } => {
            let scenario: Scenario = read_json(&scenario)?;
            let model = scenario.config.validate().context("Invalid configuration")?;
            let layers = scenario
                .layers
                .into_iter()
                .map(|l| l.into_layer(&scenario.grid))
                .collect::<Result<Vec<_>>>()?;
            let constraints: Vec<ConstraintPolygon> =
                scenario.constraints.into_iter().map(ConstraintPolygon::from).collect();
            info!("Grid: {}", scenario.grid);

            let start = Instant::now();
            let run = model
                .run(&layers, &constraints)
                .context("Suitability analysis failed")?;
            let elapsed = start.elapsed();

            let shown = &run.sites[..top.unwrap_or(run.sites.len()).min(run.sites.len())];
            if json {
                let report = RunReport {
                    sites: shown,
                    diagnostics: &run.diagnostics,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_sites(shown);
                print_diagnostics(&run.diagnostics);
                println!("  Processing time: {:.2?}", elapsed);
            }
        }

        Commands::Validate { config } => {
            let config: SuitabilityConfig = read_json(&config)?;
            let model = config.validate().context("Invalid configuration")?;
            println!("Configuration OK");
            for spec in model.criteria().iter() {
                println!("  {:<16} weight {:.3}  {} band(s)", spec.name(), spec.weight(), spec.bands().len());
            }
        }

        Commands::Preset {
            profile,
            region,
            structure,
            land_cover,
            soil,
        } => {
            let profile = match region {
                Some(region) => WeightProfile::for_region(&region),
                None => parse_profile(&profile)?,
            };
            let structure = parse_structure(&structure)?;
            let inputs = PresetInputs {
                land_cover: parse_land_cover(&land_cover)?,
                soil: parse_soil(&soil)?,
            };
            let config =
                SuitabilityConfig::preset_with(profile, structure, inputs).context("Failed to build preset")?;
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}

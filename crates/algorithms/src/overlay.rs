//! Weighted overlay of normalized criteria
//!
//! ```text
//! composite = clamp(Σ score_i * weight_i, 0, 100)
//! ```
//!
//! The sum is accumulated in the criteria set's canonical (lexicographic)
//! order, whatever order the rasters arrive in, so the composite is
//! bit-reproducible. Constraints are applied after the composite is
//! computed: masked cells are overwritten with [`EXCLUDED`] in the final
//! surface while the raw composite keeps the computed value.

use crate::criteria::{CriteriaSet, NormalizedCriterion};
use crate::exec::Execution;
use crate::{is_excluded, EXCLUDED};
use rainsite_core::raster::Raster;
use rainsite_core::{ConfigError, Result};

/// Output of [`weighted_overlay`]
#[derive(Debug, Clone)]
pub struct OverlayOutput {
    /// Weighted composite before the constraint mask is applied
    pub composite: Raster<f64>,
    /// Final suitability surface: composite with masked cells set to [`EXCLUDED`]
    pub suitability: Raster<f64>,
}

/// Match supplied rasters to the criteria set, in canonical order.
pub(crate) fn match_criteria<'a>(
    criteria: &'a [NormalizedCriterion],
    set: &CriteriaSet,
) -> Result<Vec<(&'a NormalizedCriterion, f64)>> {
    if let Some(unknown) = criteria.iter().find(|c| !set.contains(&c.name)) {
        return Err(ConfigError::UnknownCriterion(unknown.name.clone()).into());
    }

    set.iter()
        .map(|spec| -> Result<(&'a NormalizedCriterion, f64)> {
            let mut matching = criteria.iter().filter(|c| c.name == spec.name());
            match (matching.next(), matching.next()) {
                (None, _) => Err(ConfigError::MissingCriterion(spec.name().to_string()).into()),
                (Some(_), Some(_)) => Err(ConfigError::DuplicateCriterion(spec.name().to_string()).into()),
                (Some(c), None) => Ok((c, spec.weight())),
            }
        })
        .collect()
}

/// Combine normalized criteria into a composite suitability surface.
///
/// # Arguments
/// * `criteria` - One normalized raster per criterion of `set`, in any order
/// * `set` - Validated criteria carrying the weights
/// * `mask` - Constraint mask, `true` = excluded
/// * `exec` - Tiling and thread options
///
/// Per cell: a criterion marked [`EXCLUDED`] (domain error) excludes the
/// cell; otherwise any no-data criterion makes the cell no-data (NaN);
/// otherwise the weighted sum is clamped to [0, 100].
pub fn weighted_overlay(
    criteria: &[NormalizedCriterion],
    set: &CriteriaSet,
    mask: &Raster<bool>,
    exec: &Execution,
) -> Result<OverlayOutput> {
    let layers = match_criteria(criteria, set)?;

    let grid = layers[0].0.raster.grid();
    for (criterion, _) in &layers {
        grid.ensure_aligned("overlay", &criterion.name, criterion.raster.grid())?;
    }
    grid.ensure_aligned("overlay", "constraint mask", mask.grid())?;

    let (rows, cols) = grid.shape();
    let processor = exec.processor(rows, cols);

    let (composite, _) = processor.generate(f64::NAN, |tile, out| {
        for (offset, cell) in out.iter_mut().enumerate() {
            let (row, col) = tile.to_source_coords(offset);
            *cell = composite_cell(&layers, row, col);
        }
    });

    let mut suitability = composite.clone();
    let mask_data = mask.data();
    processor.process(&mut suitability, |tile, out| {
        for (offset, cell) in out.iter_mut().enumerate() {
            if mask_data[tile.to_source_coords(offset)] {
                *cell = EXCLUDED;
            }
        }
    });

    let mut composite = Raster::from_vec(grid.clone(), composite)?;
    composite.set_nodata(Some(f64::NAN));
    let mut suitability = Raster::from_vec(grid.clone(), suitability)?;
    suitability.set_nodata(Some(f64::NAN));

    Ok(OverlayOutput {
        composite,
        suitability,
    })
}

fn composite_cell(layers: &[(&NormalizedCriterion, f64)], row: usize, col: usize) -> f64 {
    let mut sum = 0.0;
    let mut missing = false;

    for (criterion, weight) in layers {
        let value = criterion.raster.data()[(row, col)];
        if is_excluded(value) {
            return EXCLUDED;
        }
        if criterion.raster.is_nodata(value) {
            missing = true;
            continue;
        }
        sum += value * weight;
    }

    if missing {
        f64::NAN
    } else {
        sum.clamp(0.0, 100.0)
    }
}

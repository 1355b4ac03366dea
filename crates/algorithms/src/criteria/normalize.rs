//! Raw criterion rasters to 0–100 scores
//!
//! No-data cells stay no-data. Values outside the criterion's valid range
//! are recorded as [`DomainError`]s and the cell is marked [`EXCLUDED`];
//! the run carries on.

use super::spec::CriterionSpec;
use crate::exec::Execution;
use crate::EXCLUDED;
use rainsite_core::raster::Raster;
use rainsite_core::Result;
use serde::Serialize;
use std::fmt;

/// A raw cell value outside its criterion's physical range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainError {
    pub criterion: String,
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} at ({}, {}) is outside the valid range",
            self.criterion, self.value, self.row, self.col
        )
    }
}

/// Scores of one criterion on the run's grid
#[derive(Debug, Clone)]
pub struct NormalizedCriterion {
    pub name: String,
    /// Scores in [0, 100], NaN for no-data, [`EXCLUDED`] for domain errors
    pub raster: Raster<f64>,
    /// Domain errors in row-major order
    pub domain_errors: Vec<DomainError>,
}

/// Map every cell of `raw` to its band score.
///
/// # Arguments
/// * `raw` - Raw physical values (degrees, mm, cm/hr, class codes, ...)
/// * `spec` - Bands and valid range of the criterion
/// * `exec` - Tiling and thread options; they never change the result
///
/// # Example
/// ```ignore
/// let slope_scores = normalize(&slope_deg, &slope_spec, &Execution::default())?;
/// assert_eq!(slope_scores.raster.get(0, 0)?, 100.0); // 5° falls in [0, 10]
/// ```
pub fn normalize(raw: &Raster<f64>, spec: &CriterionSpec, exec: &Execution) -> Result<NormalizedCriterion> {
    let (rows, cols) = raw.shape();
    let data = raw.data();

    let (values, tile_errors) = exec.processor(rows, cols).generate(f64::NAN, |tile, out| {
        let mut errors = Vec::new();
        for (offset, cell) in out.iter_mut().enumerate() {
            let (row, col) = tile.to_source_coords(offset);
            let value = data[(row, col)];

            if raw.is_nodata(value) {
                continue;
            }

            *cell = match spec.score(value) {
                Some(score) => score,
                None => {
                    errors.push(DomainError {
                        criterion: spec.name().to_string(),
                        row,
                        col,
                        value,
                    });
                    EXCLUDED
                }
            };
        }
        errors
    });

    let mut raster = Raster::from_vec(raw.grid().clone(), values)?;
    raster.set_nodata(Some(f64::NAN));

    Ok(NormalizedCriterion {
        name: spec.name().to_string(),
        raster,
        domain_errors: tile_errors.into_iter().flatten().collect(),
    })
}

//! Candidate site ranking
//!
//! Greedy non-maximum suppression over qualifying cells:
//! 1. collect cells whose class reaches the minimum class
//! 2. sort by score descending, then by row-major index ascending
//! 3. accept a cell if its center is at least `min_separation` away from
//!    every site accepted so far
//!
//! Selection is sequential by nature and runs on the calling thread.

use crate::classify::SuitabilityClass;
use crate::is_excluded;
use rainsite_core::raster::Raster;
use rainsite_core::{Algorithm, ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for site ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankParams {
    /// Minimum distance between accepted sites, in grid coordinate units
    pub min_separation: f64,
    /// Stop after this many sites
    pub max_sites: Option<usize>,
    /// Lowest class a cell needs to be a candidate
    pub min_class: SuitabilityClass,
}

impl RankParams {
    pub fn new(min_separation: f64, max_sites: Option<usize>, min_class: SuitabilityClass) -> Result<Self> {
        let params = Self {
            min_separation,
            max_sites,
            min_class,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_separation.is_finite() || self.min_separation < 0.0 {
            return Err(ConfigError::InvalidSeparation(self.min_separation).into());
        }
        if !self.min_class.is_scored() {
            return Err(ConfigError::InvalidMinClass(self.min_class.to_string()).into());
        }
        Ok(())
    }
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            min_separation: 0.0,
            max_sites: None,
            min_class: SuitabilityClass::Medium,
        }
    }
}

/// A ranked candidate location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSite {
    /// Row-major cell index
    pub id: usize,
    pub row: usize,
    pub col: usize,
    /// Cell center
    pub x: f64,
    pub y: f64,
    pub score: f64,
    pub class: SuitabilityClass,
    /// 1-based rank
    pub rank: usize,
}

/// Non-fatal ranking outcomes worth reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingWarning {
    /// No cell reached the minimum class, or `max_sites` was zero
    EmptyResult { min_class: SuitabilityClass },
}

/// Result of [`rank_sites`]
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub sites: Vec<CandidateSite>,
    /// Cells that met the minimum class
    pub candidate_count: usize,
    pub warning: Option<RankingWarning>,
}

/// Rank candidate sites on a classified suitability surface.
///
/// # Arguments
/// * `suitability` - Composite scores
/// * `classes` - Classes of the same grid
/// * `params` - Separation, result cap and minimum class
///
/// An empty result is not an error; it carries
/// [`RankingWarning::EmptyResult`]. A separation larger than the grid
/// diagonal returns only the best cell.
pub fn rank_sites(
    suitability: &Raster<f64>,
    classes: &Raster<SuitabilityClass>,
    params: &RankParams,
) -> Result<Ranking> {
    params.validate()?;
    let grid = suitability.grid();
    grid.ensure_aligned("ranking", "classes", classes.grid())?;

    let scores = suitability.data();
    let mut candidates: Vec<(f64, usize)> = classes
        .data()
        .indexed_iter()
        .filter(|(_, class)| class.is_scored() && **class >= params.min_class)
        .map(|((row, col), _)| (scores[(row, col)], grid.index(row, col)))
        .filter(|(score, _)| score.is_finite() && !is_excluded(*score))
        .collect();
    let candidate_count = candidates.len();

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let limit = params.max_sites.unwrap_or(usize::MAX);
    let mut accepted = AcceptedSites::new(params.min_separation, grid.extent());
    let mut sites = Vec::new();

    for (score, id) in candidates {
        if sites.len() >= limit {
            break;
        }
        let (row, col) = grid.position(id);
        let (x, y) = grid.cell_center(row, col);
        if !accepted.try_accept(x, y) {
            continue;
        }
        sites.push(CandidateSite {
            id,
            row,
            col,
            x,
            y,
            score,
            class: classes.data()[(row, col)],
            rank: sites.len() + 1,
        });
    }

    let warning = sites.is_empty().then_some(RankingWarning::EmptyResult {
        min_class: params.min_class,
    });

    Ok(Ranking {
        sites,
        candidate_count,
        warning,
    })
}

/// Accepted site centers bucketed on a square lattice of side `separation`.
///
/// Any point closer than `separation` lies in the same or an adjacent
/// bucket, so a check only looks at 3x3 buckets.
struct AcceptedSites {
    separation: f64,
    origin: (f64, f64),
    buckets: HashMap<(i64, i64), Vec<(f64, f64)>>,
}

impl AcceptedSites {
    fn new(separation: f64, extent: (f64, f64, f64, f64)) -> Self {
        Self {
            separation,
            origin: (extent.0, extent.1),
            buckets: HashMap::new(),
        }
    }

    fn bucket(&self, x: f64, y: f64) -> (i64, i64) {
        (
            ((x - self.origin.0) / self.separation).floor() as i64,
            ((y - self.origin.1) / self.separation).floor() as i64,
        )
    }

    fn try_accept(&mut self, x: f64, y: f64) -> bool {
        if self.separation == 0.0 {
            return true;
        }

        let (bx, by) = self.bucket(x, y);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(points) = self.buckets.get(&(bx.saturating_add(dx), by.saturating_add(dy))) else {
                    continue;
                };
                if points.iter().any(|&(px, py)| (px - x).hypot(py - y) < self.separation) {
                    return false;
                }
            }
        }

        self.buckets.entry((bx, by)).or_default().push((x, y));
        true
    }
}

/// Ranking stage
#[derive(Debug, Clone, Default)]
pub struct RankSites;

impl Algorithm for RankSites {
    type Input = (Raster<f64>, Raster<SuitabilityClass>);
    type Output = Ranking;
    type Params = RankParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "RankSites"
    }

    fn description(&self) -> &'static str {
        "Select and order candidate sites by score with greedy minimum-separation suppression"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        rank_sites(&input.0, &input.1, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassThresholds};
    use crate::exec::Execution;
    use crate::EXCLUDED;
    use rainsite_core::RasterGrid;

    fn surface(values: Vec<f64>, rows: usize, cols: usize) -> (Raster<f64>, Raster<SuitabilityClass>) {
        let grid = RasterGrid::new(0.0, 0.0, 1.0, rows, cols).unwrap();
        let mut s = Raster::from_vec(grid, values).unwrap();
        s.set_nodata(Some(f64::NAN));
        let c = classify(&s, &ClassThresholds::default(), &Execution::sequential()).unwrap();
        (s, c)
    }

    fn params(sep: f64, max: Option<usize>) -> RankParams {
        RankParams::new(sep, max, SuitabilityClass::Medium).unwrap()
    }

    #[test]
    fn test_no_separation_orders_by_score() {
        let (s, c) = surface(vec![50.0, 90.0, 10.0, 75.0, 60.0, 45.0], 2, 3);
        let ranking = rank_sites(&s, &c, &params(0.0, None)).unwrap();

        let scores: Vec<f64> = ranking.sites.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![90.0, 75.0, 60.0, 50.0, 45.0]);
        let ranks: Vec<usize> = ranking.sites.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(ranking.candidate_count, 5);
        assert!(ranking.warning.is_none());

        let best = &ranking.sites[0];
        assert_eq!((best.row, best.col, best.id), (0, 1, 1));
        assert_eq!((best.x, best.y), (1.5, 1.5));
        assert_eq!(best.class, SuitabilityClass::High);
    }

    #[test]
    fn test_ties_break_row_major() {
        let (s, c) = surface(vec![80.0, 80.0, 80.0, 80.0], 2, 2);
        let ranking = rank_sites(&s, &c, &params(0.0, None)).unwrap();
        let ids: Vec<usize> = ranking.sites.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_separation_suppresses_neighbours() {
        // Peak at (0, 0); its right neighbour is 1 unit away, the cell two to the right is 2 away
        let (s, c) = surface(vec![99.0, 95.0, 90.0, 85.0], 1, 4);
        let ranking = rank_sites(&s, &c, &params(2.0, None)).unwrap();
        let cols: Vec<usize> = ranking.sites.iter().map(|s| s.col).collect();
        assert_eq!(cols, vec![0, 2]);
        assert_eq!(ranking.sites[1].rank, 2);
    }

    #[test]
    fn test_separation_exact_distance_accepted() {
        let (s, c) = surface(vec![99.0, 95.0], 1, 2);
        assert_eq!(rank_sites(&s, &c, &params(1.0, None)).unwrap().sites.len(), 2);
        assert_eq!(rank_sites(&s, &c, &params(1.0 + 1e-9, None)).unwrap().sites.len(), 1);
    }

    #[test]
    fn test_separation_beyond_diagonal_returns_best() {
        let values: Vec<f64> = (0..25).map(|i| 40.0 + i as f64).collect();
        let (s, c) = surface(values, 5, 5);
        let ranking = rank_sites(&s, &c, &params(1000.0, None)).unwrap();
        assert_eq!(ranking.sites.len(), 1);
        assert_eq!(ranking.sites[0].id, 24);
    }

    #[test]
    fn test_max_sites() {
        let (s, c) = surface(vec![90.0, 80.0, 70.0, 60.0], 2, 2);
        let ranking = rank_sites(&s, &c, &params(0.0, Some(2))).unwrap();
        assert_eq!(ranking.sites.len(), 2);

        let ranking = rank_sites(&s, &c, &params(0.0, Some(0))).unwrap();
        assert!(ranking.sites.is_empty());
        assert!(ranking.warning.is_some());
    }

    #[test]
    fn test_excluded_and_low_never_ranked() {
        let (s, c) = surface(vec![EXCLUDED, 20.0, f64::NAN, 39.0], 2, 2);
        let ranking = rank_sites(&s, &c, &params(0.0, None)).unwrap();
        assert!(ranking.sites.is_empty());
        assert_eq!(
            ranking.warning,
            Some(RankingWarning::EmptyResult {
                min_class: SuitabilityClass::Medium
            })
        );

        let low = RankParams::new(0.0, None, SuitabilityClass::Low).unwrap();
        let ranking = rank_sites(&s, &c, &low).unwrap();
        assert_eq!(ranking.sites.len(), 2);
    }

    #[test]
    fn test_unscored_values_skipped_whatever_the_classes() {
        let (s, _) = surface(vec![EXCLUDED, f64::NAN, 80.0], 1, 3);
        let grid = s.grid().clone();
        let classes = Raster::filled(grid, SuitabilityClass::High);
        let ranking = rank_sites(&s, &classes, &params(0.0, None)).unwrap();
        assert_eq!(ranking.candidate_count, 1);
        assert_eq!(ranking.sites.len(), 1);
        assert_eq!(ranking.sites[0].col, 2);
    }

    #[test]
    fn test_invalid_params() {
        assert!(RankParams::new(-1.0, None, SuitabilityClass::Medium).is_err());
        assert!(RankParams::new(f64::INFINITY, None, SuitabilityClass::Medium).is_err());
        assert!(RankParams::new(1.0, None, SuitabilityClass::Excluded).is_err());
    }

    #[test]
    fn test_misaligned_classes() {
        let (s, _) = surface(vec![90.0; 4], 2, 2);
        let (_, c) = surface(vec![90.0; 6], 2, 3);
        assert!(matches!(
            rank_sites(&s, &c, &RankParams::default()),
            Err(Error::Alignment { stage: "ranking", .. })
        ));
    }

    #[test]
    fn test_algorithm_trait() {
        let (s, c) = surface(vec![90.0, 10.0], 1, 2);
        let ranking = RankSites.execute_default((s, c)).unwrap();
        assert_eq!(ranking.sites.len(), 1);
    }
}

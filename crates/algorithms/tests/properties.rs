//! Properties that must hold for any input, checked over generated surfaces.

use rainsite_algorithms::criteria::presets::{standard_criteria, StructureType, WeightProfile};
use rainsite_algorithms::contains_point;
use rainsite_algorithms::prelude::*;

/// Deterministic pseudo-random values (64-bit LCG)
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

const ROWS: usize = 37;
const COLS: usize = 29;

fn grid() -> RasterGrid {
    RasterGrid::new(350_000.0, 1_800_000.0, 30.0, ROWS, COLS).unwrap()
}

/// Standard layers with some no-data and out-of-range cells mixed in
fn random_layers(seed: u64) -> Vec<CriterionLayer> {
    let mut rng = Lcg(seed);
    let specs: [(&str, f64, f64); 5] = [
        ("slope", 0.0, 60.0),
        ("rainfall", 200.0, 1500.0),
        ("infiltration", 0.0, 20.0),
        ("land_cover", 1.0, 8.0),
        ("road_distance", 0.0, 4000.0),
    ];
    specs
        .iter()
        .map(|&(name, lo, hi)| {
            let values = (0..ROWS * COLS)
                .map(|_| {
                    let roll = rng.next_f64();
                    if roll < 0.02 {
                        f64::NAN
                    } else if roll < 0.03 {
                        -1.0
                    } else if name == "land_cover" {
                        rng.range(lo, hi + 1.0).floor().min(hi)
                    } else {
                        rng.range(lo, hi)
                    }
                })
                .collect();
            CriterionLayer::new(name, Raster::from_vec(grid(), values).unwrap())
        })
        .collect()
}

fn model(exec: Execution, ranking: RankParams) -> SuitabilityModel {
    let set = standard_criteria(WeightProfile::General, StructureType::PercolationTank).unwrap();
    SuitabilityModel::new(set, ClassThresholds::default(), ranking)
        .unwrap()
        .with_execution(exec)
        .unwrap()
}

fn bits(raster: &Raster<f64>) -> Vec<u64> {
    raster.data().iter().map(|v| v.to_bits()).collect()
}

#[test]
fn composite_within_score_range() {
    for seed in 1..6 {
        let run = model(Execution::default(), RankParams::default())
            .run(&random_layers(seed), &[])
            .unwrap();
        for &v in run.suitability.data().iter() {
            assert!(v.is_nan() || is_excluded(v) || (0.0..=100.0).contains(&v), "score {v} out of range");
        }
    }
}

#[test]
fn criterion_order_does_not_matter() {
    let layers = random_layers(7);
    let mut reversed = layers.clone();
    reversed.reverse();
    let mut rotated = layers.clone();
    rotated.rotate_left(2);

    let m = model(Execution::sequential(), RankParams::default());
    let reference = m.run(&layers, &[]).unwrap();
    for variant in [reversed, rotated] {
        let run = m.run(&variant, &[]).unwrap();
        assert_eq!(bits(&reference.suitability), bits(&run.suitability));
        assert_eq!(reference.sites, run.sites);
    }
}

#[test]
fn parallelism_and_tiling_do_not_matter() {
    let layers = random_layers(11);
    let ranking = RankParams::new(90.0, Some(25), SuitabilityClass::Medium).unwrap();
    let reference = model(Execution::sequential(), ranking).run(&layers, &[]).unwrap();

    for exec in [
        Execution::new(ProcessingMode::Parallel, 1),
        Execution::new(ProcessingMode::Parallel, 8),
        Execution::new(ProcessingMode::ParallelWith(3), 5),
        Execution::new(ProcessingMode::Sequential, 1000),
    ] {
        let run = model(exec, ranking).run(&layers, &[]).unwrap();
        assert_eq!(bits(&reference.composite), bits(&run.composite));
        assert_eq!(bits(&reference.suitability), bits(&run.suitability));
        assert_eq!(reference.classes, run.classes);
        assert_eq!(reference.sites, run.sites);
        assert_eq!(reference.diagnostics, run.diagnostics);
    }
}

#[test]
fn exclusion_polygon_forces_excluded_class() {
    let layers = random_layers(3);
    let g = grid();
    let (min_x, min_y, _, _) = g.extent();
    // Triangle over the lower-left part of the grid
    let polygon = ConstraintPolygon::from_ring(vec![
        (min_x, min_y),
        (min_x + 500.0, min_y),
        (min_x, min_y + 500.0),
    ]);

    let run = model(Execution::default(), RankParams::default())
        .run(&layers, &[polygon.clone()])
        .unwrap();

    let mut inside = 0;
    for row in 0..ROWS {
        for col in 0..COLS {
            let (x, y) = g.cell_center(row, col);
            if contains_point(&polygon, x, y) {
                inside += 1;
                assert_eq!(run.classes.get(row, col).unwrap(), SuitabilityClass::Excluded);
                assert!(run.mask.get(row, col).unwrap());
            }
        }
    }
    assert!(inside > 0);
    assert_eq!(run.diagnostics.constrained_cell_count, inside);
    assert!(run.sites.iter().all(|s| !run.mask.get(s.row, s.col).unwrap()));
}

#[test]
fn band_edges_close_the_lower_band() {
    let set = standard_criteria(WeightProfile::General, StructureType::PercolationTank).unwrap();
    let slope = set.get("slope").unwrap();
    assert_eq!(slope.score(10.0), Some(100.0));
    assert_eq!(slope.score(10.000001), Some(50.0));
    assert_eq!(slope.score(30.0), Some(50.0));
    assert_eq!(slope.score(0.0), Some(100.0));

    let rainfall = set.get("rainfall").unwrap();
    assert_eq!(rainfall.score(500.0), Some(10.0));
    assert_eq!(rainfall.score(800.0), Some(50.0));
    assert_eq!(rainfall.score(800.5), Some(100.0));
}

#[test]
fn ranked_sites_respect_separation() {
    let layers = random_layers(19);
    for separation in [30.0, 75.0, 200.0, 600.0] {
        let ranking = RankParams::new(separation, None, SuitabilityClass::Low).unwrap();
        let run = model(Execution::default(), ranking).run(&layers, &[]).unwrap();
        assert!(!run.sites.is_empty());

        for (i, a) in run.sites.iter().enumerate() {
            for b in &run.sites[i + 1..] {
                let d = (a.x - b.x).hypot(a.y - b.y);
                assert!(d >= separation, "sites {} and {} are {d} apart", a.rank, b.rank);
            }
        }
        for pair in run.sites.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            assert_eq!(pair[1].rank, pair[0].rank + 1);
        }
    }
}

#[test]
fn zero_separation_lists_every_candidate_in_order() {
    let layers = random_layers(23);
    let run = model(Execution::default(), RankParams::default()).run(&layers, &[]).unwrap();

    let qualifying = run
        .classes
        .data()
        .iter()
        .filter(|c| **c >= SuitabilityClass::Medium)
        .count();
    assert_eq!(run.sites.len(), qualifying);

    for pair in run.sites.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.score > b.score || (a.score == b.score && a.id < b.id));
    }
}

#[test]
fn separation_beyond_extent_yields_best_cell() {
    let layers = random_layers(29);
    let g = grid();
    let ranking = RankParams::new(g.diagonal() * 2.0, None, SuitabilityClass::Low).unwrap();
    let run = model(Execution::default(), ranking).run(&layers, &[]).unwrap();

    assert_eq!(run.sites.len(), 1);
    let best = run
        .suitability
        .data()
        .iter()
        .filter(|v| !v.is_nan() && !is_excluded(**v))
        .fold(f64::MIN, |acc, v| acc.max(*v));
    assert_eq!(run.sites[0].score, best);
}

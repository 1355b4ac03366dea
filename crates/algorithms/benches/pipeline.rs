//! Benchmarks for the suitability pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rainsite_algorithms::criteria::presets::{standard_criteria, StructureType, WeightProfile};
use rainsite_algorithms::prelude::*;

fn create_layers(size: usize) -> (RasterGrid, Vec<CriterionLayer>) {
    let grid = RasterGrid::new(0.0, 0.0, 30.0, size, size).unwrap();
    let ranges = [
        ("slope", 0.0, 45.0),
        ("rainfall", 300.0, 1200.0),
        ("infiltration", 0.0, 15.0),
        ("land_cover", 1.0, 8.0),
        ("road_distance", 0.0, 3000.0),
    ];

    let layers = ranges
        .iter()
        .enumerate()
        .map(|(k, &(name, lo, hi))| {
            // Varied surface from a cheap hash of the cell position
            let values = (0..size * size)
                .map(|i| {
                    let t = ((i * (7 + 6 * k) + i / size * 13) % 1000) as f64 / 1000.0;
                    if name == "land_cover" {
                        (lo + t * (hi - lo)).round()
                    } else {
                        lo + t * (hi - lo)
                    }
                })
                .collect();
            CriterionLayer::new(name, Raster::from_vec(grid.clone(), values).unwrap())
        })
        .collect();

    (grid, layers)
}

fn model(mode: ProcessingMode) -> SuitabilityModel {
    let set = standard_criteria(WeightProfile::General, StructureType::PercolationTank).unwrap();
    let ranking = RankParams::new(300.0, Some(100), SuitabilityClass::Medium).unwrap();
    SuitabilityModel::new(set, ClassThresholds::default(), ranking)
        .unwrap()
        .with_execution(Execution::new(mode, 256))
        .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for size in [256, 512, 1024].iter() {
        let (grid, layers) = create_layers(*size);
        let (min_x, min_y, max_x, max_y) = grid.extent();
        let reserve = ConstraintPolygon::from_ring(vec![
            (min_x, min_y),
            ((min_x + max_x) / 2.0, min_y),
            (min_x, (min_y + max_y) / 2.0),
        ]);

        for (label, mode) in [("sequential", ProcessingMode::Sequential), ("parallel", ProcessingMode::Parallel)] {
            let m = model(mode);
            group.bench_with_input(BenchmarkId::new(label, size), size, |b, _| {
                b.iter(|| m.run(black_box(&layers), black_box(std::slice::from_ref(&reserve))).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);

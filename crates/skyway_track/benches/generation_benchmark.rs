//! Benchmark for budgeted ribbon generation.
//!
//! TARGET: a 16-opcode frame stays flat however long the run has been going
//!
//! Run with: cargo bench --package skyway_track --bench generation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyway_track::{
    AddonAssets, Budget, Chicane, Curve, GridCreator, Straight, Structure, Terrain, TileBuilder,
    TrackConfig,
};

fn structure(index: usize) -> Box<dyn Structure> {
    match index % 3 {
        0 => Box::new(Straight::new(6)),
        1 => Box::new(Curve::new(4, 0.1)),
        _ => Box::new(Chicane::new(2, 0.15)),
    }
}

fn benchmark_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_frame");

    for budget in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            let mut terrain = Terrain::new(&TrackConfig::production(), AddonAssets::headless()).unwrap();
            let mut structures = 0;
            b.iter(|| {
                if terrain.is_idle() {
                    terrain.enqueue_structure(structure(structures)).unwrap();
                    structures += 1;
                }
                let ran = terrain.generate_chunks(Budget::Ops(budget)).unwrap();
                let player = terrain.stats().tiles_built.saturating_sub(8);
                terrain.remove_old_tiles(player);
                black_box(ran)
            });
        });
    }

    group.finish();
}

fn benchmark_segment_rollback(c: &mut Criterion) {
    c.bench_function("add_segment_then_rollback", |b| {
        let mut builder = TileBuilder::new(&TrackConfig::default()).unwrap();
        for _ in 0..16 {
            builder.add_segment(false).unwrap();
        }
        b.iter(|| {
            builder.add_horizontal_angle(black_box(0.2));
            builder.add_segment(false).unwrap();
            builder.rollback_last().unwrap();
        });
    });
}

fn benchmark_random_fit(c: &mut Criterion) {
    c.bench_function("random_fit_fill_40x3", |b| {
        let mut grid = GridCreator::new(40, 3, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| {
            grid.reset(40, 3, 0);
            while grid.reserve_random_fitting_vertical(4, &mut rng).is_ok() {}
            black_box(grid.occupied_count())
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_frame,
              benchmark_segment_rollback,
              benchmark_random_fit
}

criterion_main!(benches);

//! Benchmarks for the per-frame CPU update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use particle_field::{Connectors, PointCloud, PointerState, SpawnContext};

fn bench_point_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_cloud_update");
    let pointer = PointerState::new(Vec2::new(0.1, -0.3));
    let viewport = Vec2::new(27.3, 15.3);

    for count in [1_500usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut cloud = PointCloud::generate(count, &mut SpawnContext::seeded(1));
            let mut t = 0.0;
            b.iter(|| {
                t += 1.0 / 60.0;
                cloud.update(black_box(t), pointer, viewport);
            })
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    c.bench_function("generate_default_field", |b| {
        b.iter(|| {
            let mut ctx = SpawnContext::seeded(2);
            let cloud = PointCloud::generate(black_box(1500), &mut ctx);
            let lines = Connectors::generate(black_box(100), &mut ctx);
            black_box((cloud, lines))
        })
    });
}

criterion_group!(benches, bench_point_update, bench_generate);
criterion_main!(benches);

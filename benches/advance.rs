use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crowd_steer::{Crowd, CrowdConfig};
use glam::Vec2;

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    for count in [100usize, 1_000, 5_000] {
        let cfg = CrowdConfig { agent_count: count, seed: 3, ..CrowdConfig::default() };
        let mut crowd = Crowd::spawn_seeded(&cfg).expect("valid config");
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| crowd.advance(black_box(Vec2::new(500.0, 500.0)), black_box(1.0 / 60.0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);

//! Criterion benchmarks for sigstat-dtw: scalar cost and path reconstruction.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use sigstat_dtw::{Dtw, Euclidean};

fn make_trajectory(n: usize, phase: f64) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.05 + phase;
            [t.cos() * (1.0 + 0.1 * t), (2.0 * t).sin()]
        })
        .collect()
}

fn bench_distance(c: &mut Criterion) {
    let dtw = Dtw::new(Euclidean);
    let mut group = c.benchmark_group("dtw_distance");

    for &len in &[128usize, 512, 1024] {
        let a = make_trajectory(len, 0.0);
        let b = make_trajectory(len + len / 5, 0.3);
        group.bench_with_input(BenchmarkId::new("euclidean_2d", len), &(a, b), |bencher, (a, b)| {
            bencher.iter(|| dtw.distance(a, b).unwrap());
        });
    }

    group.finish();
}

fn bench_distance_and_path(c: &mut Criterion) {
    let dtw = Dtw::new(Euclidean);
    let a = make_trajectory(512, 0.0);
    let b = make_trajectory(600, 0.3);

    c.bench_function("dtw_distance_and_path_512x600", |bencher| {
        bencher.iter(|| dtw.distance_and_path(&a, &b).unwrap());
    });
}

criterion_group!(benches, bench_distance, bench_distance_and_path);
criterion_main!(benches);

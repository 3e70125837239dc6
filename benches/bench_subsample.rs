use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splatprep::sampling::{morton_codes, morton_subsample, SubsampleParams};
use splatprep::{Colors, PointCloud};

fn random_cloud(n: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(42);
    let x = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let y = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let z = (0..n).map(|_| rng.gen_range(0.0..3.0)).collect();
    let colors = Colors {
        r: (0..n).map(|_| rng.gen()).collect(),
        g: (0..n).map(|_| rng.gen()).collect(),
        b: (0..n).map(|_| rng.gen()).collect(),
    };
    PointCloud::from_xyz(x, y, z).with_colors(colors)
}

fn bench_morton_codes(c: &mut Criterion) {
    let mut group = c.benchmark_group("morton_codes");
    for size in [10_000, 100_000, 1_000_000] {
        let cloud = random_cloud(size);
        group.bench_with_input(BenchmarkId::new("bits10", size), &cloud, |b, cloud| {
            b.iter(|| morton_codes(cloud, 10))
        });
    }
    group.finish();
}

fn bench_subsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("morton_subsample");
    for size in [10_000, 100_000, 1_000_000] {
        let cloud = random_cloud(size);
        let params = SubsampleParams::new(size / 20);
        group.bench_with_input(BenchmarkId::new("5pct", size), &cloud, |b, cloud| {
            b.iter(|| morton_subsample(cloud, &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_morton_codes, bench_subsample);
criterion_main!(benches);

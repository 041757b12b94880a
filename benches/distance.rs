//! Benchmarks for distance computations.
//!
//! Nearest-codeword search is the inner loop of both Lloyd assignment and
//! reconstruction: `O(N * D)` per vector.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use vqpress::distance::{nearest, squared_l2};

// === Generators ===

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random::<u8>()).collect()
}

// === Benchmarks ===

fn bench_squared_l2_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("squared_l2");

    // Pairwise gray/color, 4x4 gray/color, 8x8 color.
    for dim in [2, 6, 16, 48, 192].iter() {
        group.throughput(Throughput::Elements(*dim as u64));

        let a = random_bytes(*dim, 1);
        let b = random_bytes(*dim, 2);

        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |bench, _| {
            bench.iter(|| squared_l2(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_nearest_codebook_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");

    let dim = 48;
    let query = random_bytes(dim, 3);

    for n in [2, 16, 64, 256].iter() {
        group.throughput(Throughput::Elements(*n as u64));

        let codewords = random_bytes(n * dim, 4);

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| nearest(black_box(&query), black_box(&codewords), dim));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_squared_l2_dimensions,
    bench_nearest_codebook_sizes,
);
criterion_main!(benches);

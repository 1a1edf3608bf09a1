//! Criterion benchmark of `sum(a, b)` for the two argument pairs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lablog_bench::{sum, MicroConfig};

/// One benchmark per configured case, named `sum/a,b`.
fn bench_sum(c: &mut Criterion) {
    let cases = MicroConfig::default().cases;
    let mut group = c.benchmark_group("sum");
    for (a, b) in cases {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{a},{b}")),
            &(a, b),
            |bench, &(a, b)| bench.iter(|| sum(black_box(a), black_box(b))),
        );
    }
    group.finish();
}

/// The unguarded loop, for comparison with `sum`.
fn bench_sum_unguarded(c: &mut Criterion) {
    c.bench_function("sum_unguarded", |b| {
        b.iter(|| sum(1, 2));
    });
}

criterion_group!(benches, bench_sum, bench_sum_unguarded);
criterion_main!(benches);

//! Benchmarks for design exploration
//!
//! Run with: cargo bench -p ketra-explore

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use ketra_explore::DesignExplorer;

fn synthetic_options(k: usize) -> BTreeMap<String, f64> {
    (0..k)
        .map(|i| (format!("design-{i:06}"), (i as f64).sin() + i as f64 * 1e-3))
        .collect()
}

/// Benchmark exploration across option-set sizes
fn bench_explore(c: &mut Criterion) {
    let mut group = c.benchmark_group("explore");
    let explorer = DesignExplorer::with_seed(42);

    for k in &[100usize, 1_000, 10_000, 100_000] {
        let options = synthetic_options(*k);
        group.bench_with_input(BenchmarkId::new("options", k), &options, |b, opts| {
            b.iter(|| explorer.explore(black_box(opts)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_explore);
criterion_main!(benches);

//! Benchmarks for statevector gate kernels
//!
//! Run with: cargo bench -p ketra-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use ketra_sim::{Gate, Statevector};

/// Benchmark single- and two-qubit gates across register widths
fn bench_gate_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_application");

    for num_qubits in &[4u32, 10, 16, 20] {
        let top = (*num_qubits - 1) as usize;

        group.bench_with_input(BenchmarkId::new("h", num_qubits), num_qubits, |b, &n| {
            let mut sv = Statevector::new(n).unwrap();
            b.iter(|| sv.apply(black_box(&Gate::H(top))).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("rx", num_qubits), num_qubits, |b, &n| {
            let mut sv = Statevector::new(n).unwrap();
            b.iter(|| sv.apply(black_box(&Gate::Rx(0, 0.25))).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("cx", num_qubits), num_qubits, |b, &n| {
            let mut sv = Statevector::new(n).unwrap();
            sv.apply(&Gate::H(0)).unwrap();
            b.iter(|| sv.apply(black_box(&Gate::cx(0, top))).unwrap());
        });
    }

    group.finish();
}

/// Benchmark measurement sampling
fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");

    for num_qubits in &[4u32, 10, 16] {
        group.bench_with_input(
            BenchmarkId::new("measure", num_qubits),
            num_qubits,
            |b, &n| {
                let mut sv = Statevector::new(n).unwrap();
                for q in 0..n as usize {
                    sv.apply(&Gate::H(q)).unwrap();
                }
                let mut rng = StdRng::seed_from_u64(0);
                b.iter(|| black_box(sv.measure(&mut rng)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_gate_application, bench_sampling);
criterion_main!(benches);

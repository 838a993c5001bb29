//! Benchmarks for the CFR solver.

use std::sync::atomic::AtomicBool;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use egto_solver::solver::{SolveRequest, Solver};

fn aa_vs_kk_request() -> SolveRequest {
    SolveRequest {
        oop_range: "AA".to_string(),
        ip_range: "KK".to_string(),
        pot: 6.0,
        starting_stack: 100.0,
        bet_sizes: vec![1.0],
        seed: Some(42),
        ..Default::default()
    }
}

fn single_iteration_benchmark(c: &mut Criterion) {
    let request = aa_vs_kk_request();
    let mut solver = Solver::new(&request).expect("valid request");
    let cancel = AtomicBool::new(false);

    c.bench_function("aa_vs_kk_single_iteration", |b| {
        b.iter(|| {
            solver.run(black_box(1), 0.0, u64::MAX, &cancel);
            black_box(solver.nodes_count())
        })
    });
}

fn thousand_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("aa_vs_kk_1000_iterations", |b| {
        b.iter(|| {
            let request = aa_vs_kk_request();
            let mut solver = Solver::new(&request).expect("valid request");
            let cancel = AtomicBool::new(false);
            solver.run(black_box(1_000), 0.0, u64::MAX, &cancel)
        })
    });
}

criterion_group!(benches, single_iteration_benchmark, thousand_iterations_benchmark);
criterion_main!(benches);

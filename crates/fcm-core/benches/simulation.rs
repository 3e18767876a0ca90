//! Benchmarks for FCM simulation
//!
//! Tests performance of:
//! - Single propagation step (vector–matrix product)
//! - Full runs to convergence / exhaustion
//! - Lambda sweeps (parallel when the `parallel` feature is on)

#![allow(clippy::expect_used)] // Fine in benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fcm_core::{
	random_state, random_weights, simulate, sweep_lambda, ActivationVector, SimulationConfig,
	TransferFunction, WeightMatrix,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate a reproducible random map of `n` concepts
fn generate_map(n: usize) -> (WeightMatrix, ActivationVector) {
	let mut rng = StdRng::seed_from_u64(n as u64);
	let weights = random_weights(n, 0.3, &mut rng).expect("valid density");
	let state = random_state(n, &mut rng);
	(weights, state)
}

fn bench_propagate(c: &mut Criterion) {
	let mut group = c.benchmark_group("propagate");

	for n in &[5, 13, 50, 200] {
		let (weights, state) = generate_map(*n);

		let _ = group.throughput(Throughput::Elements((*n * *n) as u64));
		let _ = group.bench_with_input(BenchmarkId::new("concepts", n), n, |bench, _| {
			bench.iter(|| weights.propagate(black_box(&state)));
		});
	}

	group.finish();
}

fn bench_simulate(c: &mut Criterion) {
	let mut group = c.benchmark_group("simulate");

	for transfer in [TransferFunction::Sigmoid, TransferFunction::Tanh] {
		for n in &[5, 13, 50, 200] {
			let (weights, state) = generate_map(*n);
			// Fixed-length runs keep the work per iteration comparable
			let config = SimulationConfig {
				transfer,
				max_steps: 100,
				force_full_length: true,
				..Default::default()
			};

			let _ = group.bench_with_input(
				BenchmarkId::new(transfer.name(), n),
				n,
				|bench, _| {
					bench.iter(|| {
						simulate(black_box(&weights), black_box(&state), &config)
							.expect("valid config")
					});
				},
			);
		}
	}

	group.finish();
}

fn bench_sweep(c: &mut Criterion) {
	let mut group = c.benchmark_group("sweep_lambda");

	let lambdas: Vec<f64> = (1..=50).map(|i| f64::from(i) * 0.1).collect();
	for n in &[13, 50] {
		let (weights, state) = generate_map(*n);
		let config = SimulationConfig::default();

		let _ = group.throughput(Throughput::Elements(lambdas.len() as u64));
		let _ = group.bench_with_input(BenchmarkId::new("concepts", n), n, |bench, _| {
			bench.iter(|| {
				sweep_lambda(black_box(&weights), black_box(&state), &config, &lambdas)
					.expect("valid sweep")
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_propagate, bench_simulate, bench_sweep);
criterion_main!(benches);

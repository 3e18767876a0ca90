//! Parameter Sweeps
//!
//! Sensitivity analysis runs the same map under several configurations.
//! Runs share no mutable state, so with the `parallel` feature they are
//! spread across the rayon thread pool.
//!
//! Every configuration is validated before the first run starts, so a
//! sweep either returns all histories or none.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::engine::{simulate, History};
use crate::error::{FcmError, Result};
use crate::matrix::{ActivationVector, WeightMatrix};

/// One run of a lambda sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
	/// Steepness used for this run
	pub lambda: f64,
	/// Resulting time series
	pub history: History,
}

/// Run once per configuration, results in input order.
///
/// # Errors
///
/// Returns the first validation error among `configs`, or
/// `InvalidDimensions` if `initial` does not match `matrix`.
#[instrument(skip_all, fields(runs = configs.len(), concepts = matrix.size()))]
pub fn sweep_configs(
	matrix: &WeightMatrix,
	initial: &ActivationVector,
	configs: &[SimulationConfig],
) -> Result<Vec<History>> {
	if initial.len() != matrix.size() {
		return Err(FcmError::InvalidDimensions {
			context: "initial state",
			expected: matrix.size(),
			found: initial.len(),
		});
	}
	for config in configs {
		config.validate()?;
	}

	#[cfg(feature = "parallel")]
	let histories = configs
		.par_iter()
		.map(|config| simulate(matrix, initial, config))
		.collect::<Result<Vec<_>>>()?;

	#[cfg(not(feature = "parallel"))]
	let histories = configs
		.iter()
		.map(|config| simulate(matrix, initial, config))
		.collect::<Result<Vec<_>>>()?;

	let converged = histories.iter().filter(|h| h.is_converged()).count();
	debug!(converged, "sweep finished");
	Ok(histories)
}

/// Run `base` once per steepness value.
///
/// # Errors
///
/// See [`sweep_configs`]; a non-positive lambda rejects the whole sweep.
pub fn sweep_lambda(
	matrix: &WeightMatrix,
	initial: &ActivationVector,
	base: &SimulationConfig,
	lambdas: &[f64],
) -> Result<Vec<SweepPoint>> {
	let configs: Vec<SimulationConfig> = lambdas.iter().map(|&l| base.with_lambda(l)).collect();
	let histories = sweep_configs(matrix, initial, &configs)?;

	Ok(lambdas
		.iter()
		.zip(histories)
		.map(|(&lambda, history)| SweepPoint { lambda, history })
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transfer::TransferFunction;

	fn matrix() -> WeightMatrix {
		WeightMatrix::from_rows(vec![
			vec![0.0, 0.6, -0.2, 0.0, 0.5],
			vec![0.0, 0.0, 0.4, -0.5, 0.0],
			vec![0.3, 0.0, 0.0, 0.7, 0.8],
			vec![0.0, 0.0, 0.0, 0.0, 0.4],
			vec![0.2, -0.3, 0.0, 0.0, 0.0],
		])
		.unwrap()
	}

	#[test]
	fn test_sweep_matches_sequential() {
		let m = matrix();
		let initial = ActivationVector::new(vec![0.0, 0.0, 1.0, 0.0, 0.0]);
		let base = SimulationConfig::default();
		let lambdas = [0.1, 0.5, 1.0, 2.0, 5.0];

		let points = sweep_lambda(&m, &initial, &base, &lambdas).unwrap();
		assert_eq!(points.len(), lambdas.len());
		for (point, &lambda) in points.iter().zip(&lambdas) {
			assert_eq!(point.lambda, lambda);
			let expected = simulate(&m, &initial, &base.with_lambda(lambda)).unwrap();
			assert_eq!(point.history, expected);
		}
	}

	#[test]
	fn test_sweep_rejects_bad_lambda() {
		let m = matrix();
		let initial = ActivationVector::zeros(5);
		let result = sweep_lambda(&m, &initial, &SimulationConfig::default(), &[1.0, 0.0]);
		assert!(matches!(result, Err(FcmError::InvalidParameter { name: "lambda", .. })));
	}

	#[test]
	fn test_sweep_rejects_dimension_mismatch() {
		let result = sweep_configs(&matrix(), &ActivationVector::zeros(3), &[SimulationConfig::default()]);
		assert!(matches!(result, Err(FcmError::InvalidDimensions { .. })));
	}

	#[test]
	fn test_sweep_mixed_transfers() {
		let m = matrix();
		let initial = ActivationVector::new(vec![0.5; 5]);
		let configs = [
			SimulationConfig::default(),
			SimulationConfig {
				transfer: TransferFunction::Tanh,
				..Default::default()
			},
		];
		let histories = sweep_configs(&m, &initial, &configs).unwrap();
		assert!(histories[0].final_state().iter().all(|&a| a > 0.0));
		assert!(histories[1].states()[1..]
			.iter()
			.all(|s| s.iter().all(|&a| TransferFunction::Tanh.contains(a))));
	}

	#[test]
	fn test_sweep_point_json() {
		let points = sweep_lambda(&matrix(), &ActivationVector::zeros(5), &SimulationConfig::default(), &[1.0]).unwrap();
		let json = serde_json::to_string(&points[0]).unwrap();
		let back: SweepPoint = serde_json::from_str(&json).unwrap();
		assert_eq!(back, points[0]);

		let hollow = r#"{"lambda":1.0,"history":{"states":[],"outcome":{"status":"exhausted"},"convergence_step":null,"final_delta":null}}"#;
		assert!(serde_json::from_str::<SweepPoint>(hollow).is_err());
	}

	#[test]
	fn test_empty_sweep() {
		let points = sweep_lambda(&matrix(), &ActivationVector::zeros(5), &SimulationConfig::default(), &[]).unwrap();
		assert!(points.is_empty());
	}
}

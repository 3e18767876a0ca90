//! Random maps and states for exploration and benchmarking.

use rand::Rng;

use crate::error::{FcmError, Result};
use crate::map::FuzzyCognitiveMap;
use crate::matrix::{ActivationVector, WeightMatrix};

/// Random causal weights.
///
/// The diagonal stays zero. Each off-diagonal entry is non-zero with
/// probability `density`, drawn uniformly from [-1, 1].
///
/// # Errors
///
/// Returns `InvalidDimensions` for `n == 0` and `InvalidParameter` if
/// `density` is outside [0, 1].
pub fn random_weights<R: Rng + ?Sized>(n: usize, density: f64, rng: &mut R) -> Result<WeightMatrix> {
	if !(0.0..=1.0).contains(&density) {
		return Err(FcmError::parameter(
			"density",
			format!("must be in [0, 1], got {density}"),
		));
	}

	let mut matrix = WeightMatrix::zeros(n)?;
	for from in 0..n {
		for to in (0..n).filter(|&to| to != from) {
			if rng.gen_bool(density) {
				matrix.set(from, to, rng.gen_range(-1.0..=1.0))?;
			}
		}
	}
	Ok(matrix)
}

/// Random activations, uniform in [0, 1].
pub fn random_state<R: Rng + ?Sized>(n: usize, rng: &mut R) -> ActivationVector {
	ActivationVector::new((0..n).map(|_| rng.gen::<f64>()).collect())
}

impl FuzzyCognitiveMap {
	/// Random map with concepts named `C1..Cn`.
	///
	/// # Errors
	///
	/// See [`random_weights`].
	pub fn random<R: Rng + ?Sized>(n: usize, density: f64, rng: &mut R) -> Result<Self> {
		let weights = random_weights(n, density, rng)?;
		Self::new((1..=n).map(|i| format!("C{i}")).collect(), weights)
	}
}

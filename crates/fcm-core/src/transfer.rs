//! Transfer Functions
//!
//! Bounded nonlinearities that squash the raw weighted-sum influence
//! into a fixed activation range:
//!
//! - **Sigmoid**: `f(x) = 1 / (1 + e^(-λx))`, codomain (0, 1)
//! - **Tanh**: `f(x) = tanh(λx)`, codomain (-1, 1)
//!
//! `λ` controls steepness: larger values push outputs toward the
//! extremes of the codomain faster.
//!
//! The engine only sees the [`Transfer`] trait, so both built-in
//! functions and any injected `Fn(f64) -> f64` share one loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FcmError;

/// Built-in transfer function selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
	/// Logistic sigmoid, codomain (0, 1)
	#[default]
	Sigmoid,
	/// Hyperbolic tangent, codomain (-1, 1)
	Tanh,
}

impl TransferFunction {
	/// Apply the function with steepness `lambda`.
	#[inline]
	#[must_use]
	pub fn apply(self, x: f64, lambda: f64) -> f64 {
		match self {
			Self::Sigmoid => 1.0 / (1.0 + (-lambda * x).exp()),
			Self::Tanh => (lambda * x).tanh(),
		}
	}

	/// Open interval `(lo, hi)` the function maps into.
	#[must_use]
	pub const fn codomain(self) -> (f64, f64) {
		match self {
			Self::Sigmoid => (0.0, 1.0),
			Self::Tanh => (-1.0, 1.0),
		}
	}

	/// Whether `value` lies strictly inside the codomain.
	#[must_use]
	pub fn contains(self, value: f64) -> bool {
		let (lo, hi) = self.codomain();
		value > lo && value < hi
	}

	/// Fixed output for zero influence (sigmoid → 0.5, tanh → 0.0).
	#[must_use]
	pub fn at_zero(self) -> f64 {
		self.apply(0.0, 1.0)
	}

	/// Lowercase name, as used in JSON and on the command line.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Sigmoid => "sigmoid",
			Self::Tanh => "tanh",
		}
	}
}

impl fmt::Display for TransferFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for TransferFunction {
	type Err = FcmError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sigmoid" | "logistic" => Ok(Self::Sigmoid),
			"tanh" => Ok(Self::Tanh),
			other => Err(FcmError::parameter(
				"transfer",
				format!("expected `sigmoid` or `tanh`, got `{other}`"),
			)),
		}
	}
}

// ============================================================================
// Strategy
// ============================================================================

/// Elementwise transfer applied to the raw influence of each concept.
pub trait Transfer {
	/// Map one raw influence value to an activation.
	fn apply(&self, x: f64) -> f64;

	/// Closed bounds used to clamp the initial state, if known.
	///
	/// Bounds must be finite with `lo <= hi`; otherwise a clamping run is
	/// rejected with `InvalidParameter`.
	fn codomain(&self) -> Option<(f64, f64)> {
		None
	}
}

impl<F> Transfer for F
where
	F: Fn(f64) -> f64,
{
	#[inline]
	fn apply(&self, x: f64) -> f64 {
		self(x)
	}
}

/// A built-in transfer function bound to a steepness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaledTransfer {
	/// Which function
	pub function: TransferFunction,
	/// Steepness `λ`
	pub lambda: f64,
}

impl ScaledTransfer {
	/// Bind `function` to `lambda`.
	pub const fn new(function: TransferFunction, lambda: f64) -> Self {
		Self { function, lambda }
	}
}

impl Transfer for ScaledTransfer {
	#[inline]
	fn apply(&self, x: f64) -> f64 {
		self.function.apply(x, self.lambda)
	}

	fn codomain(&self) -> Option<(f64, f64)> {
		Some(self.function.codomain())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sigmoid_values() {
		let f = TransferFunction::Sigmoid;
		assert!((f.apply(0.0, 1.0) - 0.5).abs() < 1e-12);
		assert!((f.apply(0.8, 1.0) - 0.689_974_481).abs() < 1e-6);
		// Symmetry: σ(-x) = 1 - σ(x)
		assert!((f.apply(-0.8, 1.0) - (1.0 - f.apply(0.8, 1.0))).abs() < 1e-12);
	}

	#[test]
	fn test_tanh_values() {
		let f = TransferFunction::Tanh;
		assert_eq!(f.apply(0.0, 2.0), 0.0);
		assert!((f.apply(0.5, 2.0) - 1.0_f64.tanh()).abs() < 1e-12);
		assert!(f.apply(-0.5, 1.0) < 0.0);
	}

	#[test]
	fn test_lambda_steepness() {
		// Larger λ pushes output toward the extremes
		let f = TransferFunction::Sigmoid;
		assert!(f.apply(0.5, 5.0) > f.apply(0.5, 1.0));
		assert!(f.apply(-0.5, 5.0) < f.apply(-0.5, 1.0));
	}

	#[test]
	fn test_codomain_contains() {
		assert!(TransferFunction::Sigmoid.contains(0.5));
		assert!(!TransferFunction::Sigmoid.contains(0.0));
		assert!(!TransferFunction::Sigmoid.contains(1.0));
		assert!(TransferFunction::Tanh.contains(-0.99));
		assert!(!TransferFunction::Tanh.contains(-1.0));
	}

	#[test]
	fn test_at_zero() {
		assert_eq!(TransferFunction::Sigmoid.at_zero(), 0.5);
		assert_eq!(TransferFunction::Tanh.at_zero(), 0.0);
	}

	#[test]
	fn test_parse_and_display() {
		assert_eq!("Sigmoid".parse::<TransferFunction>().unwrap(), TransferFunction::Sigmoid);
		assert_eq!("tanh".parse::<TransferFunction>().unwrap(), TransferFunction::Tanh);
		assert!("relu".parse::<TransferFunction>().is_err());
		assert_eq!(TransferFunction::Tanh.to_string(), "tanh");
	}

	#[test]
	fn test_serde_lowercase() {
		let json = serde_json::to_string(&TransferFunction::Tanh).unwrap();
		assert_eq!(json, "\"tanh\"");
	}

	#[test]
	fn test_closure_strategy() {
		let step = |x: f64| if x > 0.0 { 1.0 } else { 0.0 };
		assert_eq!(Transfer::apply(&step, 0.3), 1.0);
		assert_eq!(Transfer::codomain(&step), None);

		let scaled = ScaledTransfer::new(TransferFunction::Tanh, 1.0);
		assert_eq!(scaled.codomain(), Some((-1.0, 1.0)));
	}
}

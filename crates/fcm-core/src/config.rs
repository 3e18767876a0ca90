//! Simulation configuration.
//!
//! An immutable value passed into every run. Nothing is read from
//! ambient state.

use serde::{Deserialize, Serialize};

use crate::error::{FcmError, Result};
use crate::transfer::{ScaledTransfer, TransferFunction};

/// Parameters for a single simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// `λ` - transfer-function steepness (> 0, typically 0.1-5.0)
	pub lambda: f64,
	/// Upper bound on propagation iterations (>= 1)
	pub max_steps: usize,
	/// Convergence threshold on the infinity-norm of consecutive states (> 0)
	pub epsilon: f64,
	/// Sigmoid → (0, 1) or tanh → (-1, 1)
	pub transfer: TransferFunction,
	/// Keep iterating after convergence until `max_steps` (fixed-length charts)
	pub force_full_length: bool,
	/// Reject NaN/Inf in the matrix or initial state before running
	pub reject_non_finite: bool,
	/// Clamp step 0 into the transfer codomain instead of storing it verbatim
	pub clamp_initial_state: bool,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			lambda: 1.0,
			max_steps: 50,
			epsilon: 0.001,
			transfer: TransferFunction::Sigmoid,
			force_full_length: false,
			reject_non_finite: false,
			clamp_initial_state: false,
		}
	}
}

impl SimulationConfig {
	/// Validate parameter ranges.
	///
	/// # Errors
	///
	/// Returns `InvalidParameter` for a non-positive or non-finite `lambda`
	/// or `epsilon`, or a zero `max_steps`.
	pub fn validate(&self) -> Result<()> {
		if !(self.lambda > 0.0 && self.lambda.is_finite()) {
			return Err(FcmError::parameter(
				"lambda",
				format!("must be a finite value > 0, got {}", self.lambda),
			));
		}
		if self.max_steps == 0 {
			return Err(FcmError::parameter("max_steps", "must be >= 1, got 0"));
		}
		if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
			return Err(FcmError::parameter(
				"epsilon",
				format!("must be a finite value > 0, got {}", self.epsilon),
			));
		}
		Ok(())
	}

	/// Copy with a different steepness.
	#[must_use]
	pub fn with_lambda(&self, lambda: f64) -> Self {
		Self {
			lambda,
			..self.clone()
		}
	}

	/// The configured transfer function bound to `lambda`.
	pub const fn scaled_transfer(&self) -> ScaledTransfer {
		ScaledTransfer::new(self.transfer, self.lambda)
	}

	/// Load from JSON string. Missing fields take their defaults.
	///
	/// # Errors
	///
	/// Returns `Json` on malformed input and `InvalidParameter` if the
	/// parsed values fail [`validate`](Self::validate).
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rejects(config: &SimulationConfig, param: &str) -> bool {
		matches!(config.validate(), Err(FcmError::InvalidParameter { name, .. }) if name == param)
	}

	#[test]
	fn test_default_is_valid() {
		let config = SimulationConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.max_steps, 50);
		assert!((config.epsilon - 0.001).abs() < f64::EPSILON);
	}

	#[test]
	fn test_rejects_zero_lambda() {
		let config = SimulationConfig {
			lambda: 0.0,
			..Default::default()
		};
		assert!(rejects(&config, "lambda"));
		assert!(rejects(&config.with_lambda(f64::NAN), "lambda"));
		assert!(rejects(&config.with_lambda(f64::INFINITY), "lambda"));
	}

	#[test]
	fn test_rejects_zero_steps() {
		let config = SimulationConfig {
			max_steps: 0,
			..Default::default()
		};
		assert!(rejects(&config, "max_steps"));
	}

	#[test]
	fn test_rejects_negative_epsilon() {
		let config = SimulationConfig {
			epsilon: -1.0,
			..Default::default()
		};
		assert!(rejects(&config, "epsilon"));
	}

	#[test]
	fn test_from_json_partial() {
		let config = SimulationConfig::from_json(r#"{"lambda": 2.5, "transfer": "tanh"}"#).unwrap();
		assert!((config.lambda - 2.5).abs() < f64::EPSILON);
		assert_eq!(config.transfer, TransferFunction::Tanh);
		assert_eq!(config.max_steps, 50);
		assert!(!config.force_full_length);
	}

	#[test]
	fn test_from_json_invalid() {
		assert!(matches!(
			SimulationConfig::from_json(r#"{"max_steps": 0}"#),
			Err(FcmError::InvalidParameter { .. })
		));
		assert!(matches!(
			SimulationConfig::from_json("{not json"),
			Err(FcmError::Json(_))
		));
	}
}

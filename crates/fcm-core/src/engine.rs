//! FCM Simulation Engine
//!
//! Iterates the causal map until the activation vector settles.
//!
//! Per step `t`:
//!
//! 1. `influence[j] = Σ_i A_t[i] × W[i][j]`
//! 2. `A_{t+1}[j] = f(influence[j])`
//! 3. `δ = max_j |A_{t+1}[j] - A_t[j]|`
//!
//! The run stops once `δ < ε` (converged) or after `max_steps`
//! iterations (exhausted). With `force_full_length` it keeps going to
//! `max_steps` and only records where convergence first happened.
//!
//! Runs are pure: inputs are borrowed immutably, nothing is logged,
//! and identical inputs give an identical [`History`].

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{FcmError, Result};
use crate::matrix::{ActivationVector, WeightMatrix};
use crate::transfer::{ScaledTransfer, Transfer};

/// Upper bound on history slots reserved up front.
const PREALLOCATED_STEPS: usize = 1024;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
	/// `δ < ε` was reached at `step`
	Converged {
		/// First step whose delta fell below epsilon
		step: usize,
	},
	/// `max_steps` iterations without convergence
	Exhausted,
	/// Caller stopped a step-wise run before it finished
	Stopped,
}

/// Time series of activation vectors produced by one run.
///
/// `states()[0]` is the initial state; every later entry is one
/// propagation step.
///
/// Deserialization rejects an empty state list and an outcome that
/// disagrees with the recorded convergence step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistoryRecord")]
pub struct History {
	states: Vec<ActivationVector>,
	outcome: Outcome,
	convergence_step: Option<usize>,
	final_delta: Option<f64>,
}

#[derive(Deserialize)]
struct HistoryRecord {
	states: Vec<ActivationVector>,
	outcome: Outcome,
	convergence_step: Option<usize>,
	final_delta: Option<f64>,
}

impl TryFrom<HistoryRecord> for History {
	type Error = FcmError;

	fn try_from(record: HistoryRecord) -> Result<Self> {
		if record.states.is_empty() {
			return Err(FcmError::InvalidDimensions {
				context: "history states (at least the initial state)",
				expected: 1,
				found: 0,
			});
		}
		let last_step = record.states.len() - 1;
		if let Some(step) = record.convergence_step {
			if step == 0 || step > last_step {
				return Err(FcmError::parameter(
					"convergence_step",
					format!("must be in 1..={last_step}, got {step}"),
				));
			}
		}
		if let Outcome::Converged { step } = record.outcome {
			if record.convergence_step != Some(step) {
				return Err(FcmError::parameter(
					"outcome",
					format!(
						"converged at step {step} but convergence_step is {:?}",
						record.convergence_step
					),
				));
			}
		}

		Ok(Self {
			states: record.states,
			outcome: record.outcome,
			convergence_step: record.convergence_step,
			final_delta: record.final_delta,
		})
	}
}

impl History {
	/// All states, step 0 first.
	pub fn states(&self) -> &[ActivationVector] {
		&self.states
	}

	/// Number of stored states (iterations + 1).
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Always false: the initial state is always stored.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Step 0.
	pub fn initial(&self) -> &ActivationVector {
		&self.states[0]
	}

	/// Terminal state.
	pub fn final_state(&self) -> &ActivationVector {
		&self.states[self.states.len() - 1]
	}

	/// How the run ended.
	pub const fn outcome(&self) -> Outcome {
		self.outcome
	}

	/// Whether convergence was detected.
	pub const fn is_converged(&self) -> bool {
		self.convergence_step.is_some()
	}

	/// First step at which `δ < ε`, even when the run continued past it.
	pub const fn convergence_step(&self) -> Option<usize> {
		self.convergence_step
	}

	/// Number of propagation iterations executed.
	pub fn iterations(&self) -> usize {
		self.states.len() - 1
	}

	/// Delta of the last executed step (`None` if no step ran).
	pub const fn final_delta(&self) -> Option<f64> {
		self.final_delta
	}

	/// Activation of one concept across all steps.
	pub fn series(&self, concept: usize) -> Option<Vec<f64>> {
		self.states.iter().map(|state| state.get(concept).copied()).collect()
	}

	/// Unwrap into the raw state list.
	#[must_use]
	pub fn into_states(self) -> Vec<ActivationVector> {
		self.states
	}
}

// ============================================================================
// Step-wise Driver
// ============================================================================

/// A run in progress.
///
/// Use this instead of [`simulate`] when the caller needs to observe or
/// stop a run between steps.
#[derive(Debug)]
pub struct Simulation<'a, T: Transfer = ScaledTransfer> {
	matrix: &'a WeightMatrix,
	transfer: T,
	epsilon: f64,
	max_steps: usize,
	force_full_length: bool,
	states: Vec<ActivationVector>,
	influence: Vec<f64>,
	convergence_step: Option<usize>,
	last_delta: Option<f64>,
	finished: bool,
}

impl<'a> Simulation<'a> {
	/// Start a run with the configured transfer function.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if `initial.len() != matrix.size()`,
	/// `InvalidParameter` if the config fails validation, and
	/// `NonFiniteInput` if non-finite rejection is enabled and an input
	/// holds NaN or infinity.
	pub fn new(
		matrix: &'a WeightMatrix,
		initial: &ActivationVector,
		config: &SimulationConfig,
	) -> Result<Self> {
		Self::with_transfer(matrix, initial, config, config.scaled_transfer())
	}
}

impl<'a, T: Transfer> Simulation<'a, T> {
	/// Start a run with an injected transfer function.
	///
	/// `transfer` receives the raw influence; `config.transfer` and
	/// `config.lambda` are not applied, though `lambda` is still validated.
	///
	/// # Errors
	///
	/// Same as [`Simulation::new`], plus `InvalidParameter` when
	/// `clamp_initial_state` is set and `transfer` reports non-finite or
	/// inverted codomain bounds.
	pub fn with_transfer(
		matrix: &'a WeightMatrix,
		initial: &ActivationVector,
		config: &SimulationConfig,
		transfer: T,
	) -> Result<Self> {
		validate_inputs(matrix, initial, config)?;

		let start = match (config.clamp_initial_state, transfer.codomain()) {
			(true, Some((lo, hi))) => {
				if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
					return Err(FcmError::parameter(
						"codomain",
						format!("bounds must be finite with lo <= hi, got ({lo}, {hi})"),
					));
				}
				initial.clamped(lo, hi)
			}
			_ => initial.clone(),
		};

		let mut states = Vec::with_capacity(config.max_steps.min(PREALLOCATED_STEPS) + 1);
		states.push(start);

		Ok(Self {
			matrix,
			transfer,
			epsilon: config.epsilon,
			max_steps: config.max_steps,
			force_full_length: config.force_full_length,
			states,
			influence: vec![0.0; matrix.size()],
			convergence_step: None,
			last_delta: None,
			finished: false,
		})
	}

	/// Execute one propagation step.
	///
	/// Returns the new state, or `None` once the run has finished.
	pub fn step(&mut self) -> Option<&ActivationVector> {
		if self.finished {
			return None;
		}

		let current = self.states.last()?;
		self.matrix.propagate_into(current, &mut self.influence);
		let next = ActivationVector::new(
			self.influence
				.iter()
				.map(|&x| self.transfer.apply(x))
				.collect(),
		);
		let delta = next.max_abs_diff(current);

		self.states.push(next);
		let step = self.states.len() - 1;
		self.last_delta = Some(delta);

		if delta < self.epsilon && self.convergence_step.is_none() {
			self.convergence_step = Some(step);
			if !self.force_full_length {
				self.finished = true;
			}
		}
		if step >= self.max_steps {
			self.finished = true;
		}

		self.states.last()
	}

	/// Whether the run reached a terminal state.
	pub const fn is_finished(&self) -> bool {
		self.finished
	}

	/// Most recent state.
	pub fn state(&self) -> &ActivationVector {
		&self.states[self.states.len() - 1]
	}

	/// Iterations executed so far.
	pub fn steps_taken(&self) -> usize {
		self.states.len() - 1
	}

	/// Drive the run to completion.
	#[must_use]
	pub fn run(mut self) -> History {
		while self.step().is_some() {}
		self.into_history()
	}

	/// Stop now and return what has been computed.
	///
	/// An unfinished run reports [`Outcome::Stopped`].
	#[must_use]
	pub fn into_history(self) -> History {
		let outcome = match (self.finished, self.convergence_step) {
			(false, _) => Outcome::Stopped,
			(true, Some(step)) => Outcome::Converged { step },
			(true, None) => Outcome::Exhausted,
		};

		History {
			states: self.states,
			outcome,
			convergence_step: self.convergence_step,
			final_delta: self.last_delta,
		}
	}
}

fn validate_inputs(
	matrix: &WeightMatrix,
	initial: &ActivationVector,
	config: &SimulationConfig,
) -> Result<()> {
	if initial.len() != matrix.size() {
		return Err(FcmError::InvalidDimensions {
			context: "initial state",
			expected: matrix.size(),
			found: initial.len(),
		});
	}

	config.validate()?;

	if config.reject_non_finite {
		if let Some(index) = matrix.first_non_finite() {
			return Err(FcmError::NonFiniteInput {
				context: "weight matrix",
				index,
			});
		}
		if let Some(index) = initial.first_non_finite() {
			return Err(FcmError::NonFiniteInput {
				context: "initial state",
				index,
			});
		}
	}

	Ok(())
}

// ============================================================================
// One-shot Runs
// ============================================================================

/// Run a simulation to convergence or step budget exhaustion.
///
/// # Arguments
///
/// * `matrix` - N×N causal weights, `W[i][j]` = influence of `i` on `j`
/// * `initial` - Length-N starting activations, stored verbatim as step 0
/// * `config` - Steepness, step budget, threshold and transfer function
///
/// # Returns
///
/// The full history. Its length is `min(max_steps, convergence_step) + 1`,
/// or `max_steps + 1` with `force_full_length`.
///
/// # Errors
///
/// See [`Simulation::new`]. Errors are raised before any step runs.
pub fn simulate(
	matrix: &WeightMatrix,
	initial: &ActivationVector,
	config: &SimulationConfig,
) -> Result<History> {
	Ok(Simulation::new(matrix, initial, config)?.run())
}

/// Run a simulation with an injected transfer function.
///
/// # Errors
///
/// See [`Simulation::with_transfer`].
pub fn simulate_with<T: Transfer>(
	matrix: &WeightMatrix,
	initial: &ActivationVector,
	config: &SimulationConfig,
	transfer: T,
) -> Result<History> {
	Ok(Simulation::with_transfer(matrix, initial, config, transfer)?.run())
}

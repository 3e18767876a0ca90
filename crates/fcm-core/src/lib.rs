//! # FCM Core
//!
//! Simulation engine for Fuzzy Cognitive Maps.
//!
//! ## What is a Fuzzy Cognitive Map?
//!
//! A small directed, weighted graph of *concepts*. Each concept carries an
//! activation level, and each edge a signed causal weight in [-1, 1]:
//!
//! - **Positive weight** - the source pushes the target up
//! - **Negative weight** - the source pushes the target down
//! - **Zero** - no causal link
//!
//! Activations evolve in discrete steps until they settle.
//!
//! ## Core Concepts
//!
//! ### Propagation
//!
//! Each concept's next raw input is the weighted sum of every concept
//! currently influencing it:
//!
//! ```text
//! influence_j = Σ_i A_i × W_ij
//! ```
//!
//! ### Transfer
//!
//! The raw input is squashed into a bounded range:
//!
//! ```text
//! sigmoid:  A_j = 1 / (1 + e^(-λ × influence_j))    ∈ (0, 1)
//! tanh:     A_j = tanh(λ × influence_j)             ∈ (-1, 1)
//! ```
//!
//! ### Convergence
//!
//! The run stops once the largest per-concept change between two steps
//! drops below `ε`, or after `max_steps` iterations.
//!
//! ## Example
//!
//! ```rust
//! use fcm_core::{simulate, ActivationVector, SimulationConfig, WeightMatrix};
//!
//! // Concept 0 excites concept 1
//! let weights = WeightMatrix::from_rows(vec![
//!     vec![0.0, 0.8],
//!     vec![0.0, 0.0],
//! ])?;
//! let initial = ActivationVector::new(vec![1.0, 0.0]);
//!
//! let history = simulate(&weights, &initial, &SimulationConfig::default())?;
//!
//! for (step, state) in history.states().iter().enumerate() {
//!     println!("step {step}: {:?}", state.as_slice());
//! }
//! assert_eq!(history.convergence_step(), Some(3));
//! # Ok::<(), fcm_core::FcmError>(())
//! ```
//!
//! ## References
//!
//! - Kosko, B. (1986). *Fuzzy cognitive maps* - International Journal of
//!   Man-Machine Studies
//! - Stylios, C. D. & Groumpos, P. P. (2004). *Modeling complex systems using
//!   fuzzy cognitive maps*

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod map;
pub mod matrix;
pub mod random;
pub mod sweep;
pub mod transfer;

pub use config::SimulationConfig;
pub use engine::{simulate, simulate_with, History, Outcome, Simulation};
pub use error::{FcmError, Result};
pub use map::{ConceptSummary, FuzzyCognitiveMap};
pub use matrix::{ActivationVector, WeightMatrix};
pub use random::{random_state, random_weights};
pub use sweep::{sweep_configs, sweep_lambda, SweepPoint};
pub use transfer::{ScaledTransfer, Transfer, TransferFunction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_basic_simulation() {
		let map = FuzzyCognitiveMap::new(
			vec!["Meetings".into(), "Trust".into(), "Volume".into()],
			WeightMatrix::from_rows(vec![
				vec![0.0, 0.8, 0.7],
				vec![0.0, 0.0, 0.4],
				vec![0.0, 0.0, 0.0],
			])
			.unwrap(),
		)
		.unwrap();

		let initial = map.initial_state(&[("Meetings", 1.0)]).unwrap();
		let history = map.simulate(&initial, &SimulationConfig::default()).unwrap();

		assert!(history.is_converged());
		let summary = map.summarize(&history).unwrap();
		// Volume receives influence from both other concepts
		assert!(summary[2].final_value > summary[1].final_value);
	}
}

//! Concept Maps
//!
//! A labeled weight matrix: concept names in the same order as the
//! matrix rows/columns. This is the form maps are edited, stored and
//! reported in; the engine itself only ever sees the bare matrix.
//!
//! JSON shape:
//!
//! ```json
//! { "concepts": ["C1", "C2"], "weights": [[0.0, 0.8], [0.0, 0.0]] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SimulationConfig;
use crate::engine::{simulate, History};
use crate::error::{FcmError, Result};
use crate::matrix::{ActivationVector, WeightMatrix};

/// Named concepts plus their causal weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MapRecord")]
pub struct FuzzyCognitiveMap {
	concepts: Vec<String>,
	weights: WeightMatrix,
}

#[derive(Deserialize)]
struct MapRecord {
	concepts: Vec<String>,
	weights: WeightMatrix,
}

impl TryFrom<MapRecord> for FuzzyCognitiveMap {
	type Error = FcmError;

	fn try_from(record: MapRecord) -> Result<Self> {
		Self::new(record.concepts, record.weights)
	}
}

/// One row of the initial-vs-final summary table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptSummary {
	/// Concept name
	pub name: String,
	/// Activation at step 0
	pub initial: f64,
	/// Activation at the terminal step
	pub final_value: f64,
	/// `final_value - initial`
	pub change: f64,
}

impl FuzzyCognitiveMap {
	/// Pair concept names with a weight matrix.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if the name count differs from the
	/// matrix size and `DuplicateConcept` if a name repeats.
	pub fn new(concepts: Vec<String>, weights: WeightMatrix) -> Result<Self> {
		if concepts.len() != weights.size() {
			return Err(FcmError::InvalidDimensions {
				context: "concept names",
				expected: weights.size(),
				found: concepts.len(),
			});
		}
		for (i, name) in concepts.iter().enumerate() {
			if concepts[..i].contains(name) {
				return Err(FcmError::DuplicateConcept(name.clone()));
			}
		}
		Ok(Self { concepts, weights })
	}

	/// Concepts with no causal links yet.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` for an empty name list and
	/// `DuplicateConcept` if a name repeats.
	pub fn with_concepts<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
		let concepts: Vec<String> = names.into_iter().map(Into::into).collect();
		let weights = WeightMatrix::zeros(concepts.len())?;
		Self::new(concepts, weights)
	}

	/// Number of concepts.
	pub fn len(&self) -> usize {
		self.concepts.len()
	}

	/// Always false: a map holds at least one concept.
	pub fn is_empty(&self) -> bool {
		self.concepts.is_empty()
	}

	/// Concept names in matrix order.
	pub fn concepts(&self) -> &[String] {
		&self.concepts
	}

	/// Causal weights.
	pub const fn weights(&self) -> &WeightMatrix {
		&self.weights
	}

	/// Mutable weights (size is fixed; use [`add_concept`](Self::add_concept) to grow).
	pub fn weights_mut(&mut self) -> &mut WeightMatrix {
		&mut self.weights
	}

	/// Position of a concept in matrix order.
	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.concepts.iter().position(|c| c == name)
	}

	fn require(&self, name: &str) -> Result<usize> {
		self.index_of(name)
			.ok_or_else(|| FcmError::UnknownConcept(name.to_string()))
	}

	/// Weight of `from → to`.
	///
	/// # Errors
	///
	/// Returns `UnknownConcept` if either name is missing.
	pub fn weight(&self, from: &str, to: &str) -> Result<f64> {
		let (i, j) = (self.require(from)?, self.require(to)?);
		Ok(self.weights.get(i, j).unwrap_or_default())
	}

	/// Set the weight of `from → to`.
	///
	/// # Errors
	///
	/// Returns `UnknownConcept` if either name is missing.
	pub fn set_weight(&mut self, from: &str, to: &str, value: f64) -> Result<()> {
		let (i, j) = (self.require(from)?, self.require(to)?);
		self.weights.set(i, j, value)
	}

	/// Append a concept with no links. Returns its index.
	///
	/// # Errors
	///
	/// Returns `DuplicateConcept` if the name exists.
	pub fn add_concept(&mut self, name: impl Into<String>) -> Result<usize> {
		let name = name.into();
		if self.index_of(&name).is_some() {
			return Err(FcmError::DuplicateConcept(name));
		}

		let old = self.weights.size();
		let size = old + 1;
		let mut values = vec![0.0; size * size];
		for (i, row) in self.weights.rows().enumerate() {
			values[i * size..i * size + old].copy_from_slice(row);
		}

		self.weights = WeightMatrix::from_row_major(size, values)?;
		self.concepts.push(name);
		Ok(old)
	}

	/// Drop a concept and all links to or from it.
	///
	/// # Errors
	///
	/// Returns `UnknownConcept` if missing and `InvalidDimensions` when
	/// removing the last concept.
	pub fn remove_concept(&mut self, name: &str) -> Result<()> {
		let idx = self.require(name)?;
		if self.len() == 1 {
			return Err(FcmError::InvalidDimensions {
				context: "concept map (at least one concept)",
				expected: 1,
				found: 0,
			});
		}

		let values: Vec<f64> = self
			.weights
			.rows()
			.enumerate()
			.filter(|&(i, _)| i != idx)
			.flat_map(|(_, row)| {
				row.iter()
					.enumerate()
					.filter(move |&(j, _)| j != idx)
					.map(|(_, &w)| w)
			})
			.collect();

		self.weights = WeightMatrix::from_row_major(self.len() - 1, values)?;
		let _ = self.concepts.remove(idx);
		Ok(())
	}

	/// Re-order concepts; the matrix is permuted to match.
	///
	/// # Errors
	///
	/// Returns `UnknownConcept` for a missing name, and
	/// `InvalidDimensions`/`InvalidParameter` if `order` is not a
	/// permutation of the current names.
	pub fn reorder(&mut self, order: &[&str]) -> Result<()> {
		let indices = order
			.iter()
			.map(|name| self.require(name))
			.collect::<Result<Vec<_>>>()?;
		self.weights = self.weights.permuted(&indices)?;
		self.concepts = indices.iter().map(|&i| self.concepts[i].clone()).collect();
		Ok(())
	}

	/// Initial state: zero everywhere except the named concepts.
	///
	/// # Errors
	///
	/// Returns `UnknownConcept` if a name is missing.
	pub fn initial_state(&self, values: &[(&str, f64)]) -> Result<ActivationVector> {
		let mut state = vec![0.0; self.len()];
		for &(name, value) in values {
			state[self.require(name)?] = value;
		}
		Ok(ActivationVector::new(state))
	}

	/// Run the engine on this map.
	///
	/// # Errors
	///
	/// See [`simulate`].
	pub fn simulate(&self, initial: &ActivationVector, config: &SimulationConfig) -> Result<History> {
		simulate(&self.weights, initial, config)
	}

	/// Initial vs final activation per concept.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if the history belongs to a map of a
	/// different size.
	pub fn summarize(&self, history: &History) -> Result<Vec<ConceptSummary>> {
		let (initial, last) = (history.initial(), history.final_state());
		for state in [initial, last] {
			if state.len() != self.len() {
				return Err(FcmError::InvalidDimensions {
					context: "history state",
					expected: self.len(),
					found: state.len(),
				});
			}
		}

		Ok(self
			.concepts
			.iter()
			.zip(initial.iter().zip(last.iter()))
			.map(|(name, (&initial, &final_value))| ConceptSummary {
				name: name.clone(),
				initial,
				final_value,
				change: final_value - initial,
			})
			.collect())
	}

	/// Parse from JSON.
	///
	/// # Errors
	///
	/// Returns `Json` for malformed input, including size mismatches and
	/// duplicate names.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Pretty-printed JSON.
	///
	/// # Errors
	///
	/// Returns `Json` if serialization fails.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Read a map file.
	///
	/// # Errors
	///
	/// Returns `Io` if the file cannot be read and `Json` if it does not parse.
	#[instrument(skip_all, fields(path = %path.as_ref().display()))]
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let json = fs::read_to_string(path.as_ref())?;
		let map = Self::from_json(&json)?;
		debug!(concepts = map.len(), "loaded concept map");
		Ok(map)
	}

	/// Write a map file.
	///
	/// # Errors
	///
	/// Returns `Io` if the file cannot be written.
	#[instrument(skip_all, fields(path = %path.as_ref().display()))]
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		fs::write(path.as_ref(), self.to_json()?)?;
		debug!(concepts = self.len(), "saved concept map");
		Ok(())
	}
}

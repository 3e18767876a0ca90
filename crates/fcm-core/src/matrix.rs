//! Weight Matrix and Activation Vector
//!
//! The two strongly typed containers the engine works on.
//!
//! `W[i][j]` is the signed causal influence concept `i` exerts on
//! concept `j`. One propagation step is the vector–matrix product:
//!
//! `influence[j] = Σ_i A[i] × W[i][j]`
//!
//! Row order, column order and vector order all follow the concept list.

use std::ops::{Deref, Index};

use serde::{Deserialize, Serialize};

use crate::error::{FcmError, Result};

// ============================================================================
// Weight Matrix
// ============================================================================

/// Square N×N causal weight matrix, stored row-major.
///
/// Serialized as an array of rows. Ragged or non-square input is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct WeightMatrix {
	size: usize,
	values: Vec<f64>,
}

impl WeightMatrix {
	/// Create an all-zero N×N matrix.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if `size` is zero.
	pub fn zeros(size: usize) -> Result<Self> {
		if size == 0 {
			return Err(FcmError::InvalidDimensions {
				context: "weight matrix (at least one concept)",
				expected: 1,
				found: 0,
			});
		}
		Ok(Self {
			size,
			values: vec![0.0; size * size],
		})
	}

	/// Build a matrix from nested rows.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if there are no rows or any row length
	/// differs from the number of rows.
	pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
		let size = rows.len();
		let mut matrix = Self::zeros(size)?;
		for (i, row) in rows.into_iter().enumerate() {
			if row.len() != size {
				return Err(FcmError::InvalidDimensions {
					context: "weight matrix row",
					expected: size,
					found: row.len(),
				});
			}
			matrix.values[i * size..(i + 1) * size].copy_from_slice(&row);
		}
		Ok(matrix)
	}

	/// Build a matrix from a flat row-major buffer.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if `values.len() != size * size` or `size` is zero.
	pub fn from_row_major(size: usize, values: Vec<f64>) -> Result<Self> {
		let _ = Self::zeros(size)?;
		if values.len() != size * size {
			return Err(FcmError::InvalidDimensions {
				context: "row-major weight buffer",
				expected: size * size,
				found: values.len(),
			});
		}
		Ok(Self { size, values })
	}

	/// Number of concepts (rows = columns).
	#[inline]
	pub const fn size(&self) -> usize {
		self.size
	}

	/// Weight from concept `from` to concept `to`.
	#[inline]
	pub fn get(&self, from: usize, to: usize) -> Option<f64> {
		if from < self.size && to < self.size {
			Some(self.values[from * self.size + to])
		} else {
			None
		}
	}

	/// Set the weight from concept `from` to concept `to`.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if either index is out of range.
	pub fn set(&mut self, from: usize, to: usize, value: f64) -> Result<()> {
		let found = from.max(to);
		if found >= self.size {
			return Err(FcmError::InvalidDimensions {
				context: "matrix index (exclusive bound)",
				expected: self.size,
				found,
			});
		}
		self.values[from * self.size + to] = value;
		Ok(())
	}

	/// Outgoing weights of one concept.
	pub fn row(&self, from: usize) -> Option<&[f64]> {
		(from < self.size).then(|| &self.values[from * self.size..(from + 1) * self.size])
	}

	/// Iterate rows in concept order.
	pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
		self.values.chunks_exact(self.size)
	}

	/// Copy out as nested rows.
	#[must_use]
	pub fn to_rows(&self) -> Vec<Vec<f64>> {
		self.rows().map(<[f64]>::to_vec).collect()
	}

	/// Flat row-major view.
	pub fn as_slice(&self) -> &[f64] {
		&self.values
	}

	/// Remove self-loops.
	pub fn zero_diagonal(&mut self) {
		for i in 0..self.size {
			self.values[i * self.size + i] = 0.0;
		}
	}

	/// Re-order concepts: row/column `i` of the result is row/column `order[i]` of `self`.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if `order` has the wrong length and
	/// `InvalidParameter` if it is not a permutation of `0..size`.
	pub fn permuted(&self, order: &[usize]) -> Result<Self> {
		if order.len() != self.size {
			return Err(FcmError::InvalidDimensions {
				context: "concept order",
				expected: self.size,
				found: order.len(),
			});
		}
		let mut seen = vec![false; self.size];
		for &idx in order {
			if idx >= self.size || std::mem::replace(&mut seen[idx], true) {
				return Err(FcmError::parameter(
					"order",
					format!("not a permutation of 0..{}", self.size),
				));
			}
		}

		let mut values = Vec::with_capacity(self.values.len());
		for &from in order {
			let row = &self.values[from * self.size..(from + 1) * self.size];
			values.extend(order.iter().map(|&to| row[to]));
		}
		Ok(Self {
			size: self.size,
			values,
		})
	}

	/// Flat index of the first NaN or infinite weight.
	pub fn first_non_finite(&self) -> Option<usize> {
		self.values.iter().position(|w| !w.is_finite())
	}

	/// Aggregate causal influence: `influence[j] = Σ_i state[i] × W[i][j]`.
	///
	/// Callers guarantee `state.len() == self.size()`.
	#[must_use]
	pub fn propagate(&self, state: &[f64]) -> Vec<f64> {
		let mut influence = vec![0.0; self.size];
		self.propagate_into(state, &mut influence);
		influence
	}

	pub(crate) fn propagate_into(&self, state: &[f64], influence: &mut [f64]) {
		debug_assert_eq!(state.len(), self.size);
		debug_assert_eq!(influence.len(), self.size);

		influence.fill(0.0);
		for (&source, row) in state.iter().zip(self.rows()) {
			for (acc, &weight) in influence.iter_mut().zip(row) {
				*acc = source.mul_add(weight, *acc);
			}
		}
	}
}

impl TryFrom<Vec<Vec<f64>>> for WeightMatrix {
	type Error = FcmError;

	fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
		Self::from_rows(rows)
	}
}

impl From<WeightMatrix> for Vec<Vec<f64>> {
	fn from(matrix: WeightMatrix) -> Self {
		matrix.to_rows()
	}
}

// ============================================================================
// Activation Vector
// ============================================================================

/// Activation level of every concept, in concept order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationVector(Vec<f64>);

impl ActivationVector {
	/// Wrap raw activation values.
	pub const fn new(values: Vec<f64>) -> Self {
		Self(values)
	}

	/// All-zero vector of length `len`.
	#[must_use]
	pub fn zeros(len: usize) -> Self {
		Self(vec![0.0; len])
	}

	/// Raw values.
	pub fn as_slice(&self) -> &[f64] {
		&self.0
	}

	/// Unwrap into the underlying buffer.
	#[must_use]
	pub fn into_inner(self) -> Vec<f64> {
		self.0
	}

	/// Infinity-norm of the difference: `max_j |a[j] - b[j]|`.
	///
	/// NaN anywhere yields NaN, so a poisoned state never looks converged.
	/// Extra elements of the longer vector are ignored.
	#[must_use]
	pub fn max_abs_diff(&self, other: &Self) -> f64 {
		self.0
			.iter()
			.zip(&other.0)
			.map(|(a, b)| (a - b).abs())
			.fold(0.0, |acc: f64, d| if d > acc || d.is_nan() { d } else { acc })
	}

	/// Copy with every value clamped into `[lo, hi]`.
	#[must_use]
	pub fn clamped(&self, lo: f64, hi: f64) -> Self {
		Self(self.0.iter().map(|v| v.clamp(lo, hi)).collect())
	}

	/// Index of the first NaN or infinite value.
	pub fn first_non_finite(&self) -> Option<usize> {
		self.0.iter().position(|v| !v.is_finite())
	}
}

impl From<Vec<f64>> for ActivationVector {
	fn from(values: Vec<f64>) -> Self {
		Self(values)
	}
}

impl From<&[f64]> for ActivationVector {
	fn from(values: &[f64]) -> Self {
		Self(values.to_vec())
	}
}

impl Deref for ActivationVector {
	type Target = [f64];

	fn deref(&self) -> &[f64] {
		&self.0
	}
}

impl Index<usize> for ActivationVector {
	type Output = f64;

	fn index(&self, index: usize) -> &f64 {
		&self.0[index]
	}
}

//! Error types for map construction and simulation.

/// Errors that can occur while building a map or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum FcmError {
	/// Matrix and activation vector sizes disagree, or a matrix is not square.
	#[error("Invalid dimensions for {context}: expected {expected}, found {found}")]
	InvalidDimensions {
		/// What was being checked
		context: &'static str,
		/// Size required
		expected: usize,
		/// Size supplied
		found: usize,
	},

	/// A simulation parameter is outside its valid range.
	#[error("Invalid parameter `{name}`: {message}")]
	InvalidParameter {
		/// Parameter name
		name: &'static str,
		/// Why the value was rejected
		message: String,
	},

	/// NaN or infinity in the input (only raised when non-finite rejection is enabled).
	#[error("Non-finite value in {context} at index {index}")]
	NonFiniteInput {
		/// Which input held the value
		context: &'static str,
		/// Flat index of the offending value
		index: usize,
	},

	/// Concept name not present in the map.
	#[error("Unknown concept: {0}")]
	UnknownConcept(String),

	/// Concept name already present in the map.
	#[error("Duplicate concept: {0}")]
	DuplicateConcept(String),

	/// JSON (de)serialization failed.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl FcmError {
	pub(crate) fn parameter(name: &'static str, message: impl Into<String>) -> Self {
		Self::InvalidParameter {
			name,
			message: message.into(),
		}
	}

	/// Check if this is one of the validation errors raised before a run starts.
	#[must_use]
	pub const fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			Self::InvalidDimensions { .. } | Self::InvalidParameter { .. } | Self::NonFiniteInput { .. }
		)
	}
}

/// Result type alias for FCM operations.
pub type Result<T> = std::result::Result<T, FcmError>;

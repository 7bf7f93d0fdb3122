//! Error types for the iffd library.
//!
//! Structural problems (a bad Hadamard order, bad parameter bounds, mismatched
//! dimensions) are reported eagerly through [`Error`]. Numerical degeneracies
//! found while decomposing variance are not errors; they are recorded per
//! statistic as [`crate::anova::Degeneracy`].

use thiserror::Error;

/// The main error type for the iffd library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============ Design Errors ============
    /// The requested Hadamard order cannot be built.
    #[error("Hadamard order {0} is not of the form 2^e * p with p in {{1, 12, 20}}")]
    InvalidOrder(usize),

    /// A parameter's bounds are empty, inverted or not finite.
    #[error("parameter {parameter} has invalid bounds [{lower}, {upper}] (need finite lower < upper)")]
    BoundsViolation {
        /// Index of the offending parameter.
        parameter: usize,
        /// The lower bound supplied.
        lower: f64,
        /// The upper bound supplied.
        upper: f64,
    },

    // ============ Parameter Validation Errors ============
    /// Invalid configuration parameters.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },

    // ============ Analysis Errors ============
    /// Array dimensions are inconsistent.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension description.
        expected: String,
        /// Actual dimension description.
        actual: String,
    },

    /// A response value is NaN or infinite.
    #[error("response {index} is not finite ({value})")]
    NonFiniteResponse {
        /// Row of the offending response.
        index: usize,
        /// The value supplied.
        value: f64,
    },
}

/// A specialized `Result` type for iffd operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a new `DimensionMismatch` error.
    #[must_use]
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

//! Error types for UnarySim.
//!
//! This module provides a unified error type for all bit-stream generation
//! operations, using the `thiserror` crate for ergonomic error handling.

use thiserror::Error;

/// The main error type for UnarySim operations.
///
/// Every error is raised at the point of detection and propagated to the
/// caller unchanged. None of them are transient.
#[derive(Error, Debug)]
pub enum UnaryError {
    /// Invalid mode, bitwidth, dimension count or other construction parameter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Normalization denominator is zero
    #[error("Degenerate input: clamp range [{min}, {max}] has zero width")]
    DegenerateInput {
        /// Lower clamp bound
        min: f64,
        /// Upper clamp bound
        max: f64,
    },

    /// NaN or infinite value found in numeric input
    #[error("Non-finite value in input data")]
    NonFinite,

    /// Empty input array where at least one element is required
    #[error("Input array is empty")]
    EmptyInput,

    /// Time-step index outside the sequence period
    #[error("Index out of range: index {index}, sequence length {length}")]
    IndexOutOfRange {
        /// The index that was requested
        index: usize,
        /// The sequence length (2^bitwidth)
        length: usize,
    },

    /// Array shapes are incompatible
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape received
        actual: Vec<usize>,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error occurred
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UnaryError {
    /// Shorthand for a [`UnaryError::Configuration`] built from any message.
    pub fn config(msg: impl Into<String>) -> Self {
        UnaryError::Configuration(msg.into())
    }
}

/// A specialized `Result` type for UnarySim operations.
pub type Result<T> = std::result::Result<T, UnaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UnaryError::IndexOutOfRange {
            index: 300,
            length: 256,
        };
        assert_eq!(
            err.to_string(),
            "Index out of range: index 300, sequence length 256"
        );

        let err = UnaryError::config("RNG mode is not implemented: Halton");
        assert_eq!(
            err.to_string(),
            "Configuration error: RNG mode is not implemented: Halton"
        );

        let err = UnaryError::DegenerateInput { min: 2.0, max: 2.0 };
        assert!(err.to_string().contains("zero width"));
    }

    #[test]
    fn test_io_conversion() {
        fn open_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/unarysim/config.json")?)
        }

        assert!(matches!(open_missing(), Err(UnaryError::Io(_))));
    }
}

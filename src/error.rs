//! Error types for Deutsch-Jozsa construction, simulation and analysis.

use thiserror::Error;

/// Errors produced while building, running or checking a Deutsch-Jozsa circuit.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DjError {
    /// A caller-supplied parameter is out of range or unrecognized.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The oracle does not implement a constant or balanced function.
    #[error("Invalid oracle: {0}")]
    InvalidOracle(String),

    /// Measured data contradicts the function type the run was built for.
    #[error("Unexpected result for {function_type} function: {detail}")]
    UnexpectedResult {
        /// The function type the oracle was built as.
        function_type: String,
        /// What was observed.
        detail: String,
    },
}

impl DjError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_oracle(msg: impl Into<String>) -> Self {
        Self::InvalidOracle(msg.into())
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, DjError>;

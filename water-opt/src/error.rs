//! Error types for the water optimizer.

use thiserror::Error;

/// Errors that can occur while optimizing a water profile.
///
/// An infeasible solve is not an error; see [`crate::Outcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptError {
    /// Volume or a profile value is non-finite or physically impossible
    #[error("Invalid input `{field}`: {reason}")]
    InvalidInput {
        /// Name of the offending field, e.g. `volume` or `target.sulfate`
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Additive name that is not in the catalog
    #[error("Unknown additive: {0}")]
    UnknownAdditive(String),

    /// The solver returned a point that breaks the problem's constraints
    #[error("Solver contract violation: {0}")]
    SolverContractViolation(String),

    /// Internal error (malformed problem handed to the solver)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OptError {
    /// Create an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        OptError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The violated field for `InvalidInput` errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            OptError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

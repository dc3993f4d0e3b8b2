//! Error types for the QP solver.

use thiserror::Error;

/// Errors that prevent the solver from starting.
///
/// Outcomes of a well-posed solve (infeasibility, iteration limits) are
/// reported through [`crate::SolveStatus`], not through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QpError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// The quadratic term cannot be factored, so the problem is not strictly convex
    #[error("P is not positive definite (static_reg = {static_reg:e})")]
    NotPositiveDefinite {
        /// Regularization that was applied before factoring
        static_reg: f64,
    },
}

/// Result type for QP operations.
pub type QpResult<T> = Result<T, QpError>;

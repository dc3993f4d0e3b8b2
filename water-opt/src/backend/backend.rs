//! Backend trait and result types.

use crate::error::OptResult;
use crate::problem::OptimizationProblem;

/// Status of a backend solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// A minimizer was found.
    Solved,

    /// No minimizer was found (infeasible constraints, iteration limit,
    /// or a degenerate quadratic form).
    Infeasible,
}

/// Raw result from a backend, in problem column order.
#[derive(Debug, Clone)]
pub struct BackendResult {
    /// Solve status.
    pub status: BackendStatus,

    /// Dose per additive in g/L. Empty unless `status` is `Solved`.
    pub x: Vec<f64>,

    /// Value of `(1/2) x^T H x - d^T x` at `x`.
    pub objective: f64,

    /// Solver iterations.
    pub iterations: usize,

    /// Human-readable detail from the solver.
    pub message: String,
}

impl BackendResult {
    /// Create a solved result.
    pub fn solved(x: Vec<f64>, objective: f64, iterations: usize) -> Self {
        Self {
            status: BackendStatus::Solved,
            x,
            objective,
            iterations,
            message: String::new(),
        }
    }

    /// Create an infeasible result.
    pub fn infeasible(message: impl Into<String>) -> Self {
        Self {
            status: BackendStatus::Infeasible,
            x: Vec::new(),
            objective: f64::INFINITY,
            iterations: 0,
            message: message.into(),
        }
    }
}

/// A solver for
///
/// ```text
/// minimize    (1/2) x^T H x - d^T x
/// subject to  C^T x >= c0   (first `equalities` columns with equality)
/// ```
///
/// Backends are stateless between calls and shareable across threads.
pub trait QpBackend: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Solve `problem`.
    ///
    /// Infeasibility is reported through [`BackendStatus::Infeasible`];
    /// `Err` is reserved for problems the backend could not even accept.
    fn solve(&self, problem: &OptimizationProblem) -> OptResult<BackendResult>;
}

//! Problem data structures and validation.
//!
//! This module defines the canonical quadratic program representation
//! and all associated types.

use std::fmt;

use nalgebra::DMatrix;

use crate::linalg::dense;
use crate::linalg::sparse::SparseCsc;

/// Quadratic program in canonical form.
///
/// The solver works with the canonical formulation:
///
/// ```text
/// minimize    (1/2) x^T P x + q^T x
/// subject to  A x + s = b
///             s ∈ K
/// ```
///
/// where K is a Cartesian product of Zero cones (equality rows) and
/// NonNeg cones (inequality rows `a_i^T x <= b_i`).
///
/// # Dimensions
///
/// - `n`: number of primal variables (length of x)
/// - `m`: number of constraints (length of b, number of rows in A)
/// - P: n × n (dense, symmetric positive definite)
/// - q: n
/// - A: m × n
/// - b: m
#[derive(Debug, Clone)]
#[allow(non_snake_case)] // P and A are standard mathematical notation
pub struct ProblemData {
    /// Quadratic cost matrix P (n × n, symmetric positive definite).
    pub P: DMatrix<f64>,

    /// Linear cost vector q (length n)
    pub q: Vec<f64>,

    /// Constraint matrix A (m × n, CSC format)
    pub A: SparseCsc,

    /// Constraint right-hand side b (length m)
    pub b: Vec<f64>,

    /// Cone specifications partitioning the m rows
    pub cones: Vec<ConeSpec>,
}

/// Cone specification.
///
/// Each block covers `dim` consecutive rows of `A x + s = b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ConeSpec {
    /// Zero cone: {0}^dim (equality constraints).
    Zero { dim: usize },

    /// Nonnegative orthant: ℝ₊^dim
    NonNeg { dim: usize },
}

/// Kind of a single constraint row after expanding the cone list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// `a_i^T x = b_i`
    Equality,
    /// `a_i^T x <= b_i`
    Inequality,
}

/// Solver settings and parameters.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Maximum number of active-set iterations (adds + drops)
    pub max_iter: usize,

    /// Enable verbose logging
    pub verbose: bool,

    /// Primal feasibility tolerance (relative to 1 + |b_i|)
    pub tol_feas: f64,

    /// Threshold below which step directions are treated as zero
    pub tol_zero: f64,

    /// Static regularization added to the diagonal of P
    pub static_reg: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let max_iter = std::env::var("QPCORE_MAX_ITER")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(500);

        // QPCORE_STATIC_REG=1e-10 makes merely semidefinite P factorizable
        let static_reg = std::env::var("QPCORE_STATIC_REG")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0);

        Self {
            max_iter,
            verbose: std::env::var("QPCORE_VERBOSE")
                .map(|s| s != "0" && s.to_lowercase() != "false")
                .unwrap_or(false),
            tol_feas: 1e-9,
            tol_zero: 1e-12,
            static_reg,
        }
    }
}

/// Solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found
    Optimal,

    /// No point satisfies the constraints
    PrimalInfeasible,

    /// Maximum iterations reached
    MaxIters,

    /// Numerical error encountered (singular active set)
    NumericalError,
}

impl SolveStatus {
    /// Returns true if `x` in the result is a valid optimum.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::PrimalInfeasible => write!(f, "Primal Infeasible"),
            SolveStatus::MaxIters => write!(f, "MaxIters"),
            SolveStatus::NumericalError => write!(f, "Numerical Error"),
        }
    }
}

/// Solve result with solution and diagnostics.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Solution status
    pub status: SolveStatus,

    /// Primal solution x (length n)
    pub x: Vec<f64>,

    /// Slack variables s = b - A x (length m)
    pub s: Vec<f64>,

    /// Dual variables z (length m), satisfying P x + q + A^T z = 0 at optimality
    pub z: Vec<f64>,

    /// Objective value at x
    pub obj_val: f64,

    /// Rows in the final active set, in the order they were added
    pub active: Vec<usize>,

    /// Detailed solve information and diagnostics
    pub info: SolveInfo,
}

/// Detailed solve information and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SolveInfo {
    /// Number of active-set iterations completed
    pub iters: usize,

    /// Number of constraints added to the active set
    pub adds: usize,

    /// Number of constraints dropped from the active set
    pub drops: usize,

    /// Total solve time (microseconds)
    pub solve_time_us: u64,

    /// Largest constraint violation at the returned x
    pub primal_res: f64,

    /// Human-readable reason when the status is not optimal
    pub message: String,
}

impl ProblemData {
    /// Get the number of primal variables (n)
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get the number of constraints (m)
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Validate problem dimensions and cone partitioning
    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_vars();
        let m = self.num_constraints();

        if n == 0 {
            return Err("Problem has no variables".to_string());
        }

        if self.P.nrows() != n || self.P.ncols() != n {
            return Err(format!(
                "P has shape {}×{}, expected {}×{}",
                self.P.nrows(),
                self.P.ncols(),
                n,
                n
            ));
        }

        if !dense::is_symmetric(&self.P, 1e-10) {
            return Err("P is not symmetric".to_string());
        }

        if self.P.iter().chain(self.q.iter()).any(|v| !v.is_finite()) {
            return Err("Objective contains non-finite values".to_string());
        }

        if self.A.rows() != m {
            return Err(format!("A has {} rows, expected {}", self.A.rows(), m));
        }
        if self.A.cols() != n {
            return Err(format!("A has {} cols, expected {}", self.A.cols(), n));
        }

        if self.A.data().iter().chain(self.b.iter()).any(|v| !v.is_finite()) {
            return Err("Constraints contain non-finite values".to_string());
        }

        let cone_total_dim: usize = self.cones.iter().map(|c| c.dim()).sum();
        if cone_total_dim != m {
            return Err(format!(
                "Cone dimensions sum to {}, expected {}",
                cone_total_dim, m
            ));
        }

        for cone in &self.cones {
            cone.validate()?;
        }

        Ok(())
    }

    /// Expand the cone list into one `RowKind` per constraint row.
    pub fn row_kinds(&self) -> Vec<RowKind> {
        let mut kinds = Vec::with_capacity(self.num_constraints());
        for cone in &self.cones {
            let kind = match cone {
                ConeSpec::Zero { .. } => RowKind::Equality,
                ConeSpec::NonNeg { .. } => RowKind::Inequality,
            };
            kinds.extend(std::iter::repeat(kind).take(cone.dim()));
        }
        kinds
    }

    /// Objective value (1/2) x^T P x + q^T x.
    pub fn objective(&self, x: &[f64]) -> f64 {
        let lin: f64 = self.q.iter().zip(x).map(|(q, x)| q * x).sum();
        0.5 * dense::quad_form(&self.P, x) + lin
    }
}

impl ConeSpec {
    /// Get the dimension of this cone in the m-dimensional space
    pub fn dim(&self) -> usize {
        match self {
            ConeSpec::Zero { dim } => *dim,
            ConeSpec::NonNeg { dim } => *dim,
        }
    }

    /// Validate this cone specification
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ConeSpec::Zero { dim } => {
                if *dim == 0 {
                    return Err("Zero cone must have positive dimension".to_string());
                }
            }
            ConeSpec::NonNeg { dim } => {
                if *dim == 0 {
                    return Err("NonNeg cone must have positive dimension".to_string());
                }
            }
        }
        Ok(())
    }
}

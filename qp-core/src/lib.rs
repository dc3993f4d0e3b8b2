//! qp-core: a dense dual active-set solver for convex quadratic programs.
//!
//! Solves problems of the form
//!
//! ```text
//! minimize    (1/2) x^T P x + q^T x
//! subject to  A x + s = b,  s ∈ Zero^meq × NonNeg^(m - meq)
//! ```
//!
//! with the Goldfarb-Idnani dual method. `P` must be positive definite
//! (optionally after a static diagonal shift). The method is exact up to
//! rounding and terminates in a finite number of working-set changes, which
//! makes it a good fit for the small, dense problems that come out of
//! least-squares fitting with sign constraints.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use qp_core::{solve, ConeSpec, ProblemData, SolverSettings, SolveStatus};
//! use qp_core::linalg::sparse;
//!
//! // min (x - 2)^2 s.t. x <= 1
//! let prob = ProblemData {
//!     P: DMatrix::from_element(1, 1, 2.0),
//!     q: vec![-4.0],
//!     A: sparse::from_triplets(1, 1, vec![(0, 0, 1.0)]),
//!     b: vec![1.0],
//!     cones: vec![ConeSpec::NonNeg { dim: 1 }],
//! };
//!
//! let result = solve(&prob, &SolverSettings::default()).unwrap();
//! assert_eq!(result.status, SolveStatus::Optimal);
//! assert!((result.x[0] - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod active_set;
pub mod error;
pub mod linalg;
pub mod problem;

pub use error::{QpError, QpResult};
pub use problem::{
    ConeSpec, ProblemData, RowKind, SolveInfo, SolveResult, SolveStatus, SolverSettings,
};

/// Main solve entry point.
///
/// Validates `problem`, then runs the dual active-set method. See
/// [`active_set::solve_active_set`].
pub fn solve(problem: &ProblemData, settings: &SolverSettings) -> QpResult<SolveResult> {
    active_set::solve_active_set(problem, settings)
}

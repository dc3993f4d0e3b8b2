//! Brewing water optimizer.
//!
//! Given a base water profile, a target profile, and a volume, finds how
//! many grams of each catalog salt to dissolve so the resulting ion
//! concentrations are as close as possible (in squared error) to the
//! target, without ever removing a salt.
//!
//! ```
//! use water_opt::{optimize, AdditiveId, IonProfile};
//!
//! let base = IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0);
//! let target = IonProfile::new(48.0, 2.7, 12.0, 60.0, 40.0, 50.0);
//!
//! let result = optimize(20.0, &base, &target).unwrap();
//! assert!(result.is_feasible());
//! assert!(result.masses.grams(AdditiveId::Gypsum) > 1.0);
//! ```
//!
//! The pieces are usable on their own: [`ProblemBuilder`] assembles the
//! least-squares problem, a [`QpBackend`] solves it, and
//! [`SolutionMapper`] checks the raw answer and derives profiles from it.

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod problem;
pub mod settings;
pub mod solution;

pub use backend::{ActiveSetBackend, BackendResult, BackendStatus, QpBackend};
pub use error::{OptError, OptResult};
pub use model::{
    catalog, round_for_display, Additive, AdditiveId, AdditiveMasses, DisplayMasses,
    DisplayProfile, Ion, IonProfile, ADDITIVE_COUNT, ION_COUNT,
};
pub use optimizer::{optimize, WaterOptimizer};
pub use problem::{contribution_matrix, ConstraintSet, OptimizationProblem, ProblemBuilder};
pub use settings::OptimizerSettings;
pub use solution::{DisplayReport, Optimization, Outcome, SolutionMapper, SolverDiagnostics};

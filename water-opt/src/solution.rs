//! Turning raw solver output into an [`Optimization`].

use nalgebra::DVector;
use serde::Serialize;

use crate::backend::BackendResult;
use crate::error::{OptError, OptResult};
use crate::model::{AdditiveMasses, DisplayMasses, DisplayProfile, IonProfile, ADDITIVE_COUNT};
use crate::problem::OptimizationProblem;

/// Whether a solve produced usable additions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The masses minimize the squared error subject to the constraints.
    Feasible,

    /// No solution; masses are zero and the profile is unchanged.
    Infeasible {
        /// Why the solver gave up
        reason: String,
    },
}

/// What the backend reported about the solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverDiagnostics {
    /// Backend name
    pub backend: String,
    /// Solver iterations
    pub iterations: usize,
    /// Backend objective value
    pub objective: f64,
    /// Solver message, possibly empty
    pub message: String,
}

impl SolverDiagnostics {
    /// Diagnostics for `raw` as reported by `backend`.
    pub fn from_result(backend: &str, raw: &BackendResult) -> Self {
        Self {
            backend: backend.to_string(),
            iterations: raw.iterations,
            objective: raw.objective,
            message: raw.message.clone(),
        }
    }
}

/// Rounded values for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayReport {
    /// Grams per additive
    pub masses: DisplayMasses,
    /// Resulting profile
    pub achieved: DisplayProfile,
    /// Deviation per ion
    pub deviation: DisplayProfile,
}

/// Result of optimizing one water profile.
///
/// `masses`, `achieved`, `deviation`, and `squared_error` are full
/// precision and mutually consistent; `display` is derived from them and
/// used only for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    /// Feasible or infeasible
    pub outcome: Outcome,
    /// Water volume in liters
    pub volume: f64,
    /// Grams of each additive
    pub masses: AdditiveMasses,
    /// Profile after dissolving `masses`
    pub achieved: IonProfile,
    /// `achieved - target` when feasible, `target - base` when infeasible
    pub deviation: IonProfile,
    /// `|| achieved - target ||^2`
    pub squared_error: f64,
    /// Rounded copy of the above
    pub display: DisplayReport,
    /// Solver details
    pub diagnostics: SolverDiagnostics,
}

impl Optimization {
    /// True if the outcome is feasible.
    pub fn is_feasible(&self) -> bool {
        matches!(self.outcome, Outcome::Feasible)
    }

    fn new(
        outcome: Outcome,
        volume: f64,
        masses: AdditiveMasses,
        achieved: IonProfile,
        deviation: IonProfile,
        squared_error: f64,
        diagnostics: SolverDiagnostics,
    ) -> Self {
        let display = DisplayReport {
            masses: masses.to_display(),
            achieved: DisplayProfile::from_profile(&achieved),
            deviation: DisplayProfile::from_profile(&deviation),
        };
        Self {
            outcome,
            volume,
            masses,
            achieved,
            deviation,
            squared_error,
            display,
            diagnostics,
        }
    }
}

/// Checks a raw solver vector of doses (g/L) and maps it onto the problem.
#[derive(Debug, Clone, Copy)]
pub struct SolutionMapper {
    clamp_tol: f64,
}

impl SolutionMapper {
    /// Mapper that zeroes doses in `(-clamp_tol, 0)` g/L.
    pub fn new(clamp_tol: f64) -> Self {
        Self { clamp_tol }
    }

    /// Map solved doses to masses and profiles.
    ///
    /// Masses are `dose * volume`; profiles are computed from the doses, so
    /// the result does not depend on the volume's magnitude.
    ///
    /// Fails with [`OptError::SolverContractViolation`] if `raw` has the
    /// wrong length, is not finite, is negative beyond the clamp tolerance,
    /// or breaks an equality or solubility constraint.
    pub fn map(
        &self,
        problem: &OptimizationProblem,
        raw: &[f64],
        diagnostics: SolverDiagnostics,
    ) -> OptResult<Optimization> {
        if raw.len() != ADDITIVE_COUNT {
            return Err(OptError::SolverContractViolation(format!(
                "expected {} doses, got {}",
                ADDITIVE_COUNT,
                raw.len()
            )));
        }

        let mut doses = [0.0; ADDITIVE_COUNT];
        for (j, (&v, dose)) in raw.iter().zip(doses.iter_mut()).enumerate() {
            if !v.is_finite() {
                return Err(OptError::SolverContractViolation(format!(
                    "dose {} is not finite: {}",
                    j, v
                )));
            }
            if v < -self.clamp_tol {
                return Err(OptError::SolverContractViolation(format!(
                    "dose {} is negative: {:e}",
                    j, v
                )));
            }
            *dose = v.max(0.0);
        }

        let x = DVector::from_column_slice(&doses);
        let scale = 1.0 + problem.constraints.rhs.amax();
        if !problem.constraints.is_satisfied(&x, self.clamp_tol * scale) {
            return Err(OptError::SolverContractViolation(
                "doses violate the problem constraints".to_string(),
            ));
        }

        let masses = AdditiveMasses::from_grams(doses.map(|d| d * problem.volume));
        let added = &problem.contribution * &x;
        let base = problem.base.to_array();
        let achieved = IonProfile::from_array(std::array::from_fn(|i| base[i] + added[i]));
        let deviation = achieved.difference(&problem.target);
        let squared_error = deviation.squared_norm();

        Ok(Optimization::new(
            Outcome::Feasible,
            problem.volume,
            masses,
            achieved,
            deviation,
            squared_error,
            diagnostics,
        ))
    }

    /// The result of a failed solve: no additions, base water unchanged.
    pub fn infeasible(
        &self,
        problem: &OptimizationProblem,
        reason: impl Into<String>,
        diagnostics: SolverDiagnostics,
    ) -> Optimization {
        let deviation = problem.target.difference(&problem.base);
        Optimization::new(
            Outcome::Infeasible {
                reason: reason.into(),
            },
            problem.volume,
            AdditiveMasses::zeros(),
            problem.base,
            deviation,
            deviation.squared_norm(),
            diagnostics,
        )
    }
}

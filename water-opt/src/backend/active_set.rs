//! Backend using the qp-core dual active-set solver.
//!
//! qp-core works in the canonical form
//!
//! ```text
//! min  (1/2) x^T P x + q^T x
//! s.t. A x + s = b,  s in Zero^meq x NonNeg
//! ```
//!
//! so a constraint column `c_k^T x >= c0_k` becomes the row
//! `-c_k^T x + s_k = -c0_k` with `s_k >= 0`, and the linear term flips sign.

use qp_core::linalg::sparse;
use qp_core::{solve, ConeSpec, ProblemData, QpError, SolveStatus, SolverSettings};

use super::{BackendResult, QpBackend};
use crate::error::{OptError, OptResult};
use crate::problem::OptimizationProblem;
use crate::settings::OptimizerSettings;

/// Backend using the qp-core Goldfarb-Idnani solver.
#[derive(Debug, Clone)]
pub struct ActiveSetBackend {
    settings: SolverSettings,
}

impl ActiveSetBackend {
    /// Create a backend with explicit solver settings.
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Create a backend configured from optimizer settings.
    ///
    /// Without an explicit `max_iter` the solver's own default applies,
    /// including its `QPCORE_MAX_ITER` override.
    pub fn from_settings(settings: &OptimizerSettings) -> Self {
        let defaults = SolverSettings::default();
        Self::new(SolverSettings {
            max_iter: settings.max_iter.unwrap_or(defaults.max_iter),
            verbose: settings.verbose,
            tol_feas: settings.tol_feas,
            ..defaults
        })
    }

    /// Solver settings in use.
    pub fn solver_settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Translate `problem` into qp-core form.
    fn to_problem_data(problem: &OptimizationProblem) -> ProblemData {
        let n = problem.num_additives();
        let constraints = &problem.constraints;
        let m = constraints.len();

        let mut triplets = Vec::new();
        for k in 0..m {
            for j in 0..n {
                let coef = constraints.normals[(j, k)];
                if coef != 0.0 {
                    triplets.push((k, j, -coef));
                }
            }
        }

        let mut cones = Vec::with_capacity(2);
        if constraints.equalities > 0 {
            cones.push(ConeSpec::Zero {
                dim: constraints.equalities,
            });
        }
        if m > constraints.equalities {
            cones.push(ConeSpec::NonNeg {
                dim: m - constraints.equalities,
            });
        }

        ProblemData {
            P: problem.quadratic.clone(),
            q: problem.linear.iter().map(|d| -d).collect(),
            A: sparse::from_triplets(m, n, triplets),
            b: constraints.rhs.iter().map(|c| -c).collect(),
            cones,
        }
    }
}

impl Default for ActiveSetBackend {
    fn default() -> Self {
        Self::from_settings(&OptimizerSettings::default())
    }
}

impl QpBackend for ActiveSetBackend {
    fn name(&self) -> &str {
        "active-set"
    }

    fn solve(&self, problem: &OptimizationProblem) -> OptResult<BackendResult> {
        let data = Self::to_problem_data(problem);

        let result = match solve(&data, &self.settings) {
            Ok(result) => result,
            Err(QpError::NotPositiveDefinite { static_reg }) => {
                return Ok(BackendResult::infeasible(format!(
                    "quadratic form is not positive definite (static_reg = {:e})",
                    static_reg
                )));
            }
            Err(QpError::InvalidProblem(msg)) => {
                return Err(OptError::Internal(format!("rejected by solver: {}", msg)));
            }
        };

        if self.settings.verbose {
            log::debug!(
                "active-set: {} after {} iters ({} adds, {} drops, {} us)",
                result.status,
                result.info.iters,
                result.info.adds,
                result.info.drops,
                result.info.solve_time_us
            );
        }

        match result.status {
            SolveStatus::Optimal => {
                let mut out =
                    BackendResult::solved(result.x, result.obj_val, result.info.iters);
                out.message = result.info.message;
                Ok(out)
            }
            status => {
                let message = if result.info.message.is_empty() {
                    status.to_string()
                } else {
                    format!("{}: {}", status, result.info.message)
                };
                let mut out = BackendResult::infeasible(message);
                out.iterations = result.info.iters;
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendStatus;
    use crate::model::{AdditiveId, IonProfile};
    use crate::problem::ProblemBuilder;

    fn build(settings: &OptimizerSettings, base: IonProfile, target: IonProfile) -> OptimizationProblem {
        ProblemBuilder::new(settings).build(20.0, &base, &target).unwrap()
    }

    #[test]
    fn test_translation_signs() {
        let settings = OptimizerSettings::default()
            .with_solubility(true)
            .with_disabled(AdditiveId::Gypsum);
        let base = IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0);
        let target = IonProfile::new(48.0, 2.7, 12.0, 60.0, 40.0, 50.0);
        let prob = build(&settings, base, target);

        let data = ActiveSetBackend::to_problem_data(&prob);
        assert!(data.validate().is_ok());
        assert_eq!(data.cones, vec![ConeSpec::Zero { dim: 1 }, ConeSpec::NonNeg { dim: 10 }]);

        let a = sparse::to_dense(&data.A);
        // equality row: -x_gypsum + s = 0
        assert_eq!(a[(0, 0)], -1.0);
        assert_eq!(data.b[0], 0.0);
        // solubility row for gypsum: x_gypsum + s = 2.4 g/L
        assert_eq!(a[(6, 0)], 1.0);
        assert_eq!(data.b[6], 2.4);
        // q = -d
        for j in 0..5 {
            assert_eq!(data.q[j], -prob.linear[j]);
        }
    }

    #[test]
    fn test_solves_reachable_target_exactly() {
        // 1 g gypsum + 0.5 g epsom salt in 20 L
        let settings = OptimizerSettings::default().with_solubility(false);
        let base = IonProfile::new(10.0, 5.0, 10.0, 20.0, 10.0, 30.0);
        let target = IonProfile::new(
            10.0 + 232.78 / 20.0,
            5.0 + 0.5 * 98.61 / 20.0,
            10.0,
            20.0 + (557.95 + 0.5 * 389.75) / 20.0,
            10.0,
            30.0,
        );
        let prob = build(&settings, base, target);

        let res = ActiveSetBackend::default().solve(&prob).unwrap();
        assert_eq!(res.status, BackendStatus::Solved);
        // doses in g/L
        let want = [0.05, 0.0, 0.025, 0.0, 0.0];
        for (got, want) in res.x.iter().zip(want) {
            assert!((got - want).abs() < 1e-10, "x = {:?}", res.x);
        }
        // objective reaches -||needed||^2 when the residual is zero
        assert!((res.objective + prob.needed.norm_squared()).abs() < 1e-6);
    }

    #[test]
    fn test_solver_default_iteration_limit_is_kept() {
        let unset = ActiveSetBackend::from_settings(&OptimizerSettings::default());
        assert_eq!(unset.solver_settings().max_iter, SolverSettings::default().max_iter);

        let set = ActiveSetBackend::from_settings(&OptimizerSettings::default().with_max_iter(7));
        assert_eq!(set.solver_settings().max_iter, 7);
    }

    #[test]
    fn test_iteration_limit_is_infeasible() {
        let settings = OptimizerSettings::default().with_solubility(false).with_max_iter(0);
        let base = IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0);
        let target = IonProfile::new(48.0, 2.7, 12.0, 60.0, 40.0, 50.0);
        let prob = build(&settings, base, target);

        let res = ActiveSetBackend::from_settings(&settings).solve(&prob).unwrap();
        assert_eq!(res.status, BackendStatus::Infeasible);
        assert!(res.x.is_empty());
        assert!(!res.message.is_empty());
    }
}

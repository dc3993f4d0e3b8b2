//! Top-level solve: build, solve, map.

use std::time::Instant;

use crate::backend::{ActiveSetBackend, BackendStatus, QpBackend};
use crate::error::OptResult;
use crate::model::IonProfile;
use crate::problem::ProblemBuilder;
use crate::settings::OptimizerSettings;
use crate::solution::{Optimization, SolutionMapper, SolverDiagnostics};

/// Finds the additive masses that bring a base water closest to a target.
///
/// Holds no per-request state, so one optimizer can serve concurrent
/// requests through `&self`.
pub struct WaterOptimizer<B: QpBackend = ActiveSetBackend> {
    backend: B,
    settings: OptimizerSettings,
}

impl WaterOptimizer<ActiveSetBackend> {
    /// Create an optimizer using the active-set backend.
    pub fn new(settings: OptimizerSettings) -> Self {
        let backend = ActiveSetBackend::from_settings(&settings);
        Self { backend, settings }
    }
}

impl Default for WaterOptimizer<ActiveSetBackend> {
    fn default() -> Self {
        Self::new(OptimizerSettings::default())
    }
}

impl<B: QpBackend> WaterOptimizer<B> {
    /// Create an optimizer with a custom backend.
    pub fn with_backend(backend: B, settings: OptimizerSettings) -> Self {
        Self { backend, settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Optimize additions to `volume` liters of `base` water for `target`.
    ///
    /// Invalid input fails before the backend is called. An infeasible
    /// solve is not an error: it yields an [`Optimization`] whose outcome
    /// is [`Outcome::Infeasible`](crate::Outcome::Infeasible).
    pub fn solve(
        &self,
        volume: f64,
        base: &IonProfile,
        target: &IonProfile,
    ) -> OptResult<Optimization> {
        let start = Instant::now();
        let problem = ProblemBuilder::new(&self.settings).build(volume, base, target)?;

        if self.settings.verbose {
            log::info!(
                "Optimizing {} L: {} constraints ({} equalities), backend {}",
                volume,
                problem.constraints.len(),
                problem.constraints.equalities,
                self.backend.name()
            );
        }

        let raw = self.backend.solve(&problem)?;
        let diagnostics = SolverDiagnostics::from_result(self.backend.name(), &raw);
        let mapper = SolutionMapper::new(self.settings.clamp_tol);

        let result = match raw.status {
            BackendStatus::Solved => match mapper.map(&problem, &raw.x, diagnostics) {
                Ok(result) => result,
                Err(e) => {
                    log::error!("{} backend: {}", self.backend.name(), e);
                    return Err(e);
                }
            },
            BackendStatus::Infeasible => {
                log::warn!("No feasible additions: {}", raw.message);
                mapper.infeasible(&problem, raw.message.clone(), diagnostics)
            }
        };

        if self.settings.verbose {
            log::info!(
                "Done in {} us: squared error {:.6e}, {} iterations",
                start.elapsed().as_micros(),
                result.squared_error,
                result.diagnostics.iterations
            );
        }

        Ok(result)
    }
}

/// Optimize with default settings.
///
/// Shorthand for `WaterOptimizer::default().solve(volume, base, target)`.
pub fn optimize(volume: f64, base: &IonProfile, target: &IonProfile) -> OptResult<Optimization> {
    WaterOptimizer::default().solve(volume, base, target)
}

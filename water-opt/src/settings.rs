//! Configuration settings for the water optimizer.

use crate::model::AdditiveId;

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    // === Solution mapping ===
    /// Solver components in (-clamp_tol, 0) are treated as zero mass.
    /// Anything more negative is a solver contract violation.
    pub clamp_tol: f64,

    // === Extra constraints ===
    /// Cap each additive's dose at its solubility limit.
    pub enforce_solubility: bool,

    /// Additives that must not be used (pinned to zero).
    pub disabled: Vec<AdditiveId>,

    // === Solver ===
    /// Iteration limit for the QP solver; `None` keeps the solver default.
    pub max_iter: Option<usize>,

    /// Feasibility tolerance handed to the QP solver.
    pub tol_feas: f64,

    // === Output ===
    /// Log solver progress.
    pub verbose: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            clamp_tol: 1e-9,
            enforce_solubility: false,
            disabled: Vec::new(),
            max_iter: None,
            tol_feas: 1e-9,
            verbose: false,
        }
    }
}

impl OptimizerSettings {
    /// Defaults with environment overrides applied.
    ///
    /// `WATER_OPT_SOLUBILITY=1` (or `true`) enables solubility caps.
    pub fn from_env() -> Self {
        let mut s = Self::default();
        s.enforce_solubility = std::env::var("WATER_OPT_SOLUBILITY")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        s
    }

    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        let mut s = Self::default();
        s.verbose = true;
        s
    }

    /// Enable or disable solubility caps.
    pub fn with_solubility(mut self, enforce: bool) -> Self {
        self.enforce_solubility = enforce;
        self
    }

    /// Forbid an additive.
    pub fn with_disabled(mut self, id: AdditiveId) -> Self {
        if !self.disabled.contains(&id) {
            self.disabled.push(id);
        }
        self
    }

    /// Set the negative-mass clamp tolerance.
    pub fn with_clamp_tol(mut self, tol: f64) -> Self {
        self.clamp_tol = tol;
        self
    }

    /// Set the solver iteration limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    /// True if `id` may be used.
    pub fn is_enabled(&self, id: AdditiveId) -> bool {
        !self.disabled.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let s = OptimizerSettings::default()
            .with_solubility(true)
            .with_disabled(AdditiveId::TableSalt)
            .with_disabled(AdditiveId::TableSalt)
            .with_clamp_tol(1e-6)
            .with_max_iter(7);

        assert!(s.enforce_solubility);
        assert_eq!(s.disabled, vec![AdditiveId::TableSalt]);
        assert!(!s.is_enabled(AdditiveId::TableSalt));
        assert!(s.is_enabled(AdditiveId::Gypsum));
        assert_eq!(s.clamp_tol, 1e-6);
        assert_eq!(s.max_iter, Some(7));
    }

    #[test]
    fn test_default_ignores_environment() {
        let s = OptimizerSettings::default();
        assert!(!s.enforce_solubility);
        assert!(s.disabled.is_empty());
        assert_eq!(s.max_iter, None);
    }

    #[test]
    fn test_verbose() {
        assert!(OptimizerSettings::verbose().verbose);
    }
}

//! Least-squares problem construction.
//!
//! The decision variable is the dose `x_j` of additive `j` in g/L. A dose
//! moves ion `i` by `M[i, j] x_j` ppm, where `M[i, j]` is the catalog
//! contribution per g/L, so the problem does not depend on the volume at
//! all. Grams are `x_j * V`, applied only when mapping the solution back.
//! The optimizer minimizes the squared distance between the resulting
//! profile and the target:
//!
//! ```text
//! minimize    || M x - (target - base) ||^2
//! subject to  C^T x >= c0
//! ```
//!
//! Expanding the norm and dropping the constant gives the quadratic form
//! `(1/2) x^T H x - d^T x` with `H = 2 M^T M` and `d = 2 M^T (target - base)`.
//! The constraint columns always include `x >= 0`.

use nalgebra::{DMatrix, DVector};

use crate::error::{OptError, OptResult};
use crate::model::{catalog, AdditiveId, IonProfile, ADDITIVE_COUNT, ION_COUNT};
use crate::settings::OptimizerSettings;

/// Linear constraints `C^T x >= c0` on doses (g/L), one column of `C` per
/// constraint.
///
/// The first `equalities` columns hold with equality.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    /// Constraint normals, `ADDITIVE_COUNT x len()`
    pub normals: DMatrix<f64>,
    /// Right-hand sides
    pub rhs: DVector<f64>,
    /// Number of leading equality columns
    pub equalities: usize,
}

impl ConstraintSet {
    fn from_columns(columns: Vec<(DVector<f64>, f64)>, equalities: usize) -> Self {
        let normals = DMatrix::from_fn(ADDITIVE_COUNT, columns.len(), |i, k| columns[k].0[i]);
        let rhs = DVector::from_iterator(columns.len(), columns.iter().map(|(_, c)| *c));
        Self {
            normals,
            rhs,
            equalities,
        }
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// True if there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// `C^T x - c0` for every constraint.
    pub fn slack(&self, x: &DVector<f64>) -> DVector<f64> {
        self.normals.tr_mul(x) - &self.rhs
    }

    /// True if `x` satisfies every constraint to within `tol`.
    pub fn is_satisfied(&self, x: &DVector<f64>, tol: f64) -> bool {
        self.slack(x).iter().enumerate().all(|(k, &s)| {
            if k < self.equalities {
                s.abs() <= tol
            } else {
                s >= -tol
            }
        })
    }
}

/// A fully assembled problem instance.
///
/// Owns everything it needs; the request it came from can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationProblem {
    /// Water volume in liters
    pub volume: f64,
    /// Starting water
    pub base: IonProfile,
    /// Desired water
    pub target: IonProfile,
    /// `target - base`
    pub needed: DVector<f64>,
    /// ppm change per g/L dosed, `ION_COUNT x ADDITIVE_COUNT`
    pub contribution: DMatrix<f64>,
    /// `H = 2 M^T M`
    pub quadratic: DMatrix<f64>,
    /// `d = 2 M^T (target - base)`
    pub linear: DVector<f64>,
    /// Feasible region
    pub constraints: ConstraintSet,
}

impl OptimizationProblem {
    /// Number of decision variables.
    pub fn num_additives(&self) -> usize {
        self.contribution.ncols()
    }

    /// `M x - (target - base)`, i.e. achieved minus target.
    pub fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.contribution * x - &self.needed
    }

    /// Squared error `|| M x - (target - base) ||^2`.
    pub fn squared_error(&self, x: &DVector<f64>) -> f64 {
        self.residual(x).norm_squared()
    }

    /// Value of `(1/2) x^T H x - d^T x`.
    ///
    /// Differs from [`squared_error`](Self::squared_error) by the constant
    /// `|| target - base ||^2`.
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.quadratic * x)) - self.linear.dot(x)
    }
}

/// Builds [`OptimizationProblem`]s from validated input.
#[derive(Debug, Clone)]
pub struct ProblemBuilder<'a> {
    settings: &'a OptimizerSettings,
}

impl<'a> ProblemBuilder<'a> {
    /// Create a builder that honors `settings`.
    pub fn new(settings: &'a OptimizerSettings) -> Self {
        Self { settings }
    }

    /// Validate the request and assemble the problem.
    pub fn build(
        &self,
        volume: f64,
        base: &IonProfile,
        target: &IonProfile,
    ) -> OptResult<OptimizationProblem> {
        validate_volume(volume)?;
        base.validate("base")?;
        target.validate("target")?;

        let contribution = contribution_matrix();
        let needed = DVector::from_column_slice(&target.difference(base).to_array());

        let quadratic = 2.0 * contribution.tr_mul(&contribution);
        let linear = 2.0 * contribution.tr_mul(&needed);

        Ok(OptimizationProblem {
            volume,
            base: *base,
            target: *target,
            needed,
            contribution,
            quadratic,
            linear,
            constraints: self.constraints(),
        })
    }

    fn constraints(&self) -> ConstraintSet {
        let unit = |id: AdditiveId, sign: f64| {
            let mut e = DVector::zeros(ADDITIVE_COUNT);
            e[id.index()] = sign;
            e
        };

        let mut columns = Vec::new();

        // x_j = 0 for disabled additives
        for id in AdditiveId::ALL {
            if !self.settings.is_enabled(id) {
                columns.push((unit(id, 1.0), 0.0));
            }
        }
        let equalities = columns.len();

        // x_j >= 0
        for id in AdditiveId::ALL {
            columns.push((unit(id, 1.0), 0.0));
        }

        // -x_j >= -solubility
        if self.settings.enforce_solubility {
            for additive in catalog() {
                columns.push((unit(additive.id, -1.0), -additive.solubility_g_per_l));
            }
        }

        ConstraintSet::from_columns(columns, equalities)
    }
}

fn validate_volume(volume: f64) -> OptResult<()> {
    if !volume.is_finite() {
        return Err(OptError::invalid_input(
            "volume",
            format!("must be finite, got {}", volume),
        ));
    }
    if volume <= 0.0 {
        return Err(OptError::invalid_input(
            "volume",
            format!("must be positive, got {}", volume),
        ));
    }
    Ok(())
}

/// ppm change per g/L of each additive.
pub fn contribution_matrix() -> DMatrix<f64> {
    let mut m = DMatrix::zeros(ION_COUNT, ADDITIVE_COUNT);
    for additive in catalog() {
        for &(ion, ppm) in additive.contributions() {
            m[(ion.index(), additive.id.index())] = ppm;
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ion;

    fn scenario() -> (IonProfile, IonProfile) {
        (
            IonProfile::new(22.0, 2.7, 12.0, 6.0, 14.0, 50.0),
            IonProfile::new(48.0, 2.7, 12.0, 60.0, 40.0, 50.0),
        )
    }

    #[test]
    fn test_contribution_matrix_matches_catalog() {
        let m = contribution_matrix();
        assert_eq!(m[(Ion::Calcium.index(), 0)], 232.78);
        assert_eq!(m[(Ion::Bicarbonate.index(), 4)], 726.33);
        assert_eq!(m[(Ion::Sodium.index(), 0)], 0.0);

        // two nonzeros per column
        for j in 0..ADDITIVE_COUNT {
            assert_eq!(m.column(j).iter().filter(|&&v| v != 0.0).count(), 2);
        }
    }

    #[test]
    fn test_build_scenario() {
        let settings = OptimizerSettings::default().with_solubility(false);
        let (base, target) = scenario();
        let prob = ProblemBuilder::new(&settings).build(20.0, &base, &target).unwrap();

        assert_eq!(prob.num_additives(), 5);
        assert_eq!(prob.needed.as_slice(), &[26.0, 0.0, 0.0, 54.0, 26.0, 0.0]);

        // H symmetric
        assert!((&prob.quadratic - prob.quadratic.transpose()).amax() < 1e-12);

        // only nonnegativity
        assert_eq!(prob.constraints.len(), 5);
        assert_eq!(prob.constraints.equalities, 0);
        assert!(prob.constraints.is_satisfied(&DVector::zeros(5), 0.0));
        assert!(!prob.constraints.is_satisfied(
            &DVector::from_column_slice(&[0.0, -1.0, 0.0, 0.0, 0.0]),
            1e-9
        ));
    }

    #[test]
    fn test_problem_does_not_depend_on_volume() {
        let settings = OptimizerSettings::default().with_solubility(true);
        let (base, target) = scenario();
        let builder = ProblemBuilder::new(&settings);
        let small = builder.build(1e-6, &base, &target).unwrap();
        let large = builder.build(1e15, &base, &target).unwrap();

        assert_eq!(small.quadratic, large.quadratic);
        assert_eq!(small.linear, large.linear);
        assert_eq!(small.constraints, large.constraints);
        assert_eq!(large.volume, 1e15);
    }

    #[test]
    fn test_objective_matches_squared_error() {
        let settings = OptimizerSettings::default().with_solubility(false);
        let (base, target) = scenario();
        let prob = ProblemBuilder::new(&settings).build(20.0, &base, &target).unwrap();

        let x = DVector::from_column_slice(&[1.0, 0.5, 0.25, 0.1, 0.0]);
        let constant = prob.needed.norm_squared();
        assert!((prob.objective(&x) + constant - prob.squared_error(&x)).abs() < 1e-9);

        // at x = 0 the residual is base - target
        let r = prob.residual(&DVector::zeros(5));
        assert_eq!(r[Ion::Sulfate.index()], -54.0);
    }

    #[test]
    fn test_disabled_and_solubility_constraints() {
        let settings = OptimizerSettings::default()
            .with_solubility(true)
            .with_disabled(AdditiveId::BakingSoda);
        let (base, target) = scenario();
        let prob = ProblemBuilder::new(&settings).build(10.0, &base, &target).unwrap();
        let c = &prob.constraints;

        assert_eq!(c.equalities, 1);
        assert_eq!(c.len(), 1 + 5 + 5);
        assert_eq!(c.normals[(AdditiveId::BakingSoda.index(), 0)], 1.0);

        // gypsum cap: 2.4 g/L whatever the volume
        let cap = 1 + 5;
        assert_eq!(c.normals[(0, cap)], -1.0);
        assert_eq!(c.rhs[cap], -2.4);

        let mut x = DVector::zeros(5);
        x[0] = 2.4;
        assert!(c.is_satisfied(&x, 1e-9));
        x[0] = 2.41;
        assert!(!c.is_satisfied(&x, 1e-9));
        x[0] = 1.0;
        x[4] = 0.5;
        assert!(!c.is_satisfied(&x, 1e-9));
    }

    #[test]
    fn test_rejects_bad_volume() {
        let settings = OptimizerSettings::default();
        let (base, target) = scenario();
        let builder = ProblemBuilder::new(&settings);

        for volume in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = builder.build(volume, &base, &target).unwrap_err();
            assert_eq!(err.field(), Some("volume"), "volume = {}", volume);
        }
    }

    #[test]
    fn test_rejects_bad_profiles() {
        let settings = OptimizerSettings::default();
        let (base, _) = scenario();
        let builder = ProblemBuilder::new(&settings);

        let bad = IonProfile::new(1.0, 1.0, 1.0, 1.0, -1.0, 1.0);
        let err = builder.build(20.0, &base, &bad).unwrap_err();
        assert_eq!(err.field(), Some("target.chloride"));

        let err = builder.build(20.0, &bad, &base).unwrap_err();
        assert_eq!(err.field(), Some("base.chloride"));
    }
}

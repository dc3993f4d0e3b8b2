//! Working-set bookkeeping for the dual active-set method.
//!
//! Constraints are stored in the orientation `n^T x >= c` used by the
//! Goldfarb-Idnani iteration. Equality rows enter with whichever sign makes
//! them violated at the moment they are added and are never dropped.

use nalgebra::{Cholesky, DMatrix, DVector};

/// A constraint in (or entering) the working set.
#[derive(Debug, Clone)]
pub(crate) struct ActiveConstraint {
    /// Row of `A x + s = b` this constraint came from
    pub row: usize,
    /// Normal `n` in `n^T x >= c`
    pub normal: DVector<f64>,
    /// Right-hand side `c`
    pub rhs: f64,
    /// +1 when `n = -a_row`, -1 when the row entered flipped
    pub orientation: f64,
    /// Equality rows are excluded from drop tests
    pub equality: bool,
    /// Dual multiplier, nonnegative for inequality rows
    pub multiplier: f64,
}

impl ActiveConstraint {
    /// Signed slack `n^T x - c`; negative means violated.
    pub fn slack(&self, x: &DVector<f64>) -> f64 {
        self.normal.dot(x) - self.rhs
    }
}

/// Primal and dual step directions for an entering constraint.
#[derive(Debug, Clone)]
pub(crate) struct StepDirections {
    /// Primal direction `z = H n+`
    pub primal: DVector<f64>,
    /// `r = N* n+`, aligned with the working set order
    pub dual: DVector<f64>,
    /// `z^T n+`
    pub curvature: f64,
    /// `n+^T G^-1 n+`, the curvature with an empty working set
    pub reference_curvature: f64,
}

/// Inverse Hessian plus the current working set.
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    g_inv: DMatrix<f64>,
    active: Vec<ActiveConstraint>,
}

impl Workspace {
    pub fn new(g_inv: DMatrix<f64>) -> Self {
        Self {
            g_inv,
            active: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.active.iter().any(|c| c.row == row)
    }

    pub fn constraints(&self) -> &[ActiveConstraint] {
        &self.active
    }

    /// Compute step directions for adding `normal` to the working set.
    ///
    /// With N the matrix of active normals:
    ///
    /// ```text
    /// N* = (N^T G^-1 N)^-1 N^T G^-1
    /// H  = G^-1 (I - N N*)
    /// ```
    ///
    /// Returns `None` when `N^T G^-1 N` is not positive definite, i.e. the
    /// working set lost linear independence.
    pub fn directions(&self, normal: &DVector<f64>) -> Option<StepDirections> {
        let g_n = &self.g_inv * normal;
        let reference_curvature = normal.dot(&g_n);

        if self.active.is_empty() {
            return Some(StepDirections {
                curvature: reference_curvature,
                primal: g_n,
                dual: DVector::zeros(0),
                reference_curvature,
            });
        }

        let columns: Vec<DVector<f64>> = self.active.iter().map(|c| c.normal.clone()).collect();
        let n_mat = DMatrix::from_columns(&columns);
        let g_n_mat = &self.g_inv * &n_mat;
        let schur = n_mat.transpose() * &g_n_mat;
        let chol = Cholesky::new(schur)?;

        let dual = chol.solve(&(g_n_mat.transpose() * normal));
        let primal = g_n - &g_n_mat * &dual;
        let curvature = primal.dot(normal);

        Some(StepDirections {
            primal,
            dual,
            curvature,
            reference_curvature,
        })
    }

    /// Largest dual step before an inequality multiplier hits zero.
    ///
    /// Returns the working-set index of the blocking constraint and the step.
    pub fn blocking_constraint(&self, dual: &DVector<f64>, tol: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (k, (c, &r)) in self.active.iter().zip(dual.iter()).enumerate() {
            if c.equality || r <= tol {
                continue;
            }
            let ratio = (c.multiplier / r).max(0.0);
            if best.map_or(true, |(_, t)| ratio < t) {
                best = Some((k, ratio));
            }
        }
        best
    }

    /// `u <- u - t r`
    pub fn shift_multipliers(&mut self, dual: &DVector<f64>, t: f64) {
        for (c, r) in self.active.iter_mut().zip(dual.iter()) {
            c.multiplier -= t * r;
            if !c.equality && c.multiplier < 0.0 {
                c.multiplier = 0.0;
            }
        }
    }

    pub fn push(&mut self, constraint: ActiveConstraint) {
        self.active.push(constraint);
    }

    pub fn remove(&mut self, k: usize) -> ActiveConstraint {
        self.active.remove(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(row: usize, normal: &[f64], equality: bool, multiplier: f64) -> ActiveConstraint {
        ActiveConstraint {
            row,
            normal: DVector::from_column_slice(normal),
            rhs: 0.0,
            orientation: 1.0,
            equality,
            multiplier,
        }
    }

    #[test]
    fn test_empty_working_set_uses_inverse_hessian() {
        let ws = Workspace::new(DMatrix::from_diagonal(&DVector::from_vec(vec![0.5, 0.25])));
        let dir = ws.directions(&DVector::from_vec(vec![1.0, 1.0])).unwrap();

        assert!((dir.primal[0] - 0.5).abs() < 1e-12);
        assert!((dir.primal[1] - 0.25).abs() < 1e-12);
        assert!((dir.curvature - 0.75).abs() < 1e-12);
        assert_eq!(dir.dual.len(), 0);
    }

    #[test]
    fn test_dependent_normal_has_zero_curvature() {
        let mut ws = Workspace::new(DMatrix::identity(2, 2));
        ws.push(constraint(0, &[1.0, 0.0], false, 1.0));

        let dir = ws.directions(&DVector::from_vec(vec![2.0, 0.0])).unwrap();
        assert!(dir.curvature.abs() < 1e-12);
        assert!((dir.dual[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_blocking_constraint_skips_equalities() {
        let mut ws = Workspace::new(DMatrix::identity(3, 3));
        ws.push(constraint(0, &[1.0, 0.0, 0.0], true, 0.1));
        ws.push(constraint(1, &[0.0, 1.0, 0.0], false, 2.0));
        ws.push(constraint(2, &[0.0, 0.0, 1.0], false, 1.0));

        let dual = DVector::from_vec(vec![5.0, 1.0, 4.0]);
        let (k, t) = ws.blocking_constraint(&dual, 1e-12).unwrap();
        assert_eq!(k, 2);
        assert!((t - 0.25).abs() < 1e-12);

        ws.shift_multipliers(&dual, t);
        assert_eq!(ws.constraints()[2].multiplier, 0.0);
        assert!((ws.constraints()[1].multiplier - 1.75).abs() < 1e-12);
        assert!(ws.contains(1));
        assert_eq!(ws.remove(2).row, 2);
        assert_eq!(ws.len(), 2);
    }
}

//! Dense helpers for the small, fully coupled systems of the active-set method.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

/// Factor `P + reg * I` as L L^T.
///
/// Returns `None` when the regularized matrix is not positive definite.
pub fn factor_spd(p: &DMatrix<f64>, reg: f64) -> Option<Cholesky<f64, Dyn>> {
    let mut shifted = p.clone();
    if reg != 0.0 {
        for i in 0..shifted.nrows() {
            shifted[(i, i)] += reg;
        }
    }
    Cholesky::new(shifted)
}

/// Check symmetry with a tolerance relative to the largest entry.
pub fn is_symmetric(m: &DMatrix<f64>, tol: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let scale = m.amax().max(1.0);
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (m[(i, j)] - m[(j, i)]).abs() > tol * scale {
                return false;
            }
        }
    }
    true
}

/// x^T M x
pub fn quad_form(m: &DMatrix<f64>, x: &[f64]) -> f64 {
    let v = DVector::from_column_slice(x);
    v.dot(&(m * &v))
}

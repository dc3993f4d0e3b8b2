//! Sparse constraint matrices in CSC (Compressed Sparse Column) format.
//!
//! Callers describe constraints as triplets; the active-set solver works on
//! dense rows, so the only heavy operation here is the dense expansion.

use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

/// Sparse matrix in CSC format.
pub type SparseCsc = CsMat<f64>;

/// Build a sparse CSC matrix from triplets (row, col, value).
///
/// Duplicate entries are summed.
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> SparseCsc
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (i, j, v) in triplets {
        tri.add_triplet(i, j, v);
    }
    tri.to_csc()
}

/// Sparse matrix-vector product: y = alpha * A * x + beta * y
pub fn spmv(a: &SparseCsc, x: &[f64], y: &mut [f64], alpha: f64, beta: f64) {
    assert_eq!(a.cols(), x.len());
    assert_eq!(a.rows(), y.len());

    if beta == 0.0 {
        y.fill(0.0);
    } else if beta != 1.0 {
        for yi in y.iter_mut() {
            *yi *= beta;
        }
    }

    if alpha != 0.0 {
        for (val, (row, col)) in a.iter() {
            y[row] += alpha * (*val) * x[col];
        }
    }
}

/// Expand A into a dense m × n matrix.
pub fn to_dense(a: &SparseCsc) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(a.rows(), a.cols());
    for (&val, (row, col)) in a.iter() {
        dense[(row, col)] += val;
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triplets_sums_duplicates() {
        let mat = from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 2.0), (0, 0, 3.0)]);

        assert_eq!(mat.rows(), 2);
        assert_eq!(mat.cols(), 2);
        assert_eq!(mat.nnz(), 2);
        assert_eq!(to_dense(&mat)[(0, 0)], 4.0);
    }

    #[test]
    fn test_spmv() {
        // [[1, 2], [3, 4]] * [1, 2] = [5, 11]
        let mat = from_triplets(2, 2, vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (1, 1, 4.0)]);
        let mut y = vec![1.0; 2];

        spmv(&mat, &[1.0, 2.0], &mut y, -1.0, 1.0);

        assert!((y[0] + 4.0).abs() < 1e-12);
        assert!((y[1] + 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_dense_shape() {
        let mat = from_triplets(3, 2, vec![(2, 1, -1.0)]);
        let dense = to_dense(&mat);

        assert_eq!(dense.shape(), (3, 2));
        assert_eq!(dense[(2, 1)], -1.0);
        assert_eq!(dense.iter().filter(|v| **v != 0.0).count(), 1);
    }
}

use nalgebra::DMatrix;

/// Numerical floor below which a diagonal pivot is treated as non-positive
/// during Cholesky-Banachiewicz decomposition.
const PIVOT_EPSILON: f64 = 1e-10;

/// Lower-triangular Cholesky factor `L` such that `L * L^T == matrix`.
///
/// Returns `None` if `matrix` is not positive definite within
/// `PIVOT_EPSILON` of zero; callers fall back to independent draws (an
/// implicit identity factor) when that happens rather than panicking.
pub fn cholesky_lower(matrix: &[Vec<f64>]) -> Option<DMatrix<f64>> {
    let n = matrix.len();
    if n == 0 {
        return Some(DMatrix::zeros(0, 0));
    }
    let mut l = DMatrix::<f64>::zeros(n, n);

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[(i, k)] * l[(j, k)];
            }
            if i == j {
                let pivot = matrix[i][i] - sum;
                if pivot < PIVOT_EPSILON {
                    return None;
                }
                l[(i, j)] = pivot.sqrt();
            } else {
                l[(i, j)] = (matrix[i][j] - sum) / l[(j, j)];
            }
        }
    }
    Some(l)
}

/// Applies a Cholesky factor to a vector of independent standard-normal
/// draws, producing a correlated draw: `L * z`.
pub fn apply_factor(l: &DMatrix<f64>, z: &[f64]) -> Vec<f64> {
    let n = l.nrows();
    let mut out = vec![0.0; n];
    for i in 0..n {
        let mut acc = 0.0;
        for k in 0..=i {
            acc += l[(i, k)] * z[k];
        }
        out[i] = acc;
    }
    out
}

use immo_ml_core::{Matrix, MlError, MlResult};

use crate::decomposition::lu;

/// Solve the linear system `A·x = b` using LU decomposition.
pub fn solve(a: &Matrix, b: &[f64]) -> MlResult<Vec<f64>> {
    let n = a.rows();
    if n != a.cols() {
        return Err(MlError::InvalidOperation("solve: A must be square".into()));
    }
    if b.len() != n {
        return Err(MlError::DimensionMismatch(format!(
            "solve: b has {} elements but A is {}x{}",
            b.len(),
            n,
            n
        )));
    }

    let decomp = lu(a)?;

    let pb: Vec<f64> = decomp.pivot.iter().map(|&p| b[p]).collect();

    // Forward substitution: L·y = P·b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += decomp.l.at(i, j) * y[j];
        }
        y[i] = pb[i] - sum;
    }

    // Back substitution: U·x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += decomp.u.at(i, j) * x[j];
        }
        x[i] = (y[i] - sum) / decomp.u.at(i, i);
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve() {
        // 2x + y = 5
        // x + 3y = 7
        let a = Matrix::new(vec![2.0, 1.0, 1.0, 3.0], 2, 2).unwrap();
        let x = solve(&a, &[5.0, 7.0]).unwrap();
        assert_relative_eq!(x[0], 1.6, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.8, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_rejects_bad_shapes() {
        let a = Matrix::zeros(2, 3);
        assert!(solve(&a, &[1.0, 2.0]).is_err());
        let a = Matrix::eye(2);
        assert!(matches!(solve(&a, &[1.0]), Err(MlError::DimensionMismatch(_))));
    }
}

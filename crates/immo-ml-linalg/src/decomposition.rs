use immo_ml_core::{Matrix, MlError, MlResult};

/// LU decomposition result: P·A = L·U
pub struct LuDecomposition {
    pub l: Matrix,
    pub u: Matrix,
    pub pivot: Vec<usize>,
}

/// LU decomposition with partial pivoting.
///
/// A pivot whose magnitude falls below `1e-12 × max|A|` is treated as zero
/// and reported as [`MlError::SingularMatrix`].
pub fn lu(a: &Matrix) -> MlResult<LuDecomposition> {
    let (n, m) = a.shape();
    if n != m {
        return Err(MlError::InvalidOperation("LU requires a square matrix".into()));
    }
    if n == 0 {
        return Err(MlError::EmptyInput);
    }

    let scale = a.data().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tol = (scale * 1e-12).max(f64::MIN_POSITIVE);

    let mut u_data = a.data().to_vec();
    let mut l_data = vec![0.0; n * n];
    let mut pivot: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = u_data[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = u_data[i * n + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_val < tol {
            return Err(MlError::SingularMatrix);
        }

        if max_row != k {
            pivot.swap(k, max_row);
            for j in 0..n {
                u_data.swap(k * n + j, max_row * n + j);
            }
            for j in 0..k {
                l_data.swap(k * n + j, max_row * n + j);
            }
        }

        l_data[k * n + k] = 1.0;

        for i in (k + 1)..n {
            let factor = u_data[i * n + k] / u_data[k * n + k];
            l_data[i * n + k] = factor;
            for j in k..n {
                u_data[i * n + j] -= factor * u_data[k * n + j];
            }
        }
    }

    Ok(LuDecomposition {
        l: Matrix::new(l_data, n, n)?,
        u: Matrix::new(u_data, n, n)?,
        pivot,
    })
}

use immo_ml_core::{Matrix, MlError, MlResult};
use serde::{Deserialize, Serialize};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Zero-variance columns keep a scale of 1.0 so they map to 0.0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Option<Vec<f64>>,
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            scale: None,
        }
    }

    /// Compute mean and std from training data (`[samples, features]`).
    pub fn fit(&mut self, x: &Matrix) -> MlResult<()> {
        self.mean = Some(x.mean_cols()?);
        self.scale = Some(
            x.std_cols()?
                .into_iter()
                .map(|s| if s.abs() < f64::EPSILON { 1.0 } else { s })
                .collect(),
        );
        Ok(())
    }

    /// Transform data using fitted mean and std.
    pub fn transform(&self, x: &Matrix) -> MlResult<Matrix> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(MlError::NotFitted),
        };
        if x.cols() != mean.len() {
            return Err(MlError::DimensionMismatch(format!(
                "scaler was fitted on {} columns, got {}",
                mean.len(),
                x.cols()
            )));
        }
        let mut data = Vec::with_capacity(x.rows() * x.cols());
        for i in 0..x.rows() {
            for (j, v) in x.row(i)?.iter().enumerate() {
                data.push((v - mean[j]) / scale[j]);
            }
        }
        Matrix::new(data, x.rows(), x.cols())
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Matrix) -> MlResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_scaler() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();

        let mut scaler = StandardScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();

        let mean = transformed.mean_cols().unwrap();
        assert!(mean[0].abs() < 1e-10);
        assert!(mean[1].abs() < 1e-10);
        let std = transformed.std_cols().unwrap();
        assert_relative_eq!(std[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = Matrix::from_rows(&[vec![7.0], vec![7.0]]).unwrap();
        let mut scaler = StandardScaler::new();
        let t = scaler.fit_transform(&x).unwrap();
        assert_eq!(t.data(), &[0.0, 0.0]);
    }

    #[test]
    fn test_transform_before_fit() {
        let scaler = StandardScaler::new();
        assert_eq!(scaler.transform(&Matrix::zeros(1, 1)), Err(MlError::NotFitted));
    }
}

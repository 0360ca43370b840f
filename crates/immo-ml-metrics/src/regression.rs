/// Mean Squared Error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    sum / y_true.len() as f64
}

/// Root Mean Squared Error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mse(y_true, y_pred).sqrt()
}

/// Mean Absolute Error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    sum / y_true.len() as f64
}

/// R² (coefficient of determination).
///
/// A constant target has no variance to explain: a perfect fit scores 1.0,
/// anything else 0.0.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let n = y_true.len() as f64;
    let mean_true = y_true.iter().sum::<f64>() / n;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true) * (t - mean_true)).sum();

    if ss_tot < 1e-15 {
        return if ss_res < 1e-15 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mse() {
        let y = [1.0, 2.0, 3.0];
        assert_relative_eq!(mse(&y, &y), 0.0);
        assert_relative_eq!(rmse(&[0.0, 0.0], &[3.0, 3.0]), 3.0);
    }

    #[test]
    fn test_r2_perfect() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2_score(&y, &y), 1.0);
    }

    #[test]
    fn test_r2_mean_predictor_is_zero() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2_score(&y, &[2.5; 4]), 0.0);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_relative_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_relative_eq!(r2_score(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_mae() {
        assert_relative_eq!(mae(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]), 0.5);
    }
}

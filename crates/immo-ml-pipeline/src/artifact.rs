use immo_ml_core::{Estimator, Matrix};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::registry::ModelKind;
use crate::regressor::Regressor;

/// A fitted regressor together with the ordered names of the features it was
/// trained on. This is what gets persisted as `{dataset}_{key}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub regressor: Regressor,
}

impl ModelArtifact {
    /// Wrap a fitted regressor. Unfitted models or a feature count that does
    /// not match the names are rejected.
    pub fn new(feature_names: Vec<String>, regressor: Regressor) -> PipelineResult<Self> {
        let artifact = ModelArtifact {
            feature_names,
            regressor,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn kind(&self) -> ModelKind {
        self.regressor.kind()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        if x.cols() != self.n_features() {
            return Err(PipelineError::FeatureMismatch {
                expected: self.n_features(),
                got: x.cols(),
            });
        }
        Ok(self.regressor.predict(x)?)
    }

    pub fn to_bytes(&self) -> PipelineResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decode an artifact, rejecting anything that is not a fitted model.
    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| PipelineError::InvalidModel(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> PipelineResult<()> {
        if !self.regressor.is_fitted() {
            return Err(PipelineError::InvalidModel(format!(
                "{} model is not fitted",
                self.kind()
            )));
        }
        match self.regressor.n_features() {
            Some(n) if n != self.feature_names.len() => Err(PipelineError::InvalidModel(format!(
                "model was fitted on {} features but lists {} names",
                n,
                self.feature_names.len()
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create;
    use approx::assert_relative_eq;

    fn fitted_linear() -> Regressor {
        let x = Matrix::from_rows(&[vec![1.0, 0.0], vec![2.0, 1.0], vec![3.0, 0.0], vec![4.0, 1.0]])
            .unwrap();
        let y = [3.0, 6.0, 7.0, 10.0];
        let mut model = create("lr").unwrap();
        model.fit(&x, &y).unwrap();
        model
    }

    #[test]
    fn test_artifact_predicts_and_round_trips() {
        let artifact =
            ModelArtifact::new(vec!["num__surface".into(), "cat__garden".into()], fitted_linear()).unwrap();
        let x = Matrix::from_rows(&[vec![5.0, 1.0]]).unwrap();
        assert_relative_eq!(artifact.predict(&x).unwrap()[0], 12.0, epsilon = 1e-6);

        let back = ModelArtifact::from_bytes(&artifact.to_bytes().unwrap()).unwrap();
        assert_eq!(back, artifact);
        assert_eq!(back.kind(), ModelKind::Linear);
    }

    #[test]
    fn test_rejects_unfitted_and_mismatched() {
        let unfitted = create("rf").unwrap();
        assert!(matches!(
            ModelArtifact::new(vec!["a".into()], unfitted),
            Err(PipelineError::InvalidModel(_))
        ));
        assert!(matches!(
            ModelArtifact::new(vec!["a".into()], fitted_linear()),
            Err(PipelineError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_predict_checks_width() {
        let artifact = ModelArtifact::new(vec!["a".into(), "b".into()], fitted_linear()).unwrap();
        let x = Matrix::from_rows(&[vec![1.0]]).unwrap();
        assert!(matches!(
            artifact.predict(&x),
            Err(PipelineError::FeatureMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_from_bytes_invalid() {
        assert!(matches!(
            ModelArtifact::from_bytes(b"not a model"),
            Err(PipelineError::InvalidModel(_))
        ));
    }
}

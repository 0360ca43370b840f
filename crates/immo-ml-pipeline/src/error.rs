use immo_ml_core::MlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown model type '{0}' (expected one of: lr, rf, dgbm)")]
    UnknownModelType(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Ml(#[from] MlError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

use std::path::PathBuf;

use immo_ml::core::MlError;
use immo_ml::data::DataError;
use immo_ml::io::IoError;
use immo_ml::pipeline::PipelineError;
use immo_ml::preprocessing::PrepError;
use thiserror::Error;

/// Errors returned by the trainer and the predictor.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("target column '{0}' not found")]
    TargetMissing(String),

    #[error("unknown model type '{0}'")]
    ModelType(String),

    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("record is missing feature '{0}'")]
    MissingFeature(String),

    #[error("feature '{name}' expects a number, got '{value}'")]
    InvalidFeature { name: String, value: String },

    #[error(transparent)]
    Io(IoError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("preprocessing failed: {0}")]
    Preprocessing(PrepError),

    #[error("model error: {0}")]
    Pipeline(PipelineError),

    #[error(transparent)]
    Ml(#[from] MlError),
}

impl From<IoError> for TrainerError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::NotFound(path) => TrainerError::ArtifactNotFound(path),
            other => TrainerError::Io(other),
        }
    }
}

impl From<PipelineError> for TrainerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnknownModelType(key) => TrainerError::ModelType(key),
            PipelineError::InvalidModel(msg) => TrainerError::InvalidModel(msg),
            other => TrainerError::Pipeline(other),
        }
    }
}

impl From<PrepError> for TrainerError {
    fn from(err: PrepError) -> Self {
        match err {
            PrepError::MissingColumn(name) => TrainerError::MissingFeature(name),
            PrepError::MissingValue { column, .. } => TrainerError::MissingFeature(column),
            PrepError::InvalidValue { column, value } => TrainerError::InvalidFeature { name: column, value },
            other => TrainerError::Preprocessing(other),
        }
    }
}

pub type TrainerResult<T> = Result<T, TrainerError>;

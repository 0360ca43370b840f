//! # immo-ml
//!
//! Tabular regression for real-estate listings.
//!
//! ## Modules
//!
//! - **core**: `Matrix`, `MlError` and the `Estimator` trait
//! - **linalg**: LU decomposition with partial pivoting, linear solve
//! - **linear**: Ordinary least squares regression
//! - **tree**: CART regression tree, random forest, gradient boosting
//! - **metrics**: R², MSE, RMSE, MAE
//! - **data**: `Frame` column table, alias standardization, cleaning
//! - **preprocessing**: StandardScaler, one-hot/ordinal encoders, `Preprocessor`
//! - **io**: CSV to `Frame`, JSON artifact save/load
//! - **pipeline**: Model registry, `Regressor` variants, `ModelArtifact`

/// Matrix type, errors and the estimator trait.
pub use immo_ml_core as core;

/// Linear algebra operations.
pub use immo_ml_linalg as linalg;

/// Linear models.
pub use immo_ml_linear as linear;

/// Tree-based models.
pub use immo_ml_tree as tree;

/// Evaluation metrics.
pub use immo_ml_metrics as metrics;

/// Tabular data: frames, column aliases, cleaning.
pub use immo_ml_data as data;

/// Data preprocessing.
pub use immo_ml_preprocessing as preprocessing;

/// I/O utilities.
pub use immo_ml_io as io;

/// Model registry and artifacts.
pub use immo_ml_pipeline as pipeline;

pub mod prelude {
    pub use immo_ml_core::{Estimator, Matrix, MlError, MlResult};
    pub use immo_ml_data::{AliasTable, DatasetCleaner, Frame};
    pub use immo_ml_pipeline::{ModelArtifact, ModelKind, ModelOptions, Regressor};
    pub use immo_ml_preprocessing::{CategoricalEncoding, FeatureSchema, Preprocessor};
}

//! Dataset-wide training and price prediction for real-estate listings.
//!
//! [`DatasetTrainer`] turns every CSV file of a data directory into one
//! fitted model per configured algorithm, persisted next to its
//! preprocessor. [`PricePredictor`] reloads such a pair and scores records.

pub mod config;
pub mod errors;
pub mod logging;
pub mod predictor;
pub mod trainer;

pub use config::{FeatureSelection, TrainerConfig};
pub use errors::{TrainerError, TrainerResult};
pub use predictor::{format_price, predict_all_models, sample_listing, FeatureValue, PricePredictor, Record};
pub use trainer::{DatasetTrainer, PreparedDataset, TrainedModel, TrainingFailure, TrainingReport};

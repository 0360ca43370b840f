use std::fs;
use std::path::{Path, PathBuf};

use immo_ml::core::Estimator;
use immo_ml::data::{standardize, AliasTable, ColumnData, DatasetCleaner, Frame};
use immo_ml::io::{read_frame, save_json};
use immo_ml::metrics::{mae, r2_score, rmse};
use immo_ml::pipeline::{create_with, ModelArtifact, ModelOptions};
use immo_ml::preprocessing::{FeatureSchema, Preprocessor};
use tracing::{debug, error, info, warn};

use crate::config::{FeatureSelection, TrainerConfig};
use crate::errors::{TrainerError, TrainerResult};

/// Features and target of one dataset, row aligned and free of missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDataset {
    pub name: String,
    pub features: Frame,
    pub target: Vec<f64>,
}

impl PreparedDataset {
    pub fn n_samples(&self) -> usize {
        self.target.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub dataset: String,
    pub model_key: String,
    pub n_samples: usize,
    pub n_features: usize,
    /// In-sample scores.
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub model_path: PathBuf,
    pub preprocessor_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFailure {
    pub dataset: String,
    /// `None` when the whole dataset failed before any model was built.
    pub model_key: Option<String>,
    pub reason: String,
}

/// Outcome of [`DatasetTrainer::train_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub trained: Vec<TrainedModel>,
    pub failed: Vec<TrainingFailure>,
    /// Datasets without the target column, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl TrainingReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Trains one model per configured algorithm for every CSV dataset.
pub struct DatasetTrainer {
    config: TrainerConfig,
    aliases: AliasTable,
}

impl DatasetTrainer {
    /// Build a trainer, loading the column alias table named in `config`.
    pub fn new(config: TrainerConfig) -> TrainerResult<Self> {
        config.validate()?;
        let aliases = AliasTable::load(&config.mapping_path)
            .map_err(|e| TrainerError::Config(e.to_string()))?;
        Ok(DatasetTrainer { config, aliases })
    }

    pub fn with_aliases(config: TrainerConfig, aliases: AliasTable) -> TrainerResult<Self> {
        config.validate()?;
        Ok(DatasetTrainer { config, aliases })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train every `*.csv` file of the data directory, in file name order.
    ///
    /// Failures of one dataset or one algorithm are logged and recorded in
    /// the report; the run continues with the next one.
    pub fn train_all(&self) -> TrainerResult<TrainingReport> {
        let mut report = TrainingReport::default();
        for path in self.dataset_files()? {
            let name = dataset_name(&path);
            let frame = match read_frame(&path) {
                Ok(frame) => frame,
                Err(e) => {
                    error!(dataset = %name, "failed to load {}: {}", path.display(), e);
                    report.failed.push(TrainingFailure {
                        dataset: name,
                        model_key: None,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let prepared = match self.prepare(&name, frame) {
                Ok(prepared) => prepared,
                Err(TrainerError::TargetMissing(target)) => {
                    warn!(dataset = %name, "target '{}' not found, skipping", target);
                    report
                        .skipped
                        .push((name, format!("target '{}' not found", target)));
                    continue;
                }
                Err(e) => {
                    error!(dataset = %name, "failed to prepare dataset: {}", e);
                    report.failed.push(TrainingFailure {
                        dataset: name,
                        model_key: None,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            info!(
                dataset = %name,
                samples = prepared.n_samples(),
                columns = prepared.features.n_cols(),
                "training models"
            );
            for key in &self.config.model_types {
                match self.train_model(&prepared, key) {
                    Ok(trained) => report.trained.push(trained),
                    Err(e) => {
                        error!(dataset = %name, model = %key, "training failed: {}", e);
                        report.failed.push(TrainingFailure {
                            dataset: name.clone(),
                            model_key: Some(key.clone()),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            trained = report.trained.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "training run finished"
        );
        Ok(report)
    }

    fn dataset_files(&self) -> TrainerResult<Vec<PathBuf>> {
        let dir = &self.config.data_dir;
        let entries = fs::read_dir(dir)
            .map_err(|e| TrainerError::Config(format!("cannot read data dir {}: {}", dir.display(), e)))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Standardize, clean and split a raw dataset into aligned features and
    /// target, dropping excluded columns and incomplete rows.
    ///
    /// A row is incomplete when a numeric feature or the target is missing.
    /// Gaps in text columns are kept and encoded as an unknown category.
    pub fn prepare(&self, name: &str, frame: Frame) -> TrainerResult<PreparedDataset> {
        let target_name = self.config.target.as_str();
        let frame = standardize(&frame, &self.aliases);
        let mut features = DatasetCleaner::new(target_name).clean(&frame);

        let target = features
            .take_column(target_name)
            .ok_or_else(|| TrainerError::TargetMissing(target_name.to_string()))?;
        let ColumnData::Numeric(target) = target.data else {
            return Err(TrainerError::Dataset(format!("target '{}' is not numeric", target_name)));
        };
        features.drop_columns(&self.config.exclude_columns);
        if features.n_cols() == 0 {
            return Err(TrainerError::Dataset(format!("{}: no feature columns left", name)));
        }

        let n_raw = features.n_rows();
        let complete = features.numeric_complete_rows();
        let features = features.take_rows(&complete);
        let target: Vec<Option<f64>> = complete.iter().map(|&i| target[i]).collect();

        let keep: Vec<usize> = (0..target.len()).filter(|&i| target[i].is_some()).collect();
        let features = features.take_rows(&keep);
        let target: Vec<f64> = target.into_iter().flatten().collect();

        if target.is_empty() {
            return Err(TrainerError::Dataset(format!(
                "{}: no complete rows left out of {}",
                name, n_raw
            )));
        }
        debug!(
            dataset = name,
            kept = target.len(),
            dropped = n_raw - target.len(),
            "incomplete rows dropped"
        );

        Ok(PreparedDataset {
            name: name.to_string(),
            features,
            target,
        })
    }

    /// Fit one algorithm on a prepared dataset and persist the model and its
    /// preprocessor.
    pub fn train_model(&self, dataset: &PreparedDataset, key: &str) -> TrainerResult<TrainedModel> {
        let options = ModelOptions {
            verbosity: self.config.verbosity,
            seed: self.config.seed,
        };
        let mut regressor = create_with(key, &options)?;

        let schema = match self.config.feature_selection {
            FeatureSelection::Inferred => FeatureSchema::infer(&dataset.features),
            FeatureSelection::Declared => FeatureSchema::listing_defaults().restrict_to(&dataset.features),
        };
        let mut preprocessor = Preprocessor::new(schema, self.config.categorical_encoding);
        let x = preprocessor.fit_transform(&dataset.features)?;

        regressor.fit(&x, &dataset.target)?;
        let predictions = regressor.predict(&x)?;
        let r2 = r2_score(&dataset.target, &predictions);
        let rmse = rmse(&dataset.target, &predictions);
        let mae = mae(&dataset.target, &predictions);
        info!(
            dataset = %dataset.name,
            model = key,
            "R² = {:.3}, RMSE = {:.0}, MAE = {:.0}",
            r2,
            rmse,
            mae
        );

        let n_features = x.cols();
        let artifact = ModelArtifact::new(preprocessor.output_names(), regressor)?;
        let model_path = self.config.model_path(&dataset.name, key);
        let preprocessor_path = self.config.preprocessor_path(&dataset.name, key);
        save_json(&artifact, &model_path)?;
        save_json(&preprocessor, &preprocessor_path)?;
        info!(dataset = %dataset.name, model = key, "saved {}", model_path.display());

        Ok(TrainedModel {
            dataset: dataset.name.clone(),
            model_key: key.to_string(),
            n_samples: dataset.n_samples(),
            n_features,
            r2,
            rmse,
            mae,
            model_path,
            preprocessor_path,
        })
    }
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use immo_ml::data::Column;
    use immo_ml::preprocessing::CategoricalEncoding;

    const MAPPING: &str = r#"
columns:
  price: ["Price (€)", prijs]
  surface: ["living area(m²)"]
  town: [Town]
"#;

    fn trainer() -> DatasetTrainer {
        let aliases = AliasTable::from_yaml_str(MAPPING).unwrap();
        DatasetTrainer::with_aliases(TrainerConfig::default(), aliases).unwrap()
    }

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::text(name, values.iter().map(|v| v.map(str::to_string)).collect())
    }

    #[test]
    fn test_prepare_aligns_and_drops() {
        let frame = Frame::new(vec![
            text(
                "Price (€)",
                &[Some("€250 000"), Some("€300 000"), Some("on request"), Some("€100 000")],
            ),
            text("living area(m²)", &[Some("120 m²"), None, Some("90"), Some("60 m²")]),
            text("Town", &[Some(" Gent "), Some("Brugge"), Some("Gent"), Some("Aalst")]),
            text("url", &[Some("a"), Some("b"), Some("c"), None]),
        ])
        .unwrap();

        let prepared = trainer().prepare("immoweb", frame).unwrap();
        assert_eq!(prepared.features.column_names(), vec!["surface", "town"]);
        // Row 1 lacks a surface, row 2 lacks a price; the missing url is excluded.
        assert_eq!(prepared.target, vec![250000.0, 100000.0]);
        assert_eq!(prepared.features.n_rows(), prepared.target.len());
        assert!(prepared.features.complete_rows().len() == 2);
        assert_eq!(
            prepared.features.column("town").unwrap().data,
            ColumnData::Text(vec![Some("Gent".into()), Some("Aalst".into())])
        );
    }

    #[test]
    fn test_prepare_without_target() {
        let frame = Frame::new(vec![Column::numeric("surface", vec![Some(1.0)])]).unwrap();
        assert!(matches!(
            trainer().prepare("x", frame),
            Err(TrainerError::TargetMissing(_))
        ));
    }

    #[test]
    fn test_prepare_no_complete_rows() {
        let frame = Frame::new(vec![
            text("price", &[Some("€1"), None]),
            Column::numeric("surface", vec![None, Some(2.0)]),
        ])
        .unwrap();
        assert!(matches!(
            trainer().prepare("x", frame),
            Err(TrainerError::Dataset(_))
        ));
    }
    #[test]
    fn test_prepare_keeps_rows_with_missing_categories() {
        let n = 10;
        let price: Vec<Option<f64>> = (0..n).map(|i| Some(100_000.0 + 1_000.0 * i as f64)).collect();
        let surface: Vec<Option<f64>> = (0..n).map(|i| Some(50.0 + i as f64)).collect();
        let condition: Vec<Option<&str>> = (0..n)
            .map(|i| if i % 2 == 0 { Some("good") } else { None })
            .collect();
        let frame = Frame::new(vec![
            Column::numeric("price", price),
            Column::numeric("surface", surface),
            text("condition", &condition),
        ])
        .unwrap();

        let prepared = trainer().prepare("sparse", frame).unwrap();
        assert_eq!(prepared.target.len(), n);
        assert_eq!(prepared.features.n_rows(), n);
        assert_eq!(prepared.features.column("condition").unwrap().data.missing_count(), 5);

        let schema = FeatureSchema::infer(&prepared.features);
        assert_eq!(schema.categorical, vec!["condition"]);
        let mut one_hot = Preprocessor::new(schema.clone(), CategoricalEncoding::OneHot);
        let x = one_hot.fit_transform(&prepared.features).unwrap();
        assert_eq!(x.rows(), n);
        assert_eq!(x.at(0, 1), 1.0);
        assert_eq!(x.at(1, 1), 0.0);

        let mut ordinal = Preprocessor::new(schema, CategoricalEncoding::Ordinal);
        let x = ordinal.fit_transform(&prepared.features).unwrap();
        // Known and missing codes stay distinct after scaling.
        assert_eq!(x.at(0, 1), x.at(2, 1));
        assert_eq!(x.at(1, 1), x.at(3, 1));
        assert!(x.at(0, 1) > x.at(1, 1));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use immo_ml::preprocessing::CategoricalEncoding;
use serde::{Deserialize, Serialize};

use crate::errors::{TrainerError, TrainerResult};

/// Which columns feed the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSelection {
    /// Every remaining column; numeric ones are scaled, text ones encoded.
    #[default]
    Inferred,
    /// The declared listing features, restricted to those present.
    Declared,
}

/// Training run configuration. Every field has a default, so a YAML file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    /// Column alias table (`columns:` mapping of canonical name to aliases).
    pub mapping_path: PathBuf,
    pub target: String,
    /// Model keys to train per dataset, in order.
    pub model_types: Vec<String>,
    /// Columns never used as features.
    pub exclude_columns: Vec<String>,
    pub categorical_encoding: CategoricalEncoding,
    pub feature_selection: FeatureSelection,
    pub verbosity: u8,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            data_dir: PathBuf::from("data"),
            model_dir: PathBuf::from("local_models"),
            mapping_path: PathBuf::from("configs/feature_mapping.yaml"),
            target: "price".to_string(),
            model_types: vec!["rf".into(), "lr".into(), "dgbm".into()],
            exclude_columns: vec![
                "url".into(),
                "address".into(),
                "epc_valid_until".into(),
                "epc_score".into(),
            ],
            categorical_encoding: CategoricalEncoding::OneHot,
            feature_selection: FeatureSelection::Inferred,
            verbosity: 0,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> TrainerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TrainerError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> TrainerResult<Self> {
        let config: TrainerConfig = serde_yaml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("malformed trainer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrainerResult<()> {
        if self.target.trim().is_empty() {
            return Err(TrainerError::Config("target column name is empty".into()));
        }
        if self.model_types.is_empty() {
            return Err(TrainerError::Config("no model types configured".into()));
        }
        Ok(())
    }

    /// `{model_dir}/{key}/{dataset}_{key}.json`
    pub fn model_path(&self, dataset: &str, key: &str) -> PathBuf {
        self.model_dir.join(key).join(format!("{}_{}.json", dataset, key))
    }

    /// `{model_dir}/{key}/{dataset}_{key}_preprocessor.json`
    pub fn preprocessor_path(&self, dataset: &str, key: &str) -> PathBuf {
        self.model_dir
            .join(key)
            .join(format!("{}_{}_preprocessor.json", dataset, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.target, "price");
        assert_eq!(config.model_types, vec!["rf", "lr", "dgbm"]);
        assert_eq!(config.categorical_encoding, CategoricalEncoding::OneHot);
        assert_eq!(
            config.model_path("immoweb", "rf"),
            PathBuf::from("local_models/rf/immoweb_rf.json")
        );
        assert_eq!(
            config.preprocessor_path("immoweb", "rf"),
            PathBuf::from("local_models/rf/immoweb_rf_preprocessor.json")
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "model_dir: out\nmodel_types: [lr]\ncategorical_encoding: ordinal\nfeature_selection: declared\n";
        let config = TrainerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("out"));
        assert_eq!(config.model_types, vec!["lr"]);
        assert_eq!(config.categorical_encoding, CategoricalEncoding::Ordinal);
        assert_eq!(config.feature_selection, FeatureSelection::Declared);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            TrainerConfig::from_yaml_str("categorical_encoding: binary\n"),
            Err(TrainerError::Config(_))
        ));
        assert!(matches!(
            TrainerConfig::from_yaml_str("target: ''\n"),
            Err(TrainerError::Config(_))
        ));
        assert!(matches!(
            TrainerConfig::from_yaml_file("/no/such/config.yaml"),
            Err(TrainerError::Config(_))
        ));
    }
}

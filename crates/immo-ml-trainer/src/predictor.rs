use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use immo_ml::core::Matrix;
use immo_ml::data::{Cell, Column, Frame};
use immo_ml::io::{load_json, IoError};
use immo_ml::pipeline::ModelArtifact;
use immo_ml::preprocessing::Preprocessor;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::errors::{TrainerError, TrainerResult};

/// One feature value of an input record, as it appears in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl FeatureValue {
    fn to_cell(&self) -> Cell {
        match self {
            FeatureValue::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            FeatureValue::Number(v) => Cell::Number(*v),
            FeatureValue::Text(s) => Cell::Text(s.clone()),
            FeatureValue::Null => Cell::Missing,
        }
    }
}

/// Feature name to value. Keys the model does not use are ignored.
pub type Record = BTreeMap<String, FeatureValue>;

/// Scores records with a persisted model and, when present, its preprocessor.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    artifact: ModelArtifact,
    preprocessor: Option<Preprocessor>,
}

impl PricePredictor {
    pub fn new<P: AsRef<Path>>(model_path: P, preprocessor_path: Option<&Path>) -> TrainerResult<Self> {
        let model_path = model_path.as_ref();
        let bytes = fs::read(model_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TrainerError::ArtifactNotFound(model_path.to_path_buf())
            } else {
                TrainerError::InvalidModel(format!("{}: {}", model_path.display(), e))
            }
        })?;
        let artifact = ModelArtifact::from_bytes(&bytes)?;

        let preprocessor = match preprocessor_path {
            Some(path) => Some(load_preprocessor(path)?),
            None => None,
        };
        debug!(
            model = %model_path.display(),
            kind = %artifact.kind(),
            features = artifact.n_features(),
            preprocessor = preprocessor.is_some(),
            "predictor loaded"
        );
        Self::from_parts(artifact, preprocessor)
    }

    pub fn from_parts(artifact: ModelArtifact, preprocessor: Option<Preprocessor>) -> TrainerResult<Self> {
        if let Some(prep) = &preprocessor {
            if prep.output_names() != artifact.feature_names {
                return Err(TrainerError::InvalidModel(format!(
                    "preprocessor yields {} features that do not match the model's {}",
                    prep.output_names().len(),
                    artifact.n_features()
                )));
            }
        }
        Ok(PricePredictor {
            artifact,
            preprocessor,
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Column names a record must provide.
    pub fn required_features(&self) -> Vec<String> {
        match &self.preprocessor {
            Some(prep) => prep.schema().columns().map(str::to_string).collect(),
            None => self.artifact.feature_names.clone(),
        }
    }

    /// Predict the price of a single record.
    pub fn predict(&self, record: &Record) -> TrainerResult<f64> {
        let price = self
            .predict_batch(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| TrainerError::InvalidModel("model returned no prediction".into()))?;
        info!("Predicted price: €{}", format_price(price));
        Ok(price)
    }

    /// Predict every record; one price per record, in order.
    pub fn predict_batch(&self, records: &[Record]) -> TrainerResult<Vec<f64>> {
        let x = match &self.preprocessor {
            Some(prep) => prep.transform(&self.records_to_frame(records)?)?,
            None => self.records_to_matrix(records)?,
        };
        Ok(self.artifact.predict(&x)?)
    }

    fn records_to_frame(&self, records: &[Record]) -> TrainerResult<Frame> {
        let columns = self
            .required_features()
            .into_iter()
            .map(|name| -> TrainerResult<Column> {
                let cells = records
                    .iter()
                    .map(|r| {
                        r.get(&name)
                            .map(FeatureValue::to_cell)
                            .ok_or_else(|| TrainerError::MissingFeature(name.clone()))
                    })
                    .collect::<TrainerResult<Vec<_>>>()?;
                Ok(Column::from_cells(name, cells))
            })
            .collect::<TrainerResult<Vec<_>>>()?;
        Ok(Frame::new(columns)?)
    }

    /// Without a preprocessor the record is read in the model's own feature
    /// order and every value must already be numeric.
    fn records_to_matrix(&self, records: &[Record]) -> TrainerResult<Matrix> {
        let names = &self.artifact.feature_names;
        let mut data = Vec::with_capacity(records.len() * names.len());
        for record in records {
            for name in names {
                let value = record
                    .get(name)
                    .ok_or_else(|| TrainerError::MissingFeature(name.clone()))?;
                let v = match value {
                    FeatureValue::Number(v) => *v,
                    FeatureValue::Bool(b) => f64::from(u8::from(*b)),
                    FeatureValue::Text(s) => s.trim().parse::<f64>().map_err(|_| TrainerError::InvalidFeature {
                        name: name.clone(),
                        value: s.clone(),
                    })?,
                    FeatureValue::Null => return Err(TrainerError::MissingFeature(name.clone())),
                };
                data.push(v);
            }
        }
        Ok(Matrix::new(data, records.len(), names.len())?)
    }
}

fn load_preprocessor(path: &Path) -> TrainerResult<Preprocessor> {
    let prep: Preprocessor = load_json(path).map_err(|e| match e {
        IoError::NotFound(p) => TrainerError::ArtifactNotFound(p),
        other => TrainerError::InvalidModel(format!("preprocessor {}: {}", path.display(), other)),
    })?;
    if !prep.is_fitted() {
        return Err(TrainerError::InvalidModel(format!(
            "preprocessor {} is not fitted",
            path.display()
        )));
    }
    Ok(prep)
}

/// Round to whole euros with `,` thousands separators: `1234567.8` → `1,234,568`.
pub fn format_price(price: f64) -> String {
    let rounded = format!("{:.0}", price.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, c) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if price < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

/// Score `record` with every model under `{model_dir}/{key}/`, pairing each
/// `{name}.json` with `{name}_preprocessor.json` when that file exists.
///
/// A failing model is logged and reported; the walk continues.
pub fn predict_all_models(model_dir: &Path, record: &Record) -> TrainerResult<Vec<(PathBuf, TrainerResult<f64>)>> {
    let mut model_files = Vec::new();
    let key_dirs = fs::read_dir(model_dir)
        .map_err(|e| TrainerError::Config(format!("cannot read {}: {}", model_dir.display(), e)))?;
    for key_dir in key_dirs.filter_map(|e| e.ok().map(|e| e.path())).filter(|p| p.is_dir()) {
        let Ok(entries) = fs::read_dir(&key_dir) else {
            continue;
        };
        model_files.extend(entries.filter_map(|e| e.ok().map(|e| e.path())).filter(|p| {
            p.extension().is_some_and(|ext| ext == "json")
                && !p
                    .file_stem()
                    .is_some_and(|s| s.to_string_lossy().ends_with("_preprocessor"))
        }));
    }
    model_files.sort();

    let mut results = Vec::with_capacity(model_files.len());
    for model_path in model_files {
        let preprocessor_path = preprocessor_path_for(&model_path);
        let preprocessor = preprocessor_path.as_deref().filter(|p| p.exists());
        info!("predicting with {}", model_path.display());
        let outcome = PricePredictor::new(&model_path, preprocessor).and_then(|p| p.predict(record));
        if let Err(e) = &outcome {
            error!("prediction failed for {}: {}", model_path.display(), e);
        }
        results.push((model_path, outcome));
    }
    Ok(results)
}

fn preprocessor_path_for(model_path: &Path) -> Option<PathBuf> {
    let stem = model_path.file_stem()?.to_string_lossy();
    Some(model_path.with_file_name(format!("{}_preprocessor.json", stem)))
}

/// A typical Flemish house listing, used when no input record is given.
pub fn sample_listing() -> Record {
    let mut r = Record::new();
    let numbers = [
        ("surface", 120.0),
        ("rooms", 3.0),
        ("bedrooms", 3.0),
        ("bathrooms", 1.0),
        ("toilets", 2.0),
        ("postal_code", 8500.0),
        ("epc", 200.0),
        ("epc_total", 30000.0),
        ("terrace_surface", 10.0),
        ("bedroom1_surface", 20.0),
        ("bedroom2_surface", 15.0),
        ("year_built", 2005.0),
        ("floor", 0.0),
    ];
    for (name, v) in numbers {
        r.insert(name.to_string(), v.into());
    }
    for (name, v) in [
        ("property_type", "house"),
        ("province", "west-vlaanderen"),
        ("region", "flanders"),
        ("town", "kortrijk"),
        ("condition", "good"),
    ] {
        r.insert(name.to_string(), v.into());
    }
    r.insert("has_garden".into(), true.into());
    r.insert("has_terrace".into(), false.into());
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "0");
        assert_eq!(format_price(999.4), "999");
        assert_eq!(format_price(1000.0), "1,000");
        assert_eq!(format_price(1234567.8), "1,234,568");
        assert_eq!(format_price(-250000.0), "-250,000");
    }

    #[test]
    fn test_record_from_json() {
        let record: Record =
            serde_json::from_str(r#"{"surface": 120, "town": "Gent", "has_garden": true, "epc": null}"#).unwrap();
        assert_eq!(record["surface"], FeatureValue::Number(120.0));
        assert_eq!(record["town"], FeatureValue::Text("Gent".into()));
        assert_eq!(record["has_garden"], FeatureValue::Bool(true));
        assert_eq!(record["epc"], FeatureValue::Null);
    }

    #[test]
    fn test_preprocessor_path_for() {
        assert_eq!(
            preprocessor_path_for(Path::new("local_models/rf/immoweb_rf.json")),
            Some(PathBuf::from("local_models/rf/immoweb_rf_preprocessor.json"))
        );
    }

    #[test]
    fn test_sample_listing_has_declared_features() {
        let sample = sample_listing();
        for name in immo_ml::preprocessing::FeatureSchema::listing_defaults().columns() {
            assert!(sample.contains_key(name), "{}", name);
        }
    }
}

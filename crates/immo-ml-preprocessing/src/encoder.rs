use immo_ml_core::{Matrix, MlResult};
use serde::{Deserialize, Serialize};

/// Sorted, de-duplicated category vocabulary of one column; missing cells
/// are not a category.
fn vocabulary(values: &[Option<String>]) -> Vec<String> {
    let mut unique: Vec<String> = values.iter().flatten().cloned().collect();
    unique.sort();
    unique.dedup();
    unique
}

/// One-hot encodes a single text column.
///
/// Unknown and missing values encode as an all-zero row, so a category first
/// seen at prediction time is ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        OneHotEncoder {
            column: column.into(),
            categories: Vec::new(),
        }
    }

    pub fn fit(&mut self, values: &[Option<String>]) {
        self.categories = vocabulary(values);
    }

    pub fn transform(&self, values: &[Option<String>]) -> MlResult<Matrix> {
        let k = self.categories.len();
        let mut data = vec![0.0; values.len() * k];
        for (i, v) in values.iter().enumerate() {
            if let Some(idx) = v.as_ref().and_then(|s| self.categories.binary_search(s).ok()) {
                data[i * k + idx] = 1.0;
            }
        }
        Matrix::new(data, values.len(), k)
    }

    /// Output feature names, `{column}_{category}`.
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }
}

/// Replaces each category of one text column with its index in the sorted
/// vocabulary. Unknown and missing values map to `-1.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    pub column: String,
    pub categories: Vec<String>,
}

impl OrdinalEncoder {
    pub const UNKNOWN: f64 = -1.0;

    pub fn new(column: impl Into<String>) -> Self {
        OrdinalEncoder {
            column: column.into(),
            categories: Vec::new(),
        }
    }

    pub fn fit(&mut self, values: &[Option<String>]) {
        self.categories = vocabulary(values);
    }

    pub fn transform(&self, values: &[Option<String>]) -> Vec<f64> {
        values
            .iter()
            .map(|v| {
                v.as_ref()
                    .and_then(|s| self.categories.binary_search(s).ok())
                    .map_or(Self::UNKNOWN, |idx| idx as f64)
            })
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.categories.len()
    }
}

use immo_ml_core::Matrix;
use immo_ml_data::{ColumnData, Frame};
use serde::{Deserialize, Serialize};

use crate::encoder::{OneHotEncoder, OrdinalEncoder};
use crate::error::{PrepError, PrepResult};
use crate::scaler::StandardScaler;

/// How text columns become numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalEncoding {
    /// One indicator column per category; unknown categories encode as zeros.
    #[default]
    OneHot,
    /// One integer code per column; unknown categories encode as -1.
    Ordinal,
}

/// The input columns a [`Preprocessor`] consumes, split by treatment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureSchema {
    pub fn new<S: Into<String>>(
        numeric: impl IntoIterator<Item = S>,
        categorical: impl IntoIterator<Item = S>,
    ) -> Self {
        FeatureSchema {
            numeric: numeric.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
        }
    }

    /// Numeric columns are scaled, text columns are encoded, in frame order.
    pub fn infer(frame: &Frame) -> Self {
        let mut schema = FeatureSchema::default();
        for column in frame.columns() {
            if column.is_numeric() {
                schema.numeric.push(column.name.clone());
            } else {
                schema.categorical.push(column.name.clone());
            }
        }
        schema
    }

    /// Feature lists declared for property listings.
    pub fn listing_defaults() -> Self {
        FeatureSchema::new(
            ["surface", "bedrooms", "bathrooms", "toilets", "postal_code"],
            ["property_type", "town", "condition"],
        )
    }

    /// Keep only the columns present in `frame`.
    pub fn restrict_to(&self, frame: &Frame) -> Self {
        let keep = |names: &[String]| -> Vec<String> {
            names.iter().filter(|n| frame.contains(n)).cloned().collect()
        };
        FeatureSchema {
            numeric: keep(&self.numeric),
            categorical: keep(&self.categorical),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column transformer: standard scaling for numeric columns, one-hot or
/// ordinal encoding for categorical columns.
///
/// With ordinal encoding the integer codes join the scaled block, so the
/// output is `[scaled numeric.., scaled codes..]`. With one-hot encoding the
/// indicator columns follow the scaled numeric block unscaled.
///
/// The fitted transformer is serializable and is persisted next to the model
/// so prediction reproduces the training-time encoding exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    schema: FeatureSchema,
    encoding: CategoricalEncoding,
    scaler: StandardScaler,
    one_hot: Vec<OneHotEncoder>,
    ordinal: Vec<OrdinalEncoder>,
    fitted: bool,
}

impl Preprocessor {
    pub fn new(schema: FeatureSchema, encoding: CategoricalEncoding) -> Self {
        Preprocessor {
            schema,
            encoding,
            scaler: StandardScaler::new(),
            one_hot: Vec::new(),
            ordinal: Vec::new(),
            fitted: false,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoding(&self) -> CategoricalEncoding {
        self.encoding
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn fit(&mut self, frame: &Frame) -> PrepResult<()> {
        if self.schema.is_empty() {
            return Err(PrepError::EmptySchema);
        }
        let categories = self
            .schema
            .categorical
            .iter()
            .map(|name| category_values(frame, name))
            .collect::<PrepResult<Vec<_>>>()?;

        self.one_hot.clear();
        self.ordinal.clear();
        match self.encoding {
            CategoricalEncoding::OneHot => {
                for (name, values) in self.schema.categorical.iter().zip(&categories) {
                    let mut enc = OneHotEncoder::new(name.as_str());
                    enc.fit(values);
                    self.one_hot.push(enc);
                }
            }
            CategoricalEncoding::Ordinal => {
                for (name, values) in self.schema.categorical.iter().zip(&categories) {
                    let mut enc = OrdinalEncoder::new(name.as_str());
                    enc.fit(values);
                    self.ordinal.push(enc);
                }
            }
        }

        let scaled = self.scaled_block(frame, &categories)?;
        self.scaler.fit(&scaled)?;
        self.fitted = true;
        Ok(())
    }

    /// Produce the model matrix for `frame`. Columns outside the schema are
    /// ignored; a schema column absent from `frame` is an error.
    pub fn transform(&self, frame: &Frame) -> PrepResult<Matrix> {
        if !self.fitted {
            return Err(PrepError::NotFitted);
        }
        let categories = self
            .schema
            .categorical
            .iter()
            .map(|name| category_values(frame, name))
            .collect::<PrepResult<Vec<_>>>()?;

        let scaled = self.scaler.transform(&self.scaled_block(frame, &categories)?)?;
        match self.encoding {
            CategoricalEncoding::Ordinal => Ok(scaled),
            CategoricalEncoding::OneHot => {
                let blocks = self
                    .one_hot
                    .iter()
                    .zip(&categories)
                    .map(|(enc, values)| enc.transform(values))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut parts = vec![&scaled];
                parts.extend(blocks.iter());
                Ok(Matrix::hconcat(&parts)?)
            }
        }
    }

    pub fn fit_transform(&mut self, frame: &Frame) -> PrepResult<Matrix> {
        self.fit(frame)?;
        self.transform(frame)
    }

    /// Names of the output columns, in matrix order.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schema
            .numeric
            .iter()
            .map(|n| format!("num__{}", n))
            .collect();
        match self.encoding {
            CategoricalEncoding::OneHot => {
                for enc in &self.one_hot {
                    names.extend(enc.feature_names().into_iter().map(|n| format!("cat__{}", n)));
                }
            }
            CategoricalEncoding::Ordinal => {
                names.extend(self.schema.categorical.iter().map(|n| format!("cat__{}", n)));
            }
        }
        names
    }

    /// Numeric columns, followed by ordinal codes when encoding is ordinal.
    fn scaled_block(&self, frame: &Frame, categories: &[Vec<Option<String>>]) -> PrepResult<Matrix> {
        let n_rows = frame.n_rows();
        let mut columns = self
            .schema
            .numeric
            .iter()
            .map(|name| numeric_values(frame, name))
            .collect::<PrepResult<Vec<_>>>()?;
        if self.encoding == CategoricalEncoding::Ordinal {
            for (enc, values) in self.ordinal.iter().zip(categories) {
                columns.push(enc.transform(values));
            }
        }

        let width = columns.len();
        let mut data = Vec::with_capacity(n_rows * width);
        for i in 0..n_rows {
            data.extend(columns.iter().map(|c| c[i]));
        }
        Ok(Matrix::new(data, n_rows, width)?)
    }
}

fn numeric_values(frame: &Frame, name: &str) -> PrepResult<Vec<f64>> {
    let column = frame
        .column(name)
        .ok_or_else(|| PrepError::MissingColumn(name.to_string()))?;
    let missing = |row| PrepError::MissingValue {
        column: name.to_string(),
        row,
    };
    match &column.data {
        ColumnData::Numeric(values) => values
            .iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| missing(row)))
            .collect(),
        ColumnData::Text(values) => values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                let s = v.as_deref().ok_or_else(|| missing(row))?;
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite())
                    .ok_or_else(|| PrepError::InvalidValue {
                        column: name.to_string(),
                        value: s.to_string(),
                    })
            })
            .collect(),
    }
}

/// Category labels of a column. Numbers are rendered as text so a numeric
/// record value can still hit a category learned from text.
fn category_values(frame: &Frame, name: &str) -> PrepResult<Vec<Option<String>>> {
    let column = frame
        .column(name)
        .ok_or_else(|| PrepError::MissingColumn(name.to_string()))?;
    Ok(match &column.data {
        ColumnData::Text(values) => values.clone(),
        ColumnData::Numeric(values) => values.iter().map(|v| v.map(|x| x.to_string())).collect(),
    })
}

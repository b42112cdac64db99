//! Tabular dataset loading
//!
//! A dataset is a CSV file with a header row. The last column is the
//! target, every preceding column is a feature. Feature columns must be
//! numeric; the target keeps its storage type so the training pipeline
//! can decide between classification and regression.

use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::Path;

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{Error, Result};
use crate::preprocessing::Label;

/// Storage type of the target column, as inferred by the CSV reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStorage {
    Text,
    Integer,
    Float,
}

/// Target column values
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Text(Vec<String>),
    Integer(Vec<i64>),
    Float(Vec<f64>),
}

impl Target {
    pub fn storage(&self) -> TargetStorage {
        match self {
            Target::Text(_) => TargetStorage::Text,
            Target::Integer(_) => TargetStorage::Integer,
            Target::Float(_) => TargetStorage::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::Text(v) => v.len(),
            Target::Integer(v) => v.len(),
            Target::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct values in the column
    pub fn distinct_count(&self) -> usize {
        match self {
            Target::Text(v) => v.iter().collect::<BTreeSet<_>>().len(),
            Target::Integer(v) => v.iter().collect::<BTreeSet<_>>().len(),
            Target::Float(v) => v.iter().map(|x| x.to_bits()).collect::<BTreeSet<_>>().len(),
        }
    }

    /// Values as class labels. Floats are never treated as labels.
    pub fn labels(&self) -> Option<Vec<Label>> {
        match self {
            Target::Text(v) => Some(v.iter().cloned().map(Label::Text).collect()),
            Target::Integer(v) => Some(v.iter().copied().map(Label::Integer).collect()),
            Target::Float(_) => None,
        }
    }

    /// Values as a continuous regression target
    pub fn to_f64(&self) -> Result<Array1<f64>> {
        match self {
            Target::Text(_) => Err(Error::DataError(
                "textual target cannot be used for regression".to_string(),
            )),
            Target::Integer(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Target::Float(v) => Ok(Array1::from_vec(v.clone())),
        }
    }

    fn from_column(column: &Column) -> Result<Self> {
        let missing = || {
            Error::DataError(format!(
                "target column '{}' contains missing values",
                column.name()
            ))
        };

        match column.dtype() {
            DataType::String => {
                let values = column
                    .as_materialized_series()
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string).ok_or_else(missing))
                    .collect::<Result<Vec<String>>>()?;
                Ok(Target::Text(values))
            }
            dtype if dtype.is_integer() => {
                let as_i64 = column.cast(&DataType::Int64)?;
                let values = as_i64
                    .i64()?
                    .into_iter()
                    .map(|v| v.ok_or_else(missing))
                    .collect::<Result<Vec<i64>>>()?;
                Ok(Target::Integer(values))
            }
            dtype if dtype.is_float() || matches!(dtype, DataType::Boolean) => {
                let as_f64 = column.cast(&DataType::Float64)?;
                let values = as_f64
                    .f64()?
                    .into_iter()
                    .map(|v| v.ok_or_else(missing))
                    .collect::<Result<Vec<f64>>>()?;
                Ok(Target::Float(values))
            }
            other => Err(Error::DataError(format!(
                "unsupported target column type {:?}",
                other
            ))),
        }
    }
}

/// A loaded dataset split into a feature matrix and a target column
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    target_name: String,
    target: Target,
}

impl Dataset {
    /// Build a dataset from in-memory parts
    pub fn new(
        feature_names: Vec<String>,
        features: Array2<f64>,
        target_name: impl Into<String>,
        target: Target,
    ) -> Result<Self> {
        if feature_names.is_empty() || features.nrows() == 0 {
            return Err(Error::InsufficientData);
        }
        if features.ncols() != feature_names.len() || features.nrows() != target.len() {
            return Err(Error::ShapeError {
                expected: format!("{} rows x {} features", target.len(), feature_names.len()),
                actual: format!("{} rows x {} features", features.nrows(), features.ncols()),
            });
        }

        Ok(Self {
            feature_names,
            features,
            target_name: target_name.into(),
            target,
        })
    }

    /// Load a dataset from a CSV file on disk
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(bytes)
    }

    /// Parse a dataset from raw CSV bytes
    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::InsufficientData);
        }

        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Self::from_frame(&df)
    }

    /// Split a DataFrame into features (all but the last column) and target (last column)
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        if df.height() == 0 || df.width() < 2 {
            return Err(Error::InsufficientData);
        }

        let (target_column, feature_columns) = df
            .get_columns()
            .split_last()
            .ok_or(Error::InsufficientData)?;

        let feature_names = feature_columns
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let features = columns_to_array2(feature_columns, df.height())?;
        let target = Target::from_column(target_column)?;

        Self::new(feature_names, features, target_column.name().to_string(), target)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }
}

/// Cast feature columns to f64 and lay them out row-major.
fn columns_to_array2(columns: &[Column], n_rows: usize) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| {
            let as_f64 = column.cast(&DataType::Float64)?;
            as_f64
                .f64()?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        Error::DataError(format!(
                            "feature column '{}' contains missing or non-numeric values",
                            column.name()
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_data.len()), |(r, c)| {
        col_data[c][r]
    }))
}

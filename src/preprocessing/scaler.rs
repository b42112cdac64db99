//! Feature standardisation

use crate::error::{Error, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    name: String,
    mean: f64,
    scale: f64,
}

/// Standard scaling (z-score normalisation): (x - mean) / std
///
/// The standard deviation is the population one. Columns with zero
/// variance keep a scale of 1 so they map to 0 instead of NaN.
/// The scaler remembers the names of the columns it was fit on and
/// refuses to transform a matrix described by different names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit per-column mean and standard deviation
    pub fn fit(&mut self, x: &Array2<f64>, columns: &[String]) -> Result<&mut Self> {
        if x.ncols() != columns.len() {
            return Err(Error::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        if x.nrows() == 0 {
            return Err(Error::InsufficientData);
        }

        self.params = columns
            .iter()
            .zip(x.axis_iter(Axis(1)))
            .map(|(name, column)| {
                let mean = column.mean().unwrap_or(0.0);
                let std = column.std(0.0);
                ScalerParams {
                    name: name.clone(),
                    mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                }
            })
            .collect();

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale a matrix whose columns are in fit order
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(Error::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(Error::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut scaled = x.clone();
        for (mut column, params) in scaled.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| (v - params.mean) / params.scale);
        }
        Ok(scaled)
    }

    /// Scale a matrix after checking its column names against the fitted ones
    pub fn transform_named(&self, columns: &[&str], x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(Error::ModelNotFitted);
        }
        let matches = columns.len() == self.params.len()
            && columns.iter().zip(&self.params).all(|(c, p)| *c == p.name);
        if !matches {
            return Err(Error::FeatureMismatch {
                expected: self.feature_names(),
                actual: columns.iter().map(|c| c.to_string()).collect(),
            });
        }
        self.transform(x)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, columns: &[String]) -> Result<Array2<f64>> {
        self.fit(x, columns)?;
        self.transform(x)
    }

    /// Names of the columns seen during fit, in order
    pub fn feature_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

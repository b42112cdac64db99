//! Evaluation metrics

use ndarray::Array1;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Metric reported for a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    MeanSquaredError,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::MeanSquaredError => "mean_squared_error",
        }
    }
}

/// Held-out score of a training run.
///
/// Serializes as a single-entry map, e.g. `{"accuracy": 0.96}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub metric: Metric,
    pub score: f64,
}

impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.metric.name(), &self.score)?;
        map.end()
    }
}

/// Fraction of exact matches between true and predicted class codes
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Mean of squared residuals
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    sum / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![0.0, 1.0, 2.0, 1.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0];
        assert!((accuracy_score(&y_true, &y_pred) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_mean_squared_error() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![1.0, 3.0, 5.0];
        assert!((mean_squared_error(&y_true, &y_pred) - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(mean_squared_error(&y_true, &y_true), 0.0);
    }

    #[test]
    fn test_evaluation_serializes_as_named_score() {
        let eval = Evaluation { metric: Metric::MeanSquaredError, score: 0.25 };
        assert_eq!(
            serde_json::to_value(eval).unwrap(),
            serde_json::json!({ "mean_squared_error": 0.25 })
        );
    }
}

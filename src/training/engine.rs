//! Training engine implementation

use std::time::Instant;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::linear_models::{LinearRegression, LogisticRegression};
use super::metrics::{accuracy_score, mean_squared_error, Evaluation, Metric};
use super::split::train_test_split;
use super::{TaskKind, TrainingConfig};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::preprocessing::{LabelEncoder, StandardScaler};

/// A fitted model, tagged with its algorithm so a reader knows how to use it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
}

impl TrainedModel {
    pub fn task(&self) -> TaskKind {
        match self {
            TrainedModel::LinearRegression(_) => TaskKind::Regression,
            TrainedModel::LogisticRegression(_) => TaskKind::Classification,
        }
    }

    /// Predict on scaled features. Classifiers return class codes as `f64`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::LinearRegression(m) => m.predict(x),
            TrainedModel::LogisticRegression(m) => m.predict(x),
        }
    }
}

/// Everything a training run persists
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub model: TrainedModel,
    pub scaler: StandardScaler,
    /// Present only for classification runs
    pub label_encoder: Option<LabelEncoder>,
}

/// Result of [`TrainEngine::fit`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: TrainedArtifacts,
    pub evaluation: Evaluation,
    pub n_train: usize,
    pub n_test: usize,
}

impl TrainingOutcome {
    pub fn task(&self) -> TaskKind {
        self.artifacts.model.task()
    }
}

/// Runs the train pipeline: pick the task, encode, scale, split, fit, score.
#[derive(Debug, Clone, Default)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let task = self.config.heuristic.task_for(dataset.target());
        debug!(
            target_column = %dataset.target_name(),
            target_storage = ?dataset.target().storage(),
            task = ?task,
            "Selected task"
        );

        let (y, label_encoder) = match task {
            TaskKind::Classification => {
                let labels = dataset.target().labels().ok_or_else(|| {
                    Error::TrainingError("target column cannot be label encoded".to_string())
                })?;
                let mut encoder = LabelEncoder::new();
                let codes = encoder.fit_transform(&labels)?;
                let y: Array1<f64> = codes.into_iter().map(|c| c as f64).collect();
                (y, Some(encoder))
            }
            TaskKind::Regression => (dataset.target().to_f64()?, None),
        };

        // Statistics come from every row, before the split.
        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(dataset.features(), dataset.feature_names())?;

        let (train, test) = train_test_split(
            &x_scaled,
            &y,
            self.config.test_size,
            self.config.random_seed,
        )?;

        let model = match task {
            TaskKind::Classification => {
                let mut model = LogisticRegression::new()
                    .with_c(self.config.c)
                    .with_max_iter(self.config.max_iter)
                    .with_learning_rate(self.config.learning_rate);
                model.fit(&train.x, &train.y)?;
                TrainedModel::LogisticRegression(model)
            }
            TaskKind::Regression => {
                let mut model = LinearRegression::new();
                model.fit(&train.x, &train.y)?;
                TrainedModel::LinearRegression(model)
            }
        };

        let y_pred = model.predict(&test.x)?;
        let evaluation = match task {
            TaskKind::Classification => Evaluation {
                metric: Metric::Accuracy,
                score: accuracy_score(&test.y, &y_pred),
            },
            TaskKind::Regression => Evaluation {
                metric: Metric::MeanSquaredError,
                score: mean_squared_error(&test.y, &y_pred),
            },
        };

        info!(
            task = ?task,
            rows = dataset.n_rows(),
            features = dataset.feature_names().len(),
            n_train = train.y.len(),
            n_test = test.y.len(),
            metric = evaluation.metric.name(),
            score = evaluation.score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Training finished"
        );

        Ok(TrainingOutcome {
            artifacts: TrainedArtifacts {
                model,
                scaler,
                label_encoder,
            },
            evaluation,
            n_train: train.y.len(),
            n_test: test.y.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Target;
    use crate::training::ClassificationHeuristic;

    fn regression_dataset() -> Dataset {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| ((i * 5 + j * 11) % 17) as f64);
        let y: Vec<f64> = x.rows().into_iter().map(|r| 3.0 * r[0] - r[1] + 2.0).collect();
        Dataset::new(vec!["a".into(), "b".into()], x, "y", Target::Float(y)).unwrap()
    }

    #[test]
    fn test_regression_run() {
        let outcome = TrainEngine::default().fit(&regression_dataset()).unwrap();
        assert_eq!(outcome.task(), TaskKind::Regression);
        assert_eq!(outcome.evaluation.metric, Metric::MeanSquaredError);
        assert!(outcome.evaluation.score >= 0.0);
        assert!(outcome.evaluation.score < 1e-8);
        assert!(outcome.artifacts.label_encoder.is_none());
        assert_eq!(outcome.n_train + outcome.n_test, 30);
        assert_eq!(outcome.n_test, 9);
    }

    #[test]
    fn test_integer_target_follows_heuristic() {
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y: Vec<i64> = (0..20).map(|i| if i < 10 { 0 } else { 1 }).collect();
        let ds = Dataset::new(vec!["a".into()], x, "y", Target::Integer(y)).unwrap();

        let textual = TrainEngine::default().fit(&ds).unwrap();
        assert_eq!(textual.task(), TaskKind::Regression);

        let config = TrainingConfig::default().with_heuristic(ClassificationHeuristic::low_cardinality());
        let cardinality = TrainEngine::new(config).fit(&ds).unwrap();
        assert_eq!(cardinality.task(), TaskKind::Classification);
        assert_eq!(cardinality.evaluation.metric, Metric::Accuracy);
        assert!(cardinality.artifacts.label_encoder.is_some());
    }

    #[test]
    fn test_split_settings_apply() {
        let config = TrainingConfig::new().with_test_size(0.5).with_random_seed(7);
        let outcome = TrainEngine::new(config.clone()).fit(&regression_dataset()).unwrap();
        assert_eq!(outcome.n_test, 15);
        assert_eq!(outcome.n_train, 15);

        let again = TrainEngine::new(config).fit(&regression_dataset()).unwrap();
        assert_eq!(outcome.evaluation, again.evaluation);
    }

    #[test]
    fn test_model_serialization_keeps_kind() {
        let outcome = TrainEngine::default().fit(&regression_dataset()).unwrap();
        let json = serde_json::to_value(&outcome.artifacts.model).unwrap();
        assert_eq!(json["kind"], "linear_regression");

        let restored: TrainedModel = serde_json::from_value(json).unwrap();
        assert_eq!(restored.task(), TaskKind::Regression);
    }
}

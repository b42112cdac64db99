//! Training configuration

use serde::{Deserialize, Serialize};

use crate::dataset::{Target, TargetStorage};

/// Kind of learning problem, decided from the target column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Label-encoded target, logistic regression, scored by accuracy
    Classification,
    /// Continuous target, least squares, scored by mean squared error
    Regression,
}

/// Rule deciding whether a target column is categorical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum ClassificationHeuristic {
    /// Only textual targets are categorical
    TextualTarget,
    /// Textual targets, plus integer targets with fewer than `max_classes` distinct values
    LowCardinalityInteger { max_classes: usize },
}

impl Default for ClassificationHeuristic {
    fn default() -> Self {
        ClassificationHeuristic::TextualTarget
    }
}

impl ClassificationHeuristic {
    /// The integer-cardinality rule with its usual threshold of 20 classes
    pub fn low_cardinality() -> Self {
        ClassificationHeuristic::LowCardinalityInteger { max_classes: 20 }
    }

    pub fn task_for(&self, target: &Target) -> TaskKind {
        match (target.storage(), self) {
            (TargetStorage::Text, _) => TaskKind::Classification,
            (TargetStorage::Integer, ClassificationHeuristic::LowCardinalityInteger { max_classes })
                if target.distinct_count() < *max_classes =>
            {
                TaskKind::Classification
            }
            _ => TaskKind::Regression,
        }
    }
}

/// Configuration for one training run.
///
/// Built per request and handed to [`super::TrainEngine`]; nothing here is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test shuffle
    pub random_seed: u64,

    /// Maximum gradient steps for logistic regression
    pub max_iter: usize,

    /// Gradient step size for logistic regression
    pub learning_rate: f64,

    /// Inverse L2 regularisation strength for logistic regression
    pub c: f64,

    /// Rule used to pick classification over regression
    pub heuristic: ClassificationHeuristic,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.3,
            random_seed: 42,
            max_iter: 200,
            learning_rate: 0.5,
            c: 1.0,
            heuristic: ClassificationHeuristic::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_heuristic(mut self, heuristic: ClassificationHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }
}

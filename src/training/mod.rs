//! Model training module
//!
//! One pipeline, two models:
//! - Multinomial logistic regression for categorical targets
//! - Ordinary least squares for continuous targets
//!
//! [`TrainEngine`] decides between them with a [`ClassificationHeuristic`],
//! standardises the features, holds out a seeded test partition and
//! reports accuracy or mean squared error on it.

mod config;
mod engine;
pub mod linear_models;
pub mod metrics;
pub mod split;

pub use config::{ClassificationHeuristic, TaskKind, TrainingConfig};
pub use engine::{TrainEngine, TrainedArtifacts, TrainedModel, TrainingOutcome};
pub use linear_models::{LinearRegression, LogisticRegression};
pub use metrics::{Evaluation, Metric};

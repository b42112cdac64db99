//! Inference engine implementation

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::ArtifactStore;
use crate::error::{Error, Result};
use crate::preprocessing::{Label, LabelEncoder, StandardScaler};
use crate::training::{TaskKind, TrainedModel};

/// Column names every predict row is labelled with, whatever the model was trained on.
///
/// The scaler checks them against the names it was fit on, so a model
/// trained on any other schema refuses to predict.
pub const PREDICT_FEATURES: [&str; 4] = ["sepal.length", "sepal.width", "petal.length", "petal.width"];

/// One predicted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    /// Decoded class label of a classifier
    Class(Label),
    /// Raw output of a regressor
    Value(f64),
}

/// A loaded artifact set ready to score rows
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    model: TrainedModel,
    scaler: StandardScaler,
    label_encoder: Option<LabelEncoder>,
}

impl InferenceEngine {
    pub fn new(
        model: TrainedModel,
        scaler: StandardScaler,
        label_encoder: Option<LabelEncoder>,
    ) -> Result<Self> {
        if model.task() == TaskKind::Classification && label_encoder.is_none() {
            return Err(Error::ArtifactMissing("label encoder".to_string()));
        }
        Ok(Self {
            model,
            scaler,
            label_encoder,
        })
    }

    /// Load model, label encoder and scaler, in that order.
    ///
    /// The label encoder is part of every servable artifact set, so a
    /// models directory left with only a regression run's files fails
    /// with [`Error::ArtifactMissing`].
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let model = store.load_model()?;
        let label_encoder = store.load_label_encoder()?;
        let scaler = store.load_scaler()?;
        debug!(dir = %store.dir().display(), task = ?model.task(), "Artifacts loaded");
        Self::new(model, scaler, Some(label_encoder))
    }

    pub fn task(&self) -> TaskKind {
        self.model.task()
    }

    /// Score one row given in [`PREDICT_FEATURES`] order.
    pub fn predict_row(&self, values: &[f64]) -> Result<Vec<Prediction>> {
        if values.len() != PREDICT_FEATURES.len() {
            return Err(Error::ShapeError {
                expected: format!("{} values", PREDICT_FEATURES.len()),
                actual: format!("{} values", values.len()),
            });
        }
        let row = Array2::from_shape_vec((1, values.len()), values.to_vec())?;
        let scaled = self.scaler.transform_named(&PREDICT_FEATURES, &row)?;
        let raw = self.model.predict(&scaled)?;

        match &self.label_encoder {
            Some(encoder) if self.task() == TaskKind::Classification => {
                let codes: Vec<usize> = raw.iter().map(|&c| c as usize).collect();
                Ok(encoder
                    .inverse_transform(&codes)?
                    .into_iter()
                    .map(Prediction::Class)
                    .collect())
            }
            _ => Ok(raw.iter().copied().map(Prediction::Value).collect()),
        }
    }
}

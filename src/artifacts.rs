//! Persisted training artifacts
//!
//! A models directory holds at most three files with fixed names:
//! `model.pkl`, `scaler.pkl` and, after a classification run,
//! `label_encoder.pkl`. Each training run overwrites them. Contents are
//! serde JSON; every file is replaced through a write-then-rename.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::training::{TrainedArtifacts, TrainedModel};
use crate::utils::write_atomic;

pub const MODEL_FILE: &str = "model.pkl";
pub const SCALER_FILE: &str = "scaler.pkl";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.pkl";

/// Reads and writes the artifact files of one models directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    pub fn label_encoder_path(&self) -> PathBuf {
        self.dir.join(LABEL_ENCODER_FILE)
    }

    /// Persist a training run. Returns the model file path.
    ///
    /// A regression run leaves any earlier label encoder file in place.
    pub fn save(&self, artifacts: &TrainedArtifacts) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let model_path = self.model_path();
        write_json(&model_path, &artifacts.model)?;
        write_json(&self.scaler_path(), &artifacts.scaler)?;
        if let Some(encoder) = &artifacts.label_encoder {
            write_json(&self.label_encoder_path(), encoder)?;
        }

        debug!(dir = %self.dir.display(), "Artifacts written");
        Ok(model_path)
    }

    pub fn load_model(&self) -> Result<TrainedModel> {
        read_json(&self.model_path(), MODEL_FILE)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler> {
        read_json(&self.scaler_path(), SCALER_FILE)
    }

    pub fn load_label_encoder(&self) -> Result<LabelEncoder> {
        read_json(&self.label_encoder_path(), LABEL_ENCODER_FILE)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, name: &str) -> Result<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ArtifactMissing(name.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::Label;
    use crate::training::LinearRegression;
    use ndarray::array;

    fn regression_artifacts() -> TrainedArtifacts {
        let mut model = LinearRegression::new();
        model.fit(&array![[0.0], [1.0], [2.0]], &array![1.0, 3.0, 5.0]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[0.0], [1.0], [2.0]], &["x".to_string()]).unwrap();
        TrainedArtifacts {
            model: TrainedModel::LinearRegression(model),
            scaler,
            label_encoder: None,
        }
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(store.load_model(), Err(Error::ArtifactMissing(name)) if name == MODEL_FILE));
        assert!(matches!(store.load_scaler(), Err(Error::ArtifactMissing(_))));
        assert!(matches!(store.load_label_encoder(), Err(Error::ArtifactMissing(_))));
    }

    #[test]
    fn test_save_regression_skips_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let path = store.save(&regression_artifacts()).unwrap();

        assert_eq!(path, store.model_path());
        assert!(store.model_path().exists());
        assert!(store.scaler_path().exists());
        assert!(!store.label_encoder_path().exists());
        assert!(store.load_model().is_ok());
        assert_eq!(store.load_scaler().unwrap().feature_names(), vec!["x".to_string()]);
    }

    #[test]
    fn test_save_writes_encoder_for_classification() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut artifacts = regression_artifacts();
        let mut encoder = LabelEncoder::new();
        encoder.fit(&[Label::Text("a".into()), Label::Text("b".into())]).unwrap();
        artifacts.label_encoder = Some(encoder.clone());

        store.save(&artifacts).unwrap();
        assert_eq!(store.load_label_encoder().unwrap(), encoder);
    }

    #[test]
    fn test_corrupt_artifact_is_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(store.model_path(), b"not json").unwrap();
        assert!(matches!(store.load_model(), Err(Error::SerializationError(_))));
    }
}

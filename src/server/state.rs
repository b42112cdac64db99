//! Application state management

use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::artifacts::ArtifactStore;
use crate::training::TrainingConfig;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub store: ArtifactStore,
    /// Template for the per-request training configuration
    pub training: TrainingConfig,
    /// `/train` holds it for writing while it replaces the artifact set,
    /// `/predict` holds it for reading while it loads that set.
    pub artifacts_lock: RwLock<()>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_training(config, TrainingConfig::default())
    }

    pub fn with_training(config: ServerConfig, training: TrainingConfig) -> Self {
        let store = ArtifactStore::new(&config.models_dir);
        Self {
            config,
            store,
            training,
            artifacts_lock: RwLock::new(()),
        }
    }

    /// Location of an uploaded dataset, by its stored name
    pub fn upload_path(&self, filename: &str) -> PathBuf {
        PathBuf::from(&self.config.upload_dir).join(filename)
    }
}

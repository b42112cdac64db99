//! HTTP request handlers

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::artifacts::SCALER_FILE;
use crate::dataset::Dataset;
use crate::error::Error;
use crate::inference::InferenceEngine;
use crate::training::{Evaluation, TrainEngine, TrainingOutcome};
use crate::utils::write_atomic;

use super::error::{Result, ServerError};
use super::state::AppState;
use super::uploads::{allowed_file, secure_filename};

// ============================================================================
// Liveness
// ============================================================================

pub async fn index() -> &'static str {
    "The server is running!"
}

// ============================================================================
// Upload
// ============================================================================

/// Store the multipart part named `file` in the upload directory
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let client_name = field.file_name().unwrap_or_default().to_string();
        if client_name.is_empty() {
            return Err(ServerError::BadRequest("No selected file".to_string()));
        }

        let filename = secure_filename(&client_name);
        if !allowed_file(&client_name) || !allowed_file(&filename) {
            warn!(filename = %client_name, "Rejected upload with disallowed file type");
            return Err(ServerError::BadRequest("File type not allowed".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        tokio::fs::create_dir_all(&state.config.upload_dir).await?;
        let path = state.upload_path(&filename);
        let size = data.len();
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;

        info!(filename = %filename, bytes = size, "File uploaded successfully");
        return Ok(Json(json!({
            "message": "File uploaded successfully",
            "filename": filename,
        })));
    }

    Err(ServerError::BadRequest("No file part".to_string()))
}

// ============================================================================
// Training
// ============================================================================

#[derive(Deserialize, Default)]
pub struct TrainRequest {
    filename: Option<String>,
}

pub async fn train_model(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>> {
    let request: TrainRequest = parse_json_body(&body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let filename = request
        .filename
        .as_deref()
        .map(secure_filename)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ServerError::NotFound("File not found".to_string()))?;

    let path = state.upload_path(&filename);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ServerError::NotFound("File not found".to_string()));
    }

    info!(filename = %filename, "Training started");
    let config = state.training.clone();
    let outcome = run_blocking(move || {
        let dataset = Dataset::from_csv_path(&path)?;
        TrainEngine::new(config).fit(&dataset)
    })
    .await?;

    let TrainingOutcome { artifacts, evaluation, .. } = outcome;
    let model_path = {
        let _guard = state.artifacts_lock.write().await;
        let store = state.store.clone();
        run_blocking(move || store.save(&artifacts)).await?
    };

    Ok(Json(train_response(evaluation, &model_path)))
}

fn train_response(evaluation: Evaluation, model_path: &Path) -> Value {
    json!({
        "message": "Model trained successfully",
        "model_path": model_path.display().to_string(),
        "evaluation": evaluation,
    })
}

/// Run a pipeline step off the async runtime and map its errors to HTTP ones
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> crate::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Error::InsufficientData)) => {
            Err(ServerError::BadRequest(Error::InsufficientData.to_string()))
        }
        Ok(Err(e)) => Err(ServerError::Training(e.to_string())),
        Err(e) => Err(ServerError::Training(e.to_string())),
    }
}

// ============================================================================
// Prediction
// ============================================================================

#[derive(Deserialize, Default)]
pub struct PredictRequest {
    data: Option<Value>,
}

/// Deserialize a JSON request body; an empty body reads as the default request
fn parse_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> serde_json::Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

fn artifact_not_found(name: &str) -> ServerError {
    if name == SCALER_FILE {
        ServerError::NotFound("Scaler not found".to_string())
    } else {
        ServerError::NotFound("Model or Label Encoder not found".to_string())
    }
}

fn load_error(e: Error) -> ServerError {
    match e {
        Error::ArtifactMissing(name) => artifact_not_found(&name),
        other => ServerError::Prediction(other.to_string()),
    }
}

/// Checks run in a fixed order: model and label encoder present (404),
/// request data present (400), scaler present (404), then the row is scored.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>> {
    let (engine, data) = {
        let _guard = state.artifacts_lock.read().await;
        let store = &state.store;

        let model = store.load_model().map_err(load_error)?;
        let label_encoder = store.load_label_encoder().map_err(load_error)?;

        let data = parse_json_body::<PredictRequest>(&body)
            .ok()
            .and_then(|request| match request.data {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) if items.is_empty() => None,
                Some(other) => Some(other),
            })
            .ok_or_else(|| ServerError::BadRequest("No data provided".to_string()))?;

        let scaler = store.load_scaler().map_err(load_error)?;
        let engine = InferenceEngine::new(model, scaler, Some(label_encoder)).map_err(load_error)?;
        (engine, data)
    };

    let values: Vec<f64> =
        serde_json::from_value(data).map_err(|e| ServerError::Prediction(e.to_string()))?;

    let prediction = engine
        .predict_row(&values)
        .map_err(|e| ServerError::Prediction(e.to_string()))?;

    info!(task = ?engine.task(), "Prediction served");
    Ok(Json(json!({ "prediction": prediction })))
}

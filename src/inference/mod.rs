//! Inference engine module
//!
//! Loads the persisted artifact set and scores single rows against the
//! fixed four-column predict schema.

mod engine;

pub use engine::{InferenceEngine, Prediction, PREDICT_FEATURES};

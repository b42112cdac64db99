//! csvml - CSV in, linear model out
//!
//! A small HTTP service that accepts CSV uploads, trains a linear or
//! logistic regression on the last column of an uploaded file, and
//! serves predictions from the most recently trained model.
//!
//! # Modules
//!
//! - [`dataset`] - CSV loading into a feature matrix and a target column
//! - [`preprocessing`] - Standard scaling and label encoding
//! - [`training`] - Task selection, split, model fitting and evaluation
//! - [`artifacts`] - Persistence of the model, scaler and label encoder
//! - [`inference`] - Scoring rows with a stored artifact set
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Pipeline
pub mod dataset;
pub mod preprocessing;
pub mod training;
pub mod artifacts;
pub mod inference;

// Services
pub mod server;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{Error, Result};

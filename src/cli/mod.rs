//! csvml CLI Module
//!
//! Command-line interface for serving the API and for running the
//! train and predict pipelines directly against a models directory.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::ArtifactStore;
use crate::dataset::Dataset;
use crate::inference::{InferenceEngine, Prediction, PREDICT_FEATURES};
use crate::server::{DEFAULT_MODELS_DIR, ServerConfig};
use crate::training::{ClassificationHeuristic, TaskKind, TrainEngine, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible = console_width(content);
    let pad = W.saturating_sub(visible);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let total_pad = W.saturating_sub(console_width(content));
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

/// Printable width of a string that may carry ANSI color codes
fn console_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        width += 1;
    }
    width
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "csvml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upload CSV datasets, train linear models on them, and serve predictions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (the default when no command is given)
    Serve {
        /// Server port [env: API_PORT, default 5000]
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host [env: API_HOST, default 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Directory for uploaded CSV files [env: UPLOAD_DIR]
        #[arg(long)]
        upload_dir: Option<String>,

        /// Directory for model artifacts [env: MODELS_DIR]
        #[arg(long)]
        models_dir: Option<String>,

        /// Maximum request body size in bytes [env: MAX_UPLOAD_SIZE]
        #[arg(long)]
        max_upload_size: Option<usize>,
    },

    /// Train on a CSV file and write the artifact set
    Train {
        /// Input CSV file; the last column is the target
        #[arg(short, long)]
        data: PathBuf,

        /// Directory to write model artifacts into
        #[arg(long, default_value = DEFAULT_MODELS_DIR)]
        models_dir: PathBuf,

        /// Also treat integer targets with few distinct values as classes
        #[arg(long)]
        cardinality_heuristic: bool,
    },

    /// Score one row with the stored artifact set
    Predict {
        /// Comma-separated feature values: sepal.length,sepal.width,petal.length,petal.width
        #[arg(short, long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Directory holding model artifacts
        #[arg(long, default_value = DEFAULT_MODELS_DIR)]
        models_dir: PathBuf,
    },
}

/// Overrides layered on top of the environment-derived [`ServerConfig`]
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<String>,
    pub models_dir: Option<String>,
    pub max_upload_size: Option<usize>,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            upload_dir: self.upload_dir.unwrap_or(defaults.upload_dir),
            models_dir: self.models_dir.unwrap_or(defaults.models_dir),
            max_upload_size: self.max_upload_size.unwrap_or(defaults.max_upload_size),
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    models_dir: &Path,
    cardinality_heuristic: bool,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = Dataset::from_csv_path(data_path)?;
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.n_rows(),
        dataset.feature_names().len(),
        start.elapsed()
    ));

    let heuristic = if cardinality_heuristic {
        ClassificationHeuristic::low_cardinality()
    } else {
        ClassificationHeuristic::default()
    };
    let config = TrainingConfig::new().with_heuristic(heuristic);

    step_run(&format!("Training on {}", dataset.target_name().cyan()));
    let start = Instant::now();
    let outcome = TrainEngine::new(config).fit(&dataset)?;
    step_done(&format!("{:?}", start.elapsed()));

    let store = ArtifactStore::new(models_dir);
    let model_path = store.save(&outcome.artifacts)?;
    step_ok(&format!("Artifacts written to {}", model_path.display()));

    let task = match outcome.task() {
        TaskKind::Classification => "logistic regression",
        TaskKind::Regression => "linear regression",
    };

    println!();
    println!("  {:<20} {}", muted("Model"), task.white());
    if let Some(encoder) = &outcome.artifacts.label_encoder {
        println!("  {:<20} {}", muted("Classes"), encoder.n_classes().to_string().white());
    }
    println!("  {:<20} {}", muted("Train / test rows"), format!("{} / {}", outcome.n_train, outcome.n_test).white());
    println!(
        "  {:<20} {}",
        muted(outcome.evaluation.metric.name()),
        format!("{:.4}", outcome.evaluation.score).white().bold()
    );
    println!();

    Ok(())
}

pub fn cmd_predict(values: &[f64], models_dir: &Path) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let store = ArtifactStore::new(models_dir);
    let engine = InferenceEngine::load(&store)?;
    step_done(&format!("{:?}", engine.task()));

    let prediction = engine.predict_row(values)?;

    println!();
    for (name, value) in PREDICT_FEATURES.iter().zip(values) {
        println!("  {:<16} {}", muted(name), value.to_string().white());
    }
    for p in &prediction {
        let shown = match p {
            Prediction::Class(label) => label.to_string(),
            Prediction::Value(v) => format!("{:.4}", v),
        };
        println!("  {:<16} {}", muted("prediction"), shown.white().bold());
    }
    println!();

    Ok(())
}

pub async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    use crate::server::run_server;

    let config = args.into_config();
    let base = format!("http://{}:{}", config.host, config.port);

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "csvml".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Status ", &format!("{}/", base)));
    line_box(&kv("Upload ", &format!("{}/upload", base)));
    line_box(&kv("Train  ", &format!("{}/train", base)));
    line_box(&kv("Predict", &format!("{}/predict", base)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_width_ignores_color_codes() {
        colored::control::set_override(true);
        let painted = format!("{}", "abc".red());
        assert_eq!(console_width(&painted), 3);
        assert_eq!(console_width("plain"), 5);
    }

    #[test]
    fn test_serve_args_override_defaults() {
        let config = ServeArgs {
            port: Some(6123),
            models_dir: Some("elsewhere".to_string()),
            ..Default::default()
        }
        .into_config();
        assert_eq!(config.port, 6123);
        assert_eq!(config.models_dir, "elsewhere");
    }

    #[test]
    fn test_parse_predict_values() {
        let cli = Cli::try_parse_from(["csvml", "predict", "--values", "5.1,3.5,1.4,0.2"]).unwrap();
        match cli.command {
            Some(Commands::Predict { values, models_dir }) => {
                assert_eq!(values, vec![5.1, 3.5, 1.4, 0.2]);
                assert_eq!(models_dir, PathBuf::from("models"));
            }
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn test_no_command_means_serve() {
        let cli = Cli::try_parse_from(["csvml"]).unwrap();
        assert!(cli.command.is_none());
    }
}

//! csvml - Main Entry Point
//!
//! Starts the HTTP API by default; `train` and `predict` run the
//! pipelines locally.

use clap::Parser;
use csvml::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "csvml=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host, upload_dir, models_dir, max_upload_size }) => {
            cmd_serve(ServeArgs { host, port, upload_dir, models_dir, max_upload_size }).await?;
        }
        Some(Commands::Train { data, models_dir, cardinality_heuristic }) => {
            cmd_train(&data, &models_dir, cardinality_heuristic)?;
        }
        Some(Commands::Predict { values, models_dir }) => {
            cmd_predict(&values, &models_dir)?;
        }
        None => {
            cmd_serve(ServeArgs::default()).await?;
        }
    }

    Ok(())
}

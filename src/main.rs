//! Timed tic-tac-toe - terminal front end
//!
//! Thin view over the session driver: keys become commands, session
//! events become screen updates.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::path::Path;
use timed_tictactoe::GameConfig;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(&cli.config)?.with_overrides(cli.size, cli.seconds);
    config.validate()?;

    initialize_tracing(&cli.log_file)?;
    info!(?config, "Starting timed tic-tac-toe");

    tui::run_tui(config).await
}

/// Sends log output to a file so it does not draw over the terminal UI.
fn initialize_tracing(log_file: &Path) -> Result<()> {
    let file = std::fs::File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init();

    Ok(())
}

#[instrument(skip(path), fields(path = %path.display()))]
fn load_config(path: &Path) -> Result<GameConfig> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        Ok(GameConfig::default())
    }
}

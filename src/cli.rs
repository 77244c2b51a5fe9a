//! Command-line interface for timed_tictactoe.

use clap::Parser;
use std::path::PathBuf;

/// Timed tic-tac-toe - two players, one keyboard, two clocks
#[derive(Parser, Debug)]
#[command(name = "timed_tictactoe")]
#[command(about = "N×N tic-tac-toe with per-player turn clocks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Board size (overrides the config file)
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Seconds on each player's clock (overrides the config file)
    #[arg(short = 't', long)]
    pub seconds: Option<u64>,

    /// Path to a TOML config file with `board_size` and `turn_seconds`
    #[arg(short, long, default_value = "timed_tictactoe.toml")]
    pub config: PathBuf,

    /// File that receives log output while the terminal UI is running
    #[arg(long, default_value = "timed_tictactoe.log")]
    pub log_file: PathBuf,
}

//! Game configuration: board size and per-player turn duration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;
use tracing::{debug, info, instrument};

/// Board sizes offered by the setup screen.
pub const CANONICAL_SIZES: [usize; 3] = [3, 4, 5];

/// Largest board side length a session accepts.
pub const MAX_BOARD_SIZE: usize = 32;

/// Default board size.
pub const DEFAULT_BOARD_SIZE: usize = 3;

/// Default seconds on each player's clock.
pub const DEFAULT_TURN_SECONDS: u64 = 20;

/// Settings fixed for the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square board.
    #[serde(default = "default_board_size")]
    board_size: usize,

    /// Seconds on each player's countdown.
    #[serde(default = "default_turn_seconds")]
    turn_seconds: u64,
}

fn default_board_size() -> usize {
    DEFAULT_BOARD_SIZE
}

fn default_turn_seconds() -> u64 {
    DEFAULT_TURN_SECONDS
}

impl GameConfig {
    /// Creates a configuration. Call [`validate`](Self::validate) before use.
    #[instrument]
    pub fn new(board_size: usize, turn_seconds: u64) -> Self {
        Self {
            board_size,
            turn_seconds,
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys fall back to the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            board_size = config.board_size,
            turn_seconds = config.turn_seconds,
            "Config loaded"
        );
        Ok(config)
    }

    /// Returns a copy with any provided values replacing the current ones.
    pub fn with_overrides(self, board_size: Option<usize>, turn_seconds: Option<u64>) -> Self {
        Self {
            board_size: board_size.unwrap_or(self.board_size),
            turn_seconds: turn_seconds.unwrap_or(self.turn_seconds),
        }
    }

    /// Rejects a board outside 1×1 to [`MAX_BOARD_SIZE`] squared, or a
    /// zero-second clock.
    #[instrument]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < 1 {
            return Err(ConfigError::new(format!(
                "Board size must be at least 1, got {}",
                self.board_size
            )));
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::new(format!(
                "Board size must be at most {}, got {}",
                MAX_BOARD_SIZE, self.board_size
            )));
        }
        if self.turn_seconds == 0 {
            return Err(ConfigError::new(
                "Turn duration must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Turn duration as a [`Duration`].
    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_seconds)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE, DEFAULT_TURN_SECONDS)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

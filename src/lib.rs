//! Timed tic-tac-toe library - N×N boards with per-player turn clocks
//!
//! Two players share one device. Each has a countdown that only runs on
//! their own turn; when it reaches zero the turn passes to the opponent.
//!
//! # Architecture
//!
//! - **Games**: board types and the win/draw rules
//! - **Timer**: pausable countdowns and the turn clock that pairs them
//! - **Session**: the state machine the view talks to
//! - **Driver**: the task that serializes view commands and timer events
//!
//! # Example
//!
//! ```no_run
//! use timed_tictactoe::{Command, GameConfig, spawn_session};
//!
//! # async fn example() {
//! let (events_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! let (commands, _driver) = spawn_session(events_tx);
//!
//! commands.send(Command::Start(GameConfig::new(3, 20))).ok();
//! commands.send(Command::CellActivated { row: 1, col: 1 }).ok();
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod driver;
mod games;
mod invariants;
mod session;
mod timer;

// Crate-level exports - Configuration
pub use config::{
    CANONICAL_SIZES, ConfigError, DEFAULT_BOARD_SIZE, DEFAULT_TURN_SECONDS, GameConfig,
    MAX_BOARD_SIZE,
};

// Crate-level exports - Driver
pub use driver::{Command, SessionDriver, spawn_session};

// Crate-level exports - Session
pub use session::{
    GameSession, GameStatus, MoveError, MoveOutcome, SessionEvent, StatusChange, TurnCause,
};

// Crate-level exports - Invariants
pub use invariants::{
    ActivePlayerClock, Invariant, InvariantSet, InvariantViolation, SessionInvariants,
    SettledClocks, SingleRunningClock,
};

// Crate-level exports - Timers
pub use timer::{
    ClockEvent, ClockEventKind, ClockSignal, CountdownTimer, TICK, TimerState, TurnClock,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{Board, Cell, Mark, PlaceError, check_draw, check_win};

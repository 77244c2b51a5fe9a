//! Session driver: the single task that owns a [`GameSession`].
//!
//! View commands and timer events arrive on two channels and are applied
//! one at a time, each running to completion before the next. This is
//! what lets the session go without locks while two timers tick.

use crate::config::GameConfig;
use crate::session::{GameSession, SessionEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Requests from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a game with the given settings.
    Start(GameConfig),
    /// The player to move picked a cell.
    CellActivated {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
    /// Abandon the current game.
    Reset,
    /// Stop the driver.
    Shutdown,
}

/// Drives a [`GameSession`] from view commands and timer events.
pub struct SessionDriver {
    session: GameSession,
    commands: UnboundedReceiver<Command>,
    clock_rx: UnboundedReceiver<crate::timer::ClockEvent>,
}

impl SessionDriver {
    /// Creates a driver reading `commands` and reporting on `events`.
    pub fn new(commands: UnboundedReceiver<Command>, events: UnboundedSender<SessionEvent>) -> Self {
        let (clock_tx, clock_rx) = mpsc::unbounded_channel();
        Self {
            session: GameSession::new(clock_tx, events),
            commands,
            clock_rx,
        }
    }

    /// Runs until [`Command::Shutdown`] or until every command sender is gone.
    #[instrument(skip_all)]
    pub async fn run(mut self) {
        info!("Session driver running");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                Some(event) = self.clock_rx.recv() => {
                    self.session.handle_clock_event(event);
                }
            }
        }

        self.session.reset();
        info!("Session driver stopped");
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "Applying command");
        match command {
            Command::Start(config) => {
                if let Err(e) = self.session.start(config) {
                    warn!(error = %e, "Rejected game settings");
                }
            }
            Command::CellActivated { row, col } => {
                if let Err(e) = self.session.apply_move(row, col) {
                    debug!(error = %e, row, col, "Move ignored");
                }
            }
            Command::Reset => self.session.reset(),
            Command::Shutdown => {}
        }
    }
}

/// Spawns a driver task for a fresh session.
///
/// Returns the command sender for the view and the driver's handle.
#[instrument(skip_all)]
pub fn spawn_session(events: UnboundedSender<SessionEvent>) -> (UnboundedSender<Command>, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let driver = SessionDriver::new(command_rx, events);
    let handle = tokio::spawn(driver.run());
    (command_tx, handle)
}

//! Application state: a mirror of the session fed by its events.

use super::input::{Cursor, move_cursor};
use crossterm::event::KeyCode;
use timed_tictactoe::{
    CANONICAL_SIZES, Command, GameConfig, Mark, SessionEvent, StatusChange,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

/// Step for adjusting the turn duration on the setup screen.
const SECONDS_STEP: u64 = 5;

/// Longest turn duration offered on the setup screen.
const MAX_SECONDS: u64 = 600;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Choosing board size and turn duration.
    Setup,
    /// A game is running.
    Playing,
    /// The game ended; the result is shown over the board.
    GameOver,
}

/// Main application state.
pub struct App {
    screen: Screen,
    setup: GameConfig,
    size: usize,
    cells: Vec<Option<Mark>>,
    cursor: Cursor,
    status: String,
    remaining_x: u64,
    remaining_o: u64,
    outcome: Option<StatusChange>,
    commands: UnboundedSender<Command>,
    should_quit: bool,
}

impl App {
    /// Creates the app on the setup screen, preset to `setup`.
    pub fn new(setup: GameConfig, commands: UnboundedSender<Command>) -> Self {
        Self {
            screen: Screen::Setup,
            setup,
            size: 0,
            cells: Vec::new(),
            cursor: (0, 0),
            status: "Choose board size and timer".to_string(),
            remaining_x: *setup.turn_seconds(),
            remaining_o: *setup.turn_seconds(),
            outcome: None,
            commands,
            should_quit: false,
        }
    }

    /// Current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Settings the next game will start with.
    pub fn setup(&self) -> &GameConfig {
        &self.setup
    }

    /// Board side length of the running game.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Mark at `(row, col)` in the running game.
    pub fn cell(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells.get(row * self.size + col).copied().flatten()
    }

    /// Highlighted cell.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Status line text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Last reading of `player`'s clock.
    pub fn remaining(&self, player: Mark) -> u64 {
        match player {
            Mark::X => self.remaining_x,
            Mark::O => self.remaining_o,
        }
    }

    /// How the last game ended, if it has.
    pub fn outcome(&self) -> Option<StatusChange> {
        self.outcome
    }

    /// True once the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Updates the mirror from a session event.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Started { size, turn_seconds } => {
                self.size = size;
                self.cells = vec![None; size * size];
                self.cursor = (0, 0);
                self.remaining_x = turn_seconds;
                self.remaining_o = turn_seconds;
                self.outcome = None;
                self.screen = Screen::Playing;
            }
            SessionEvent::BoardChanged { row, col, mark } => {
                if let Some(cell) = self.cells.get_mut(row * self.size + col) {
                    *cell = Some(mark);
                }
            }
            SessionEvent::StatusChanged(change) => {
                self.status = change.to_string();
                if matches!(change, StatusChange::Won(_) | StatusChange::Draw) {
                    self.outcome = Some(change);
                    self.screen = Screen::GameOver;
                }
            }
            SessionEvent::TimerTick {
                player,
                remaining_secs,
            } => match player {
                Mark::X => self.remaining_x = remaining_secs,
                Mark::O => self.remaining_o = remaining_secs,
            },
            SessionEvent::Reset => {
                self.screen = Screen::Setup;
                self.outcome = None;
                self.status = "Choose board size and timer".to_string();
            }
        }
    }

    /// Handles a key press on the current screen.
    #[instrument(skip(self))]
    pub fn handle_key(&mut self, key: KeyCode) {
        if key == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Setup => self.handle_setup_key(key),
            Screen::Playing => match key {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let (row, col) = self.cursor;
                    self.send(Command::CellActivated { row, col });
                }
                KeyCode::Char('r') => self.send(Command::Reset),
                _ => self.cursor = move_cursor(self.cursor, key, self.size),
            },
            Screen::GameOver => {
                if key == KeyCode::Char('r') {
                    self.send(Command::Reset);
                }
            }
        }
    }

    fn handle_setup_key(&mut self, key: KeyCode) {
        let size = *self.setup.board_size();
        let seconds = *self.setup.turn_seconds();

        match key {
            KeyCode::Left | KeyCode::Right => {
                let forward = key == KeyCode::Right;
                self.setup = self.setup.with_overrides(Some(cycle_size(size, forward)), None);
            }
            KeyCode::Up => {
                let next = (seconds + SECONDS_STEP).min(MAX_SECONDS);
                self.setup = self.setup.with_overrides(None, Some(next));
            }
            KeyCode::Down => {
                let next = seconds.saturating_sub(SECONDS_STEP).max(SECONDS_STEP);
                self.setup = self.setup.with_overrides(None, Some(next));
            }
            KeyCode::Enter => self.send(Command::Start(self.setup)),
            _ => {}
        }
    }

    fn send(&self, command: Command) {
        debug!(?command, "Sending command");
        if self.commands.send(command).is_err() {
            warn!("Session driver is gone");
        }
    }
}

/// Steps through the canonical sizes; a custom size jumps to the nearest end.
fn cycle_size(size: usize, forward: bool) -> usize {
    match CANONICAL_SIZES.iter().position(|s| *s == size) {
        Some(idx) if forward => CANONICAL_SIZES[(idx + 1) % CANONICAL_SIZES.len()],
        Some(idx) => CANONICAL_SIZES[(idx + CANONICAL_SIZES.len() - 1) % CANONICAL_SIZES.len()],
        None if forward => CANONICAL_SIZES[0],
        None => CANONICAL_SIZES[CANONICAL_SIZES.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timed_tictactoe::TurnCause;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn app() -> (App, UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(GameConfig::default(), tx), rx)
    }

    #[test]
    fn test_cycle_size() {
        assert_eq!(cycle_size(3, true), 4);
        assert_eq!(cycle_size(5, true), 3);
        assert_eq!(cycle_size(3, false), 5);
        assert_eq!(cycle_size(7, true), 3);
    }

    #[test]
    fn test_setup_keys_adjust_config() {
        let (mut app, mut rx) = app();
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Up);
        assert_eq!(*app.setup(), GameConfig::new(4, 25));

        app.handle_key(KeyCode::Enter);
        assert_eq!(rx.try_recv().unwrap(), Command::Start(GameConfig::new(4, 25)));
    }

    #[test]
    fn test_duration_never_drops_below_step() {
        let (mut app, _rx) = app();
        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(*app.setup().turn_seconds(), SECONDS_STEP);
    }

    #[test]
    fn test_events_drive_screens() {
        let (mut app, mut rx) = app();
        app.handle_event(SessionEvent::Started {
            size: 3,
            turn_seconds: 20,
        });
        assert_eq!(app.screen(), Screen::Playing);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(
            rx.try_recv().unwrap(),
            Command::CellActivated { row: 1, col: 0 }
        );

        app.handle_event(SessionEvent::BoardChanged {
            row: 1,
            col: 0,
            mark: Mark::X,
        });
        assert_eq!(app.cell(1, 0), Some(Mark::X));

        app.handle_event(SessionEvent::StatusChanged(StatusChange::Turn {
            player: Mark::O,
            cause: TurnCause::Timeout,
        }));
        assert_eq!(app.status(), "Player O's Turn (Time's up!)");

        app.handle_event(SessionEvent::StatusChanged(StatusChange::Won(Mark::O)));
        assert_eq!(app.screen(), Screen::GameOver);
        assert_eq!(app.outcome(), Some(StatusChange::Won(Mark::O)));

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(rx.try_recv().unwrap(), Command::Reset);
        app.handle_event(SessionEvent::Reset);
        assert_eq!(app.screen(), Screen::Setup);
    }

    #[test]
    fn test_timer_ticks_update_readouts() {
        let (mut app, _rx) = app();
        app.handle_event(SessionEvent::TimerTick {
            player: Mark::O,
            remaining_secs: 7,
        });
        assert_eq!(app.remaining(Mark::O), 7);
        assert_eq!(app.remaining(Mark::X), 20);
    }

    #[test]
    fn test_quit() {
        let (mut app, _rx) = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}

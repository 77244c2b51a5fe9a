//! Game session: board, rules and turn clock behind one state machine.
//!
//! The session is the only component the view talks to. It owns the
//! board, both timers, the status and the current player; the view
//! receives [`SessionEvent`]s and never mutates any of them.

use crate::config::{ConfigError, GameConfig};
use crate::games::tictactoe::{Board, Mark, PlaceError, check_draw, check_win};
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::timer::{ClockEvent, ClockSignal, TurnClock};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, instrument, trace};

/// Status of a started session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are being accepted.
    Active,
    /// A player completed a line.
    Won(Mark),
    /// The board filled with no completed line.
    Draw,
}

impl GameStatus {
    /// True once the game has ended.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Active)
    }
}

/// What handed the turn to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnCause {
    /// The game just started.
    Start,
    /// The opponent made a move.
    Move,
    /// The opponent ran out of time.
    Timeout,
}

/// Status notification for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// It is now `player`'s turn.
    Turn {
        /// Player to move.
        player: Mark,
        /// What handed them the turn.
        cause: TurnCause,
    },
    /// The game was won.
    Won(Mark),
    /// The game ended in a draw.
    Draw,
}

impl std::fmt::Display for StatusChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusChange::Turn {
                player,
                cause: TurnCause::Timeout,
            } => write!(f, "Player {}'s Turn (Time's up!)", player),
            StatusChange::Turn { player, .. } => write!(f, "Player {}'s Turn", player),
            StatusChange::Won(player) => write!(f, "Player {} wins!", player),
            StatusChange::Draw => write!(f, "It's a draw!"),
        }
    }
}

/// Notifications from the session to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session started with the given settings.
    Started {
        /// Board side length.
        size: usize,
        /// Seconds on each clock.
        turn_seconds: u64,
    },
    /// A mark was placed.
    BoardChanged {
        /// Row of the placed mark.
        row: usize,
        /// Column of the placed mark.
        col: usize,
        /// The mark placed.
        mark: Mark,
    },
    /// Whose turn it is, or how the game ended.
    StatusChanged(StatusChange),
    /// A player's clock reading.
    TimerTick {
        /// Clock owner.
        player: Mark,
        /// Remaining whole seconds.
        remaining_secs: u64,
    },
    /// The session returned to its pre-start state.
    Reset,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game continues with this player to move.
    Continue(Mark),
    /// The mover completed a line.
    Won(Mark),
    /// The board is full with no line.
    Draw,
}

/// Why a move was rejected. A rejected move changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// No session has been started.
    #[display("No game in progress")]
    NotStarted,

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The board rejected the cell.
    #[display("{}", _0)]
    Place(PlaceError),
}

impl std::error::Error for MoveError {}

impl From<PlaceError> for MoveError {
    fn from(err: PlaceError) -> Self {
        MoveError::Place(err)
    }
}

/// State of one started game.
#[derive(Debug)]
struct Round {
    config: GameConfig,
    board: Board,
    status: GameStatus,
    current: Mark,
    clock: TurnClock,
}

/// A two-player timed tic-tac-toe session.
#[derive(Debug)]
pub struct GameSession {
    round: Option<Round>,
    clock_tx: UnboundedSender<ClockEvent>,
    events: UnboundedSender<SessionEvent>,
}

impl GameSession {
    /// Creates an idle session.
    ///
    /// Timers of started rounds report on `clock_tx`; whoever holds the
    /// matching receiver must feed those events back through
    /// [`handle_clock_event`](Self::handle_clock_event).
    #[instrument(skip_all)]
    pub fn new(
        clock_tx: UnboundedSender<ClockEvent>,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            round: None,
            clock_tx,
            events,
        }
    }

    /// True once [`start`](Self::start) has succeeded and until reset.
    pub fn is_started(&self) -> bool {
        self.round.is_some()
    }

    /// Returns the status, or `None` before start.
    pub fn status(&self) -> Option<GameStatus> {
        self.round.as_ref().map(|round| round.status)
    }

    /// Returns the player to move, or `None` before start.
    pub fn current_player(&self) -> Option<Mark> {
        self.round.as_ref().map(|round| round.current)
    }

    /// Returns the board, or `None` before start.
    pub fn board(&self) -> Option<&Board> {
        self.round.as_ref().map(|round| &round.board)
    }

    /// Returns the turn clock, or `None` before start.
    pub fn clock(&self) -> Option<&TurnClock> {
        self.round.as_ref().map(|round| &round.clock)
    }

    /// Returns the active configuration, or `None` before start.
    pub fn config(&self) -> Option<&GameConfig> {
        self.round.as_ref().map(|round| &round.config)
    }

    /// Starts a new game, replacing any game in progress.
    ///
    /// X moves first and X's clock starts immediately. An invalid
    /// configuration is rejected and leaves the session untouched.
    #[instrument(skip(self))]
    pub fn start(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(mut previous) = self.round.take() {
            debug!("Replacing game in progress");
            previous.clock.stop_all();
        }

        let size = *config.board_size();
        let turn_seconds = *config.turn_seconds();
        let mut round = Round {
            config,
            board: Board::new(size),
            status: GameStatus::Active,
            current: Mark::X,
            clock: TurnClock::new(config.turn_duration(), self.clock_tx.clone()),
        };
        round.clock.begin_turn(Mark::X);
        let readings: Vec<_> = Mark::iter()
            .map(|player| SessionEvent::TimerTick {
                player,
                remaining_secs: round.clock.timer(player).duration_secs(),
            })
            .collect();
        self.round = Some(round);

        info!(size, turn_seconds, "Game started");
        self.emit(SessionEvent::Started { size, turn_seconds });
        for reading in readings {
            self.emit(reading);
        }
        self.emit(SessionEvent::StatusChanged(StatusChange::Turn {
            player: Mark::X,
            cause: TurnCause::Start,
        }));
        self.check_invariants();
        Ok(())
    }

    /// Places the current player's mark at `(row, col)`.
    ///
    /// A completed line wins, a full board draws; either way both clocks
    /// stop. Otherwise the turn and the clock pass to the opponent.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, row: usize, col: usize) -> Result<MoveOutcome, MoveError> {
        let round = self.round.as_mut().ok_or(MoveError::NotStarted)?;
        if round.status.is_over() {
            return Err(MoveError::GameOver);
        }

        let mark = round.current;
        round.board.place(row, col, mark)?;

        let (outcome, change) = if check_win(&round.board, row, col) {
            round.status = GameStatus::Won(mark);
            round.clock.stop_all();
            info!(%mark, "Game won");
            debug!(board = %round.board.display(), "Final board");
            (MoveOutcome::Won(mark), StatusChange::Won(mark))
        } else if check_draw(&round.board) {
            round.status = GameStatus::Draw;
            round.clock.stop_all();
            info!("Game drawn");
            debug!(board = %round.board.display(), "Final board");
            (MoveOutcome::Draw, StatusChange::Draw)
        } else {
            let next = mark.opponent();
            round.current = next;
            round.clock.begin_turn(next);
            (
                MoveOutcome::Continue(next),
                StatusChange::Turn {
                    player: next,
                    cause: TurnCause::Move,
                },
            )
        };

        self.emit(SessionEvent::BoardChanged { row, col, mark });
        self.emit(SessionEvent::StatusChanged(change));
        self.check_invariants();
        Ok(outcome)
    }

    /// Passes the turn away from `player` because their clock ran out.
    ///
    /// Ignored unless a game is active and `player` is the one to move,
    /// which guards against a late expiry from a timer that has already
    /// been paused. The board is never touched.
    #[instrument(skip(self))]
    pub fn handle_timeout(&mut self, player: Mark) -> bool {
        let Some(round) = self.round.as_mut() else {
            debug!("Timeout before start, ignoring");
            return false;
        };
        if round.status.is_over() || round.current != player {
            debug!(status = ?round.status, current = %round.current, "Stale timeout, ignoring");
            return false;
        }

        let next = player.opponent();
        round.current = next;
        round.clock.begin_turn(next);
        info!(%player, %next, "Time's up, turn passes");

        self.emit(SessionEvent::StatusChanged(StatusChange::Turn {
            player: next,
            cause: TurnCause::Timeout,
        }));
        self.check_invariants();
        true
    }

    /// Applies a timer event: ticks are forwarded to the view, a current
    /// expiry becomes a timeout.
    #[instrument(skip(self), level = "trace")]
    pub fn handle_clock_event(&mut self, event: ClockEvent) {
        let Some(round) = self.round.as_mut() else {
            trace!("Clock event with no game, ignoring");
            return;
        };

        match round.clock.accept(event) {
            Some(ClockSignal::Tick {
                player,
                remaining_secs,
            }) => self.emit(SessionEvent::TimerTick {
                player,
                remaining_secs,
            }),
            Some(ClockSignal::Expired(player)) => {
                self.handle_timeout(player);
            }
            None => {}
        }
    }

    /// Stops both clocks and returns to the pre-start state.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        if let Some(mut round) = self.round.take() {
            round.clock.stop_all();
            info!("Session reset");
        }
        self.emit(SessionEvent::Reset);
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            trace!(?event, "No listener for session event");
        }
    }

    fn check_invariants(&self) {
        if let Err(violations) = SessionInvariants::check_all(self) {
            for violation in &violations {
                error!(%violation, "Session invariant violated");
            }
            debug_assert!(violations.is_empty(), "Session invariants violated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerState;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    struct Harness {
        session: GameSession,
        events: UnboundedReceiver<SessionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (events_tx, events) = mpsc::unbounded_channel();
            let (clock_tx, _clock_rx) = mpsc::unbounded_channel();
            Self {
                session: GameSession::new(clock_tx, events_tx),
                events,
            }
        }

        fn drain(&mut self) -> Vec<SessionEvent> {
            std::iter::from_fn(|| self.events.try_recv().ok()).collect()
        }
    }

    #[test]
    fn test_status_messages() {
        let turn = StatusChange::Turn {
            player: Mark::X,
            cause: TurnCause::Move,
        };
        assert_eq!(turn.to_string(), "Player X's Turn");

        let timeout = StatusChange::Turn {
            player: Mark::O,
            cause: TurnCause::Timeout,
        };
        assert_eq!(timeout.to_string(), "Player O's Turn (Time's up!)");
        assert_eq!(StatusChange::Won(Mark::X).to_string(), "Player X wins!");
        assert_eq!(StatusChange::Draw.to_string(), "It's a draw!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_before_start_rejected() {
        let mut h = Harness::new();
        assert_eq!(h.session.apply_move(0, 0), Err(MoveError::NotStarted));
        assert!(!h.session.handle_timeout(Mark::X));
        assert!(h.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_creates_nothing() {
        let mut h = Harness::new();
        assert!(h.session.start(GameConfig::new(0, 20)).is_err());
        assert!(h.session.start(GameConfig::new(3, 0)).is_err());
        assert!(h.session.start(GameConfig::new(usize::MAX, 20)).is_err());
        assert!(!h.session.is_started());
        assert!(h.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_announces_and_runs_x() {
        let mut h = Harness::new();
        h.session.start(GameConfig::new(4, 15)).unwrap();

        assert_eq!(h.session.status(), Some(GameStatus::Active));
        assert_eq!(h.session.current_player(), Some(Mark::X));
        assert_eq!(h.session.board().map(Board::size), Some(4));
        assert_eq!(h.session.clock().and_then(TurnClock::running), Some(Mark::X));

        assert_eq!(
            h.drain(),
            vec![
                SessionEvent::Started {
                    size: 4,
                    turn_seconds: 15
                },
                SessionEvent::TimerTick {
                    player: Mark::X,
                    remaining_secs: 15
                },
                SessionEvent::TimerTick {
                    player: Mark::O,
                    remaining_secs: 15
                },
                SessionEvent::StatusChanged(StatusChange::Turn {
                    player: Mark::X,
                    cause: TurnCause::Start
                }),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_alternates_and_swaps_clock() {
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        h.drain();

        assert_eq!(h.session.apply_move(1, 1), Ok(MoveOutcome::Continue(Mark::O)));
        assert_eq!(h.session.current_player(), Some(Mark::O));

        let clock = h.session.clock().unwrap();
        assert_eq!(clock.timer(Mark::X).state(), TimerState::Paused);
        assert_eq!(clock.timer(Mark::O).state(), TimerState::Running);

        assert_eq!(
            h.drain(),
            vec![
                SessionEvent::BoardChanged {
                    row: 1,
                    col: 1,
                    mark: Mark::X
                },
                SessionEvent::StatusChanged(StatusChange::Turn {
                    player: Mark::O,
                    cause: TurnCause::Move
                }),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_move_changes_nothing() {
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        h.session.apply_move(0, 0).unwrap();
        h.drain();

        let board = h.session.board().cloned();
        assert!(matches!(
            h.session.apply_move(0, 0),
            Err(MoveError::Place(PlaceError::Occupied { .. }))
        ));
        assert!(matches!(
            h.session.apply_move(5, 5),
            Err(MoveError::Place(PlaceError::OutOfBounds { .. }))
        ));

        assert_eq!(h.session.board().cloned(), board);
        assert_eq!(h.session.current_player(), Some(Mark::O));
        assert_eq!(h.session.clock().and_then(TurnClock::running), Some(Mark::O));
        assert!(h.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_win_on_full_board_is_not_draw() {
        // X O X / O X O / O X X with (2, 2) as the final move.
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        let moves = [
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 2),
            (2, 1),
            (2, 0),
        ];
        for (row, col) in moves {
            assert!(matches!(
                h.session.apply_move(row, col),
                Ok(MoveOutcome::Continue(_))
            ));
        }
        assert_eq!(h.session.current_player(), Some(Mark::X));
        assert_eq!(h.session.apply_move(2, 2), Ok(MoveOutcome::Won(Mark::X)));
        assert!(h.session.board().is_some_and(Board::is_full));
        assert_eq!(h.session.status(), Some(GameStatus::Won(Mark::X)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_moves_after_game_over_rejected() {
        let mut h = Harness::new();
        h.session.start(GameConfig::new(1, 20)).unwrap();
        assert_eq!(h.session.apply_move(0, 0), Ok(MoveOutcome::Won(Mark::X)));
        assert_eq!(h.session.apply_move(0, 0), Err(MoveError::GameOver));
        assert!(!h.session.handle_timeout(Mark::X));
        assert!(h.session.clock().is_some_and(TurnClock::is_settled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timeout_ignored() {
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        h.session.apply_move(0, 0).unwrap();
        h.drain();

        assert!(!h.session.handle_timeout(Mark::X));
        assert_eq!(h.session.current_player(), Some(Mark::O));
        assert!(h.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_passes_turn() {
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        h.drain();

        assert!(h.session.handle_timeout(Mark::X));
        assert_eq!(h.session.current_player(), Some(Mark::O));
        assert_eq!(h.session.clock().and_then(TurnClock::running), Some(Mark::O));
        assert_eq!(
            h.drain(),
            vec![SessionEvent::StatusChanged(StatusChange::Turn {
                player: Mark::O,
                cause: TurnCause::Timeout
            })]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_idle() {
        let mut h = Harness::new();
        h.session.start(GameConfig::default()).unwrap();
        h.session.apply_move(2, 2).unwrap();
        h.drain();

        h.session.reset();
        assert!(!h.session.is_started());
        assert_eq!(h.session.status(), None);
        assert_eq!(h.drain(), vec![SessionEvent::Reset]);
        assert_eq!(h.session.apply_move(0, 0), Err(MoveError::NotStarted));

        h.session.start(GameConfig::new(5, 10)).unwrap();
        assert_eq!(h.session.current_player(), Some(Mark::X));
        assert!(h.session.board().is_some_and(|b| b.cells().iter().all(|c| c.mark().is_none())));
    }
}

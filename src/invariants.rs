//! First-class invariants for a timed session.
//!
//! Invariants are logical properties that must hold after every session
//! transition. They are checked in debug builds and tested independently.

use crate::games::tictactoe::Mark;
use crate::session::{GameSession, GameStatus};
use strum::IntoEnumIterator;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: the two timers never run together.
pub struct SingleRunningClock;

impl Invariant<GameSession> for SingleRunningClock {
    fn holds(session: &GameSession) -> bool {
        session.clock().is_none_or(|clock| {
            Mark::iter()
                .filter(|mark| clock.timer(*mark).is_running())
                .count()
                <= 1
        })
    }

    fn description() -> &'static str {
        "At most one player's timer is running"
    }
}

/// Invariant: a finished game has both timers stopped.
pub struct SettledClocks;

impl Invariant<GameSession> for SettledClocks {
    fn holds(session: &GameSession) -> bool {
        match (session.status(), session.clock()) {
            (Some(GameStatus::Won(_) | GameStatus::Draw), Some(clock)) => clock.is_settled(),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Both timers are stopped once the game is over"
    }
}

/// Invariant: only the current player's timer may run.
pub struct ActivePlayerClock;

impl Invariant<GameSession> for ActivePlayerClock {
    fn holds(session: &GameSession) -> bool {
        match (session.current_player(), session.clock()) {
            (Some(current), Some(clock)) => !clock.timer(current.opponent()).is_running(),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Only the current player's timer runs"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (SingleRunningClock, SettledClocks, ActivePlayerClock);

//! Per-player turn timers.
//!
//! Each [`CountdownTimer`] drives its own one-second ticker task and
//! reports through a channel as [`ClockEvent`]s. The [`TurnClock`]
//! owns both timers, keeps at most one of them running, and filters
//! events left over from cancelled runs.

mod countdown;
mod turn_clock;

pub use countdown::{ClockEvent, ClockEventKind, CountdownTimer, TICK, TimerState};
pub use turn_clock::{ClockSignal, TurnClock};

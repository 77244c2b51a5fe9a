//! Pausable countdown timer with a cancellable one-second ticker.

use crate::games::tictactoe::Mark;
use derive_new::new;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, instrument, trace};

/// Cadence of timer ticks.
pub const TICK: Duration = Duration::from_secs(1);

// Run ids are unique across all timers, so events queued by a timer from
// an earlier session can never match a timer of a later one.
static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

fn next_run() -> u64 {
    NEXT_RUN.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle state of a [`CountdownTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TimerState {
    /// Not counting; the next start begins a full countdown.
    Stopped,
    /// Counting down.
    Running,
    /// Frozen mid-countdown; resuming continues where it left off.
    Paused,
}

/// What a ticker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEventKind {
    /// Periodic reading of the remaining whole seconds.
    Tick(u64),
    /// The countdown reached zero.
    Expired,
}

/// Message sent by a running timer's ticker.
///
/// `run` identifies the running stretch that produced the event. Every
/// start, pause and stop opens a new, process-unique run, so an event
/// whose run no longer matches its timer is stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct ClockEvent {
    /// Timer that produced the event.
    pub owner: Mark,
    /// Running stretch that produced the event.
    pub run: u64,
    /// Event payload.
    pub kind: ClockEventKind,
}

/// A single player's countdown.
///
/// Elapsed time is measured on the monotonic clock as
/// `now - started_at - paused_total`, so time spent paused never counts
/// against the player.
#[derive(Debug)]
pub struct CountdownTimer {
    owner: Mark,
    duration_secs: u64,
    state: TimerState,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    run: u64,
    ticker: Option<JoinHandle<()>>,
    events: UnboundedSender<ClockEvent>,
}

impl CountdownTimer {
    /// Creates a stopped timer that reports to `events`.
    ///
    /// Sub-second parts of `duration` are dropped.
    #[instrument(skip(events))]
    pub fn new(owner: Mark, duration: Duration, events: UnboundedSender<ClockEvent>) -> Self {
        Self {
            owner,
            duration_secs: duration.as_secs(),
            state: TimerState::Stopped,
            started_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            run: next_run(),
            ticker: None,
            events,
        }
    }

    /// Returns the mark this timer belongs to.
    pub fn owner(&self) -> Mark {
        self.owner
    }

    /// Returns the configured duration in seconds.
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Returns the current state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Returns the current run id.
    pub fn run(&self) -> u64 {
        self.run
    }

    /// True while counting down.
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Running time so far, excluding paused intervals.
    pub fn elapsed(&self) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let until = match self.state {
            TimerState::Paused => self.paused_at.unwrap_or(started_at),
            _ => Instant::now(),
        };
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }

    /// Remaining whole seconds, `max(0, duration - floor(elapsed))`.
    pub fn remaining_secs(&self) -> u64 {
        remaining_secs(self.duration_secs, self.elapsed())
    }

    /// Starts a fresh countdown from Stopped, or continues from Paused.
    ///
    /// No-op while already running.
    #[instrument(skip(self), fields(owner = %self.owner, state = %self.state))]
    pub fn start(&mut self) {
        let now = Instant::now();
        match self.state {
            TimerState::Running => {
                debug!("Timer already running");
                return;
            }
            TimerState::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.paused_total += now.saturating_duration_since(paused_at);
                }
            }
            TimerState::Stopped => {
                self.started_at = Some(now);
                self.paused_at = None;
                self.paused_total = Duration::ZERO;
            }
        }

        self.state = TimerState::Running;
        self.run = next_run();
        self.spawn_ticker(now);
        debug!(run = self.run, remaining = self.remaining_secs(), "Timer running");
    }

    /// Freezes the countdown. No-op unless running.
    #[instrument(skip(self), fields(owner = %self.owner, state = %self.state))]
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.cancel_ticker();
        self.paused_at = Some(Instant::now());
        self.state = TimerState::Paused;
        self.run = next_run();
        debug!(remaining = self.remaining_secs(), "Timer paused");
    }

    /// Continues a paused countdown. No-op unless paused.
    #[instrument(skip(self), fields(owner = %self.owner, state = %self.state))]
    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.start();
        }
    }

    /// Stops the countdown and clears all accounting.
    ///
    /// Idempotent. After this returns the ticker is cancelled and the
    /// next [`start`](Self::start) begins a full-duration countdown.
    #[instrument(skip(self), fields(owner = %self.owner, state = %self.state))]
    pub fn stop(&mut self) {
        self.cancel_ticker();
        self.started_at = None;
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        if self.state != TimerState::Stopped {
            self.state = TimerState::Stopped;
            self.run = next_run();
            debug!("Timer stopped");
        }
    }

    /// Applies an expiry reported by this timer's ticker.
    ///
    /// Returns false (and changes nothing) if `run` is not the current run.
    #[instrument(skip(self), fields(owner = %self.owner))]
    pub fn expire(&mut self, run: u64) -> bool {
        if run != self.run || self.state != TimerState::Running {
            return false;
        }
        self.stop();
        true
    }

    fn spawn_ticker(&mut self, resumed_at: Instant) {
        self.cancel_ticker();

        // Accounting is frozen while running, so the ticker works from a
        // snapshot of the effective origin.
        let origin = self
            .started_at
            .unwrap_or(resumed_at)
            .checked_add(self.paused_total)
            .unwrap_or(resumed_at);
        let owner = self.owner;
        let run = self.run;
        let duration_secs = self.duration_secs;
        let events = self.events.clone();

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(resumed_at + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let remaining =
                    remaining_secs(duration_secs, Instant::now().saturating_duration_since(origin));
                trace!(%owner, run, remaining, "Tick");

                if events
                    .send(ClockEvent::new(owner, run, ClockEventKind::Tick(remaining)))
                    .is_err()
                {
                    break;
                }

                if remaining == 0 {
                    let _ = events.send(ClockEvent::new(owner, run, ClockEventKind::Expired));
                    break;
                }
            }
        }));
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

fn remaining_secs(duration_secs: u64, elapsed: Duration) -> u64 {
    duration_secs.saturating_sub(elapsed.as_secs())
}

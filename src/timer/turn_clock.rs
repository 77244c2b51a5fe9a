//! Pair of player timers with at most one running at a time.

use super::countdown::{ClockEvent, ClockEventKind, CountdownTimer, TimerState};
use crate::games::tictactoe::Mark;
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;
use tracing::{debug, info, instrument};

/// A timer event that survived stale-run filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// Fresh remaining-seconds reading for a player.
    Tick {
        /// Player whose timer ticked.
        player: Mark,
        /// Remaining whole seconds.
        remaining_secs: u64,
    },
    /// The player's countdown reached zero; their timer is now stopped.
    Expired(Mark),
}

/// Coordinates the X and O timers.
///
/// Starting one player's turn always pauses the other player's timer
/// first, so the two are never running together.
#[derive(Debug)]
pub struct TurnClock {
    x: CountdownTimer,
    o: CountdownTimer,
}

impl TurnClock {
    /// Creates two stopped timers of `duration` each.
    #[instrument(skip(events))]
    pub fn new(duration: Duration, events: UnboundedSender<ClockEvent>) -> Self {
        Self {
            x: CountdownTimer::new(Mark::X, duration, events.clone()),
            o: CountdownTimer::new(Mark::O, duration, events),
        }
    }

    /// Returns the timer of `player`.
    pub fn timer(&self, player: Mark) -> &CountdownTimer {
        match player {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    fn timer_mut(&mut self, player: Mark) -> &mut CountdownTimer {
        match player {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }

    /// Returns the player whose timer is running, if any.
    pub fn running(&self) -> Option<Mark> {
        [&self.x, &self.o]
            .into_iter()
            .find(|timer| timer.is_running())
            .map(CountdownTimer::owner)
    }

    /// True when no timer is running or paused.
    pub fn is_settled(&self) -> bool {
        Mark::iter().all(|mark| self.timer(mark).state() == TimerState::Stopped)
    }

    /// Hands the clock to `player`.
    ///
    /// Pauses the opponent's timer if it is running, then starts
    /// `player`'s timer from Stopped or resumes it from Paused.
    #[instrument(skip(self))]
    pub fn begin_turn(&mut self, player: Mark) {
        self.timer_mut(player.opponent()).pause();

        let timer = self.timer_mut(player);
        match timer.state() {
            TimerState::Paused => timer.resume(),
            TimerState::Stopped => timer.start(),
            TimerState::Running => debug!("Timer already running"),
        }
    }

    /// Forces both timers to Stopped.
    #[instrument(skip(self))]
    pub fn stop_all(&mut self) {
        self.x.stop();
        self.o.stop();
        info!("All timers stopped");
    }

    /// Filters a ticker event against the owning timer's current run.
    ///
    /// Stale events (from a stretch that has since been paused or
    /// stopped) yield `None`. A current expiry stops the owning timer.
    #[instrument(skip(self))]
    pub fn accept(&mut self, event: ClockEvent) -> Option<ClockSignal> {
        let timer = self.timer_mut(event.owner);
        if event.run != timer.run() {
            debug!(current_run = timer.run(), "Dropping stale timer event");
            return None;
        }

        match event.kind {
            ClockEventKind::Tick(remaining_secs) => Some(ClockSignal::Tick {
                player: event.owner,
                remaining_secs,
            }),
            ClockEventKind::Expired => timer
                .expire(event.run)
                .then_some(ClockSignal::Expired(event.owner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    fn clock(duration_secs: u64) -> (TurnClock, mpsc::UnboundedReceiver<ClockEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TurnClock::new(Duration::from_secs(duration_secs), tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_turn_runs_exactly_one() {
        let (mut clock, _rx) = clock(20);
        assert_eq!(clock.running(), None);

        clock.begin_turn(Mark::X);
        assert_eq!(clock.running(), Some(Mark::X));
        assert_eq!(clock.timer(Mark::O).state(), TimerState::Stopped);

        clock.begin_turn(Mark::O);
        assert_eq!(clock.running(), Some(Mark::O));
        assert_eq!(clock.timer(Mark::X).state(), TimerState::Paused);

        clock.begin_turn(Mark::X);
        assert_eq!(clock.running(), Some(Mark::X));
        assert_eq!(clock.timer(Mark::O).state(), TimerState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_player_keeps_their_time() {
        let (mut clock, _rx) = clock(20);
        clock.begin_turn(Mark::X);
        sleep(Duration::from_millis(4_010)).await;

        clock.begin_turn(Mark::O);
        sleep(Duration::from_millis(6_010)).await;

        clock.begin_turn(Mark::X);
        assert_eq!(clock.timer(Mark::X).remaining_secs(), 16);
        assert_eq!(clock.timer(Mark::O).remaining_secs(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_all_settles() {
        let (mut clock, _rx) = clock(20);
        clock.begin_turn(Mark::X);
        clock.begin_turn(Mark::O);

        clock.stop_all();
        assert!(clock.is_settled());
        assert_eq!(clock.running(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_drops_stale_ticks() {
        let (mut clock, mut rx) = clock(20);
        clock.begin_turn(Mark::X);
        sleep(Duration::from_millis(2_010)).await;

        // X's queued ticks belong to a run that pausing has closed.
        clock.begin_turn(Mark::O);
        let mut signals = Vec::new();
        while let Ok(event) = rx.try_recv() {
            signals.extend(clock.accept(event));
        }
        assert!(signals.is_empty());

        sleep(Duration::from_millis(1_010)).await;
        let event = rx.try_recv().unwrap();
        assert_eq!(
            clock.accept(event),
            Some(ClockSignal::Tick {
                player: Mark::O,
                remaining_secs: 19
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_expiry_stops_timer() {
        let (mut clock, mut rx) = clock(1);
        clock.begin_turn(Mark::O);
        sleep(Duration::from_millis(1_010)).await;

        let signals: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|event| clock.accept(event))
            .collect();

        assert_eq!(
            signals,
            vec![
                ClockSignal::Tick {
                    player: Mark::O,
                    remaining_secs: 0
                },
                ClockSignal::Expired(Mark::O),
            ]
        );
        assert_eq!(clock.timer(Mark::O).state(), TimerState::Stopped);
    }
}

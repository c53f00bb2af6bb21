use std::time::Duration;
use tokio::time::Instant;

/// Remaining seconds at or below which the clock shows its low-time state
pub const LOW_TIME_THRESHOLD: u32 = 10;
const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub remaining: u32,
    pub low_time: bool,
}

/// Local countdown for the current round.
///
/// The clock never ends a round by itself: when it reaches zero it just stops,
/// and the server's next snapshot decides what happens. The event loop waits on
/// [`RoundClock::next_tick_at`] and calls [`RoundClock::tick`] when it passes.
#[derive(Debug, Default)]
pub struct RoundClock {
    remaining: u32,
    next_tick: Option<Instant>,
}

impl RoundClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever was running and count down from `seconds`.
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.next_tick = (seconds > 0).then(|| Instant::now() + TICK);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Advance by one second. Returns the new remaining time, or `None` if the clock is idle.
    pub fn tick(&mut self) -> Option<u32> {
        let due = self.next_tick?;
        self.remaining = self.remaining.saturating_sub(1);
        self.next_tick = (self.remaining > 0).then(|| due + TICK);
        Some(self.remaining)
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_tick_at(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reading(&self) -> ClockReading {
        ClockReading {
            remaining: self.remaining,
            low_time: self.remaining <= LOW_TIME_THRESHOLD,
        }
    }
}

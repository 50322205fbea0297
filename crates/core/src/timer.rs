//! Per-question countdown.
//!
//! The timer does not own a clock. Whoever drives it calls [`CountdownTimer::tick`]
//! once per second with the [`TickToken`] handed out by the `start` that scheduled
//! those ticks. Every `pause`, `reset` and expiry moves the timer to a new
//! generation, so ticks scheduled for an earlier run come back as
//! [`TickOutcome::Stale`] and change nothing.

use serde::Serialize;

/// Seconds per question when nothing else is configured.
pub const DEFAULT_QUESTION_SECS: u32 = 30;

/// Identifies the run a tick was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

/// Result of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a paused, reset or expired run.
    Stale,
    /// One second elapsed; the countdown continues.
    Ticked { remaining: u32 },
    /// The countdown reached zero. Reported exactly once per run.
    Expired,
}

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining: u32,
    pub total: u32,
    pub running: bool,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    total: u32,
    remaining: u32,
    running: bool,
    generation: u64,
}

impl CountdownTimer {
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
            running: false,
            generation: 0,
        }
    }

    /// Begin counting down.
    ///
    /// Returns the token the caller must pass to [`tick`](Self::tick), or `None` if the
    /// timer is already running or has nothing left to count (expired and not yet reset).
    pub fn start(&mut self) -> Option<TickToken> {
        if self.running || self.remaining == 0 {
            return None;
        }
        self.running = true;
        self.generation += 1;
        Some(TickToken(self.generation))
    }

    /// Stop counting and keep `remaining`. Returns `false` if it was not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.generation += 1;
        true
    }

    /// Stop and refill to `new_total` (or the current total). Never reports expiry.
    pub fn reset(&mut self, new_total: Option<u32>) {
        if let Some(total) = new_total {
            self.total = total;
        }
        self.remaining = self.total;
        self.running = false;
        self.generation += 1;
    }

    /// Deliver one elapsed second.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if !self.running || token.0 != self.generation {
            return TickOutcome::Stale;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Ticked {
                remaining: self.remaining,
            };
        }

        self.running = false;
        self.generation += 1;
        TickOutcome::Expired
    }

    /// Token of the current run, if running.
    #[must_use]
    pub fn token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken(self.generation))
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        TimerState {
            remaining: self.remaining,
            total: self.total,
            running: self.running,
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_SECS)
    }
}

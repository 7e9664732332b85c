//! Drift-corrected countdown timer.
//!
//! Wall-clock based with no internal thread - the caller is responsible
//! for calling `tick()` periodically. Each tick recomputes the remainder
//! from absolute timestamps rather than accumulating per-tick deltas, so
//! scheduling jitter or missed ticks never compounds error.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = CountdownTimer::new();
//! timer.start(300_000)?;
//! // In a loop:
//! match timer.tick() {
//!     Tick::Completed => { /* fires exactly once */ }
//!     Tick::Remaining(ms) => { /* render */ }
//!     Tick::Inactive => {}
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running, or paused; no scheduling should happen.
    Inactive,
    /// Still counting down; carries the freshly computed remainder.
    Remaining(u64),
    /// The countdown hit zero on this tick. Reported exactly once.
    Completed,
}

/// Drift-resistant countdown with pause/resume/reset.
///
/// Invariant: `remaining_ms <= duration_ms`; while running and not
/// paused, the remainder is a pure function of
/// `(duration_ms, started_epoch_ms, now)` and is never independently
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "C: Default"))]
pub struct CountdownTimer<C = SystemClock> {
    /// Duration of the current countdown leg in milliseconds. Re-anchored
    /// on resume, so elapsed time is always measured against
    /// `started_epoch_ms`.
    duration_ms: u64,
    remaining_ms: u64,
    /// Epoch ms when the current leg started (start or resume).
    started_epoch_ms: u64,
    running: bool,
    paused: bool,
    #[serde(skip)]
    clock: C,
}

impl CountdownTimer<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for CountdownTimer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CountdownTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            duration_ms: 0,
            remaining_ms: 0,
            started_epoch_ms: 0,
            running: false,
            paused: false,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// 0.0 .. 1.0 progress of the current countdown leg.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.duration_ms as f64)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a countdown of `duration_ms`.
    ///
    /// A zero duration is accepted and completes on the first tick.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimerBusy`] if a countdown is already
    /// running; callers must `reset` first.
    pub fn start(&mut self, duration_ms: u64) -> Result<(), ValidationError> {
        if self.running {
            return Err(ValidationError::TimerBusy);
        }
        self.duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.started_epoch_ms = self.clock.now_ms();
        self.running = true;
        self.paused = false;
        Ok(())
    }

    /// Freeze the remainder at its current wall-clock value.
    ///
    /// No-op unless running and not paused. Returns whether the timer
    /// was paused by this call.
    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused {
            return false;
        }
        self.remaining_ms = self.compute_remaining();
        self.paused = true;
        true
    }

    /// Continue from the frozen remainder.
    ///
    /// Re-anchors the wall-clock reference (`started_epoch_ms = now`,
    /// `duration_ms = frozen remainder`) so elapsed time resumes from
    /// exactly where pause left it instead of being re-derived from the
    /// original start. No-op unless running and paused.
    pub fn resume(&mut self) -> bool {
        if !self.running || !self.paused {
            return false;
        }
        self.duration_ms = self.remaining_ms;
        self.started_epoch_ms = self.clock.now_ms();
        self.paused = false;
        true
    }

    /// Stop the countdown. Idempotent; guarantees no further
    /// [`Tick::Completed`] is reported for the cancelled leg.
    pub fn reset(&mut self) {
        self.running = false;
        self.paused = false;
        self.remaining_ms = 0;
    }

    /// Recompute the remainder from absolute timestamps.
    ///
    /// Completion is reported exactly once: after [`Tick::Completed`]
    /// the timer is no longer running and further ticks are
    /// [`Tick::Inactive`].
    pub fn tick(&mut self) -> Tick {
        if !self.running || self.paused {
            return Tick::Inactive;
        }
        let remaining = self.compute_remaining();
        self.remaining_ms = remaining;
        if remaining == 0 {
            self.running = false;
            return Tick::Completed;
        }
        Tick::Remaining(remaining)
    }

    fn compute_remaining(&self) -> u64 {
        let elapsed = self.clock.now_ms().saturating_sub(self.started_epoch_ms);
        self.duration_ms.saturating_sub(elapsed)
    }
}

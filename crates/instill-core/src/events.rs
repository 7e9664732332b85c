use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Every state change in the session produces an Event.
/// Presentation layers (CLI, tray, GUI) poll for events and render them;
/// failures on their side never feed back into session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A dose session began; the first dose is awaiting confirmation.
    SessionStarted {
        dose_index: usize,
        dose_name: String,
        at: DateTime<Utc>,
    },
    /// A dose was confirmed and the interval countdown toward the next
    /// dose started.
    CountdownStarted {
        confirmed_index: usize,
        next_dose: String,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The countdown expired: the next dose is due. Emitted exactly once
    /// per Alert entry; this is the payload an audible/OS notification
    /// sink consumes.
    DoseDue {
        dose_index: usize,
        dose_name: String,
        at: DateTime<Utc>,
    },
    /// The last dose of the session was confirmed.
    SessionCompleted {
        completed_today: u32,
        at: DateTime<Utc>,
    },
    ReturnedToIdle {
        at: DateTime<Utc>,
    },
    /// Settings were saved; any in-flight session is cancelled.
    SettingsApplied {
        at: DateTime<Utc>,
    },
    TodayReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        dose_index: usize,
        dose_name: String,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        completed_today: u32,
        daily_goal: u32,
        /// Window height hint for the presentation layer.
        window_height: u32,
        at: DateTime<Utc>,
    },
}

//! Date-keyed counter of completed dose sessions.
//!
//! The record always refers to "today" whenever it is read: a stale date
//! is lazily replaced with a zeroed record before any read or increment.
//! Day rollover is detected by calendar date string equality only; clock
//! skew gets no special handling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted as `todayRecord` inside the flat JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// ISO calendar date (`YYYY-MM-DD`). Empty until first touched.
    pub date: String,
    pub completed_sessions: u32,
}

impl Default for DailyRecord {
    fn default() -> Self {
        Self {
            date: String::new(),
            completed_sessions: 0,
        }
    }
}

/// Wraps a [`DailyRecord`] and enforces the day-boundary invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTracker {
    record: DailyRecord,
}

impl DailyTracker {
    pub fn new(record: DailyRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &DailyRecord {
        &self.record
    }

    /// Replace a stale record with `{today, 0}`.
    fn ensure_today(&mut self, today: NaiveDate) {
        let today = today.to_string();
        if self.record.date != today {
            self.record = DailyRecord {
                date: today,
                completed_sessions: 0,
            };
        }
    }

    pub fn completed_count(&mut self, today: NaiveDate) -> u32 {
        self.ensure_today(today);
        self.record.completed_sessions
    }

    /// Non-mutating read for snapshots; a stale record reads as zero.
    pub fn peek(&self, today: NaiveDate) -> u32 {
        if self.record.date == today.to_string() {
            self.record.completed_sessions
        } else {
            0
        }
    }

    pub fn increment(&mut self, today: NaiveDate) -> u32 {
        self.ensure_today(today);
        self.record.completed_sessions += 1;
        self.record.completed_sessions
    }

    /// User-initiated reset, regardless of the stored date.
    pub fn reset_today(&mut self, today: NaiveDate) {
        self.record = DailyRecord {
            date: today.to_string(),
            completed_sessions: 0,
        };
    }
}

//! Dose session state machine.
//!
//! The controller composes the countdown timer, the regimen cursor and
//! the daily tracker into the dose -> wait -> count -> alert -> repeat ->
//! complete cycle. It is a pure state machine: commands and ticks return
//! events, and a presentation layer renders them. All transitions are
//! synchronous and run to completion; the caller drives `tick()`
//! periodically while in `Counting`.
//!
//! ```text
//! Idle -> Waiting -> (Counting <-> Alert)* -> Complete -> Idle
//! ```
//!
//! Pausing is a sub-state of `Counting` carried by the timer, not a
//! session state of its own.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::daily::{DailyRecord, DailyTracker};
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::regimen::Regimen;
use crate::storage::Config;
use crate::timer::{CountdownTimer, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Waiting,
    Counting,
    Alert,
    Complete,
}

impl SessionState {
    /// Window height hint for the presentation layer, in logical pixels.
    pub fn window_height(self) -> u32 {
        match self {
            SessionState::Idle => 150,
            SessionState::Waiting => 180,
            SessionState::Counting => 260,
            SessionState::Alert => 200,
            SessionState::Complete => 170,
        }
    }
}

/// The session controller.
///
/// Owns one timer, one regimen and one daily tracker, all built from an
/// explicitly passed [`Config`]. Commands return `Ok(None)` when the
/// input does not apply in the current state; errors are reserved for
/// contract violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "C: Default"))]
pub struct SessionController<C = SystemClock> {
    state: SessionState,
    regimen: Regimen,
    timer: CountdownTimer<C>,
    tracker: DailyTracker,
    interval_ms: u64,
    daily_goal: u32,
    #[serde(skip)]
    clock: C,
}

impl SessionController<SystemClock> {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> SessionController<C> {
    pub fn with_clock(config: &Config, clock: C) -> Result<Self> {
        let (regimen, interval_ms) = Self::session_inputs(config)?;
        Ok(Self {
            state: SessionState::Idle,
            regimen,
            timer: CountdownTimer::with_clock(clock.clone()),
            tracker: DailyTracker::new(config.today_record.clone()),
            interval_ms,
            daily_goal: config.daily_sessions,
            clock,
        })
    }

    /// Validate and extract the parts of the config the session uses.
    /// An interval of zero minutes is rejected here, at the boundary,
    /// rather than silently clamped.
    fn session_inputs(config: &Config) -> Result<(Regimen, u64)> {
        if config.interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "intervalMinutes".into(),
                message: "must be at least 1".into(),
            }
            .into());
        }
        let regimen = Regimen::new(config.medicines.clone())?;
        Ok((regimen, config.interval_ms()))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn regimen(&self) -> &Regimen {
        &self.regimen
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    /// The record to persist back into the config after completion or a
    /// today-reset.
    pub fn today_record(&self) -> &DailyRecord {
        self.tracker.record()
    }

    /// Build a full state snapshot event for polling renderers.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            dose_index: self.regimen.current_index(),
            dose_name: self.regimen.current_dose().to_string(),
            remaining_ms: self.timer.remaining_ms(),
            total_ms: self.timer.duration_ms(),
            progress: self.timer.progress(),
            completed_today: self.tracker.peek(self.today()),
            daily_goal: self.daily_goal,
            window_height: self.state.window_height(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Waiting: rewind the cursor and await the first dose.
    pub fn start_session(&mut self) -> Result<Option<Event>> {
        if self.state != SessionState::Idle {
            return Ok(None);
        }
        self.regimen.reset_cursor();
        self.set_state(SessionState::Waiting);
        Ok(Some(Event::SessionStarted {
            dose_index: 0,
            dose_name: self.regimen.current_dose().to_string(),
            at: Utc::now(),
        }))
    }

    /// Confirm the current dose from `Waiting` or `Alert`.
    ///
    /// Whether this was the last dose is evaluated fresh here, not
    /// cached, so the transition is decided against the regimen as it
    /// stands right now.
    pub fn confirm_dose(&mut self) -> Result<Option<Event>> {
        match self.state {
            SessionState::Waiting | SessionState::Alert => {}
            _ => return Ok(None),
        }

        if self.regimen.is_last_dose() {
            let completed_today = self.tracker.increment(self.today());
            self.timer.reset();
            self.set_state(SessionState::Complete);
            return Ok(Some(Event::SessionCompleted {
                completed_today,
                at: Utc::now(),
            }));
        }

        let confirmed_index = self.regimen.current_index();
        // Non-empty guaranteed by !is_last_dose.
        let next_dose = self
            .regimen
            .next_dose()
            .unwrap_or_default()
            .to_string();
        self.timer.start(self.interval_ms)?;
        self.set_state(SessionState::Counting);
        Ok(Some(Event::CountdownStarted {
            confirmed_index,
            next_dose,
            duration_ms: self.interval_ms,
            at: Utc::now(),
        }))
    }

    /// Drive the countdown. Performs the `Counting -> Alert` transition
    /// when the timer completes: the cursor advances and a `DoseDue`
    /// event is emitted exactly once.
    pub fn tick(&mut self) -> Result<Option<Event>> {
        if self.state != SessionState::Counting {
            return Ok(None);
        }
        match self.timer.tick() {
            Tick::Completed => {
                self.regimen.advance()?;
                self.set_state(SessionState::Alert);
                Ok(Some(Event::DoseDue {
                    dose_index: self.regimen.current_index(),
                    dose_name: self.regimen.current_dose().to_string(),
                    at: Utc::now(),
                }))
            }
            Tick::Remaining(_) | Tick::Inactive => Ok(None),
        }
    }

    /// Pause or resume the countdown while `Counting`. The session state
    /// does not change.
    pub fn toggle_pause(&mut self) -> Option<Event> {
        if self.state != SessionState::Counting {
            return None;
        }
        if self.timer.is_paused() {
            self.timer.resume();
            Some(Event::TimerResumed {
                remaining_ms: self.timer.remaining_ms(),
                at: Utc::now(),
            })
        } else if self.timer.pause() {
            Some(Event::TimerPaused {
                remaining_ms: self.timer.remaining_ms(),
                at: Utc::now(),
            })
        } else {
            None
        }
    }

    /// Complete -> Idle.
    pub fn back_to_idle(&mut self) -> Option<Event> {
        if self.state != SessionState::Complete {
            return None;
        }
        self.timer.reset();
        self.regimen.reset_cursor();
        self.set_state(SessionState::Idle);
        Some(Event::ReturnedToIdle { at: Utc::now() })
    }

    /// Settings were saved: reload the regimen and interval and force
    /// the session back to `Idle` from any state. A session in flight is
    /// deliberately cancelled, not gracefully wound down.
    pub fn apply_settings(&mut self, config: &Config) -> Result<Event> {
        let (regimen, interval_ms) = Self::session_inputs(config)?;
        self.regimen = regimen;
        self.interval_ms = interval_ms;
        self.daily_goal = config.daily_sessions;
        self.tracker = DailyTracker::new(config.today_record.clone());
        self.timer.reset();
        self.set_state(SessionState::Idle);
        Ok(Event::SettingsApplied { at: Utc::now() })
    }

    /// User-initiated reset of today's counter. Also cancels any session
    /// in flight.
    pub fn reset_today(&mut self) -> Event {
        self.tracker.reset_today(self.today());
        self.timer.reset();
        self.set_state(SessionState::Idle);
        Event::TodayReset { at: Utc::now() }
    }

    /// The single abstract "confirm" input (global shortcut, space key):
    /// mapped to whichever transition is valid in the current state.
    pub fn confirm(&mut self) -> Result<Option<Event>> {
        match self.state {
            SessionState::Idle => self.start_session(),
            SessionState::Waiting | SessionState::Alert => self.confirm_dose(),
            SessionState::Complete => Ok(self.back_to_idle()),
            SessionState::Counting => Ok(None),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_state(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// UTC calendar date derived from the injected clock.
    fn today(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.clock.now_ms() as i64)
            .unwrap_or_default()
            .date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const DAY_MS: u64 = 86_400_000;

    fn config() -> Config {
        Config {
            medicines: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            interval_minutes: 5,
            ..Config::default()
        }
    }

    fn controller() -> (SessionController<ManualClock>, ManualClock) {
        // Just past midnight UTC; single-day scenarios stay on one date.
        let clock = ManualClock::new(1_700_006_400_000);
        let ctl = SessionController::with_clock(&config(), clock.clone()).unwrap();
        (ctl, clock)
    }

    fn confirm(ctl: &mut SessionController<ManualClock>) -> Event {
        ctl.confirm_dose().unwrap().expect("confirm applies")
    }

    #[test]
    fn controller_serializes_regardless_of_clock_type() {
        // Neither clock type is serde-aware; the skipped field must not
        // leak a Serialize bound onto persistence.
        let system = SessionController::new(&config()).unwrap();
        let json = serde_json::to_string(&system).unwrap();
        assert!(json.contains("\"state\":\"idle\""));

        let (manual, _) = controller();
        assert!(serde_json::to_string(&manual).is_ok());
    }

    #[test]
    fn zero_interval_rejected_at_construction() {
        let cfg = Config {
            interval_minutes: 0,
            ..config()
        };
        assert!(SessionController::new(&cfg).is_err());
    }

    #[test]
    fn full_session_dose_by_dose() {
        let (mut ctl, clock) = controller();
        assert_eq!(ctl.state(), SessionState::Idle);

        ctl.start_session().unwrap().unwrap();
        assert_eq!(ctl.state(), SessionState::Waiting);

        // Doses 0..2 each confirm into a 5 minute countdown.
        for expected_index in 0..3 {
            match confirm(&mut ctl) {
                Event::CountdownStarted {
                    confirmed_index,
                    duration_ms,
                    ..
                } => {
                    assert_eq!(confirmed_index, expected_index);
                    assert_eq!(duration_ms, 5 * 60_000);
                }
                other => panic!("expected CountdownStarted, got {other:?}"),
            }
            assert_eq!(ctl.state(), SessionState::Counting);

            clock.advance(5 * 60_000);
            match ctl.tick().unwrap().expect("countdown expired") {
                Event::DoseDue { dose_index, .. } => {
                    assert_eq!(dose_index, expected_index + 1)
                }
                other => panic!("expected DoseDue, got {other:?}"),
            }
            assert_eq!(ctl.state(), SessionState::Alert);
        }

        // Last dose completes the session and counts it.
        match confirm(&mut ctl) {
            Event::SessionCompleted { completed_today, .. } => {
                assert_eq!(completed_today, 1)
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(ctl.state(), SessionState::Complete);

        ctl.back_to_idle().unwrap();
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(ctl.regimen().current_index(), 0);
    }

    #[test]
    fn single_dose_regimen_completes_from_waiting() {
        let cfg = Config {
            medicines: vec!["only".into()],
            ..config()
        };
        let clock = ManualClock::new(1_700_000_000_000);
        let mut ctl = SessionController::with_clock(&cfg, clock).unwrap();
        ctl.start_session().unwrap().unwrap();
        match confirm(&mut ctl) {
            Event::SessionCompleted { completed_today, .. } => {
                assert_eq!(completed_today, 1)
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(ctl.state(), SessionState::Complete);
    }

    #[test]
    fn pause_is_a_counting_substate() {
        let (mut ctl, clock) = controller();
        ctl.start_session().unwrap().unwrap();
        confirm(&mut ctl);

        clock.advance(60_000);
        ctl.tick().unwrap();
        assert!(matches!(
            ctl.toggle_pause(),
            Some(Event::TimerPaused {
                remaining_ms: 240_000,
                ..
            })
        ));
        assert_eq!(ctl.state(), SessionState::Counting);

        // Paused wall time does not count against the interval.
        clock.advance(DAY_MS);
        assert!(ctl.tick().unwrap().is_none());
        assert!(matches!(
            ctl.toggle_pause(),
            Some(Event::TimerResumed {
                remaining_ms: 240_000,
                ..
            })
        ));

        clock.advance(240_000);
        assert!(matches!(ctl.tick().unwrap(), Some(Event::DoseDue { .. })));
    }

    #[test]
    fn dose_due_fires_once_despite_starved_ticks() {
        let (mut ctl, clock) = controller();
        ctl.start_session().unwrap().unwrap();
        confirm(&mut ctl);

        clock.advance(150_000);
        assert!(ctl.tick().unwrap().is_none());
        clock.advance(150_000);
        assert!(matches!(ctl.tick().unwrap(), Some(Event::DoseDue { .. })));
        // Further ticks in Alert report nothing.
        clock.advance(150_000);
        assert!(ctl.tick().unwrap().is_none());
    }

    #[test]
    fn commands_outside_their_state_do_nothing() {
        let (mut ctl, _clock) = controller();
        assert!(ctl.confirm_dose().unwrap().is_none());
        assert!(ctl.toggle_pause().is_none());
        assert!(ctl.back_to_idle().is_none());

        ctl.start_session().unwrap().unwrap();
        assert!(ctl.start_session().unwrap().is_none());
        assert!(ctl.toggle_pause().is_none());
    }

    #[test]
    fn confirm_dispatches_by_state() {
        let (mut ctl, clock) = controller();
        assert!(matches!(
            ctl.confirm().unwrap(),
            Some(Event::SessionStarted { .. })
        ));
        assert!(matches!(
            ctl.confirm().unwrap(),
            Some(Event::CountdownStarted { .. })
        ));
        // Confirm is ignored while counting.
        assert!(ctl.confirm().unwrap().is_none());

        clock.advance(5 * 60_000);
        ctl.tick().unwrap();
        assert!(matches!(
            ctl.confirm().unwrap(),
            Some(Event::CountdownStarted { .. })
        ));
    }

    #[test]
    fn settings_save_cancels_session_from_any_state() {
        let (mut ctl, _clock) = controller();
        ctl.start_session().unwrap().unwrap();
        confirm(&mut ctl);
        assert_eq!(ctl.state(), SessionState::Counting);

        let mut cfg = config();
        cfg.interval_minutes = 10;
        assert!(matches!(
            ctl.apply_settings(&cfg).unwrap(),
            Event::SettingsApplied { .. }
        ));
        assert_eq!(ctl.state(), SessionState::Idle);
        assert!(!ctl.is_paused());
        assert_eq!(ctl.regimen().current_index(), 0);
    }

    #[test]
    fn completion_counts_accumulate_within_a_day() {
        let (mut ctl, clock) = controller();
        for round in 1..=2u32 {
            ctl.start_session().unwrap().unwrap();
            for _ in 0..3 {
                confirm(&mut ctl);
                clock.advance(5 * 60_000);
                ctl.tick().unwrap();
            }
            match confirm(&mut ctl) {
                Event::SessionCompleted { completed_today, .. } => {
                    assert_eq!(completed_today, round)
                }
                other => panic!("expected SessionCompleted, got {other:?}"),
            }
            ctl.back_to_idle().unwrap();
        }
    }

    #[test]
    fn day_rollover_zeroes_the_count() {
        let (mut ctl, clock) = controller();
        ctl.start_session().unwrap().unwrap();
        for _ in 0..3 {
            confirm(&mut ctl);
            clock.advance(5 * 60_000);
            ctl.tick().unwrap();
        }
        confirm(&mut ctl);
        ctl.back_to_idle().unwrap();

        clock.advance(DAY_MS);
        match ctl.snapshot() {
            Event::StateSnapshot {
                completed_today, ..
            } => assert_eq!(completed_today, 0),
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_carries_window_hint() {
        let (mut ctl, _clock) = controller();
        match ctl.snapshot() {
            Event::StateSnapshot {
                state,
                window_height,
                daily_goal,
                ..
            } => {
                assert_eq!(state, SessionState::Idle);
                assert_eq!(window_height, 150);
                assert_eq!(daily_goal, 4);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
        ctl.start_session().unwrap().unwrap();
        confirm(&mut ctl);
        match ctl.snapshot() {
            Event::StateSnapshot { window_height, .. } => assert_eq!(window_height, 260),
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn reset_today_zeroes_and_returns_to_idle() {
        let (mut ctl, _clock) = controller();
        ctl.start_session().unwrap().unwrap();
        assert!(matches!(ctl.reset_today(), Event::TodayReset { .. }));
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(ctl.today_record().completed_sessions, 0);
    }
}

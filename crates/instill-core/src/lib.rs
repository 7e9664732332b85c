//! # Instill Core Library
//!
//! Core business logic for Instill, an eye-drop dose reminder. All
//! operations are available through this library; the CLI binary (and any
//! future tray/GUI shell) is a thin presentation layer over it.
//!
//! ## Architecture
//!
//! - **Countdown timer**: wall-clock based and drift corrected - the
//!   remainder is recomputed from absolute timestamps on every caller
//!   driven `tick()`, so missed ticks never compound error
//! - **Session controller**: the dose -> wait -> count -> alert ->
//!   repeat -> complete state machine, emitting events that renderers
//!   poll
//! - **Storage**: flat JSON configuration with silent default fallback
//!
//! ## Key Components
//!
//! - [`SessionController`]: the session state machine
//! - [`CountdownTimer`]: drift-corrected countdown
//! - [`Regimen`]: ordered dose list with a session cursor
//! - [`DailyTracker`]: date-keyed completion counter with day rollover
//! - [`Config`]: persisted user preferences

pub mod clock;
pub mod daily;
pub mod error;
pub mod events;
pub mod regimen;
pub mod session;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use daily::{DailyRecord, DailyTracker};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use regimen::Regimen;
pub use session::{SessionController, SessionState};
pub use storage::Config;
pub use timer::{CountdownTimer, Tick};

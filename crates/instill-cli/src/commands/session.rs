use clap::Subcommand;
use instill_core::storage::data_dir;
use instill_core::{Config, Event, SessionController};

const STATE_FILE: &str = "session.json";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Begin a dose session
    Start,
    /// The abstract confirm input: starts a session, confirms the
    /// current dose, or returns to idle, whichever applies
    Confirm,
    /// Pause or resume the countdown
    Pause,
    /// Return to idle after completing a session
    Back,
    /// Cancel the session and return to idle
    Reset,
    /// Tick the countdown and print the current snapshot as JSON
    Status,
}

fn state_path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join(STATE_FILE))
}

/// Load the persisted controller snapshot, or build a fresh one from the
/// config when there is none (or it no longer parses).
pub fn load_controller(config: &Config) -> Result<SessionController, Box<dyn std::error::Error>> {
    if let Ok(path) = state_path() {
        if let Ok(json) = std::fs::read_to_string(path) {
            if let Ok(ctl) = serde_json::from_str::<SessionController>(&json) {
                return Ok(ctl);
            }
        }
    }
    Ok(SessionController::new(config)?)
}

pub fn save_controller(ctl: &SessionController) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(ctl)?;
    std::fs::write(state_path()?, json)?;
    Ok(())
}

/// Write the controller's daily record back into the config file.
/// Save failure is logged and non-fatal.
pub fn persist_today(ctl: &SessionController, config: &mut Config) {
    config.today_record = ctl.today_record().clone();
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "failed to persist today's record");
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    let mut ctl = load_controller(&config)?;

    match action {
        SessionAction::Start => match ctl.start_session()? {
            Some(event) => print_event(&event)?,
            None => print_event(&ctl.snapshot())?,
        },
        SessionAction::Confirm => {
            // A countdown may have expired while no process was running;
            // tick first so the confirm lands on the Alert state.
            if let Some(event) = ctl.tick()? {
                print_event(&event)?;
            }
            match ctl.confirm()? {
                Some(event) => {
                    if matches!(event, Event::SessionCompleted { .. }) {
                        persist_today(&ctl, &mut config);
                    }
                    print_event(&event)?;
                }
                None => print_event(&ctl.snapshot())?,
            }
        }
        SessionAction::Pause => match ctl.toggle_pause() {
            Some(event) => print_event(&event)?,
            None => print_event(&ctl.snapshot())?,
        },
        SessionAction::Back => match ctl.back_to_idle() {
            Some(event) => print_event(&event)?,
            None => print_event(&ctl.snapshot())?,
        },
        SessionAction::Reset => {
            // Same forced-cancel path as a settings save.
            let event = ctl.apply_settings(&config)?;
            print_event(&event)?;
        }
        SessionAction::Status => {
            if let Some(event) = ctl.tick()? {
                print_event(&event)?;
            }
            print_event(&ctl.snapshot())?;
        }
    }

    save_controller(&ctl)?;
    Ok(())
}

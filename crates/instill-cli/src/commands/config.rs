use clap::Subcommand;
use instill_core::Config;

use super::session;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as JSON
    Show,
    /// Print a single value by its flat JSON key
    Get { key: String },
    /// Set a value; applies immediately and cancels any session in flight
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();

    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown config key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            // Validate against the session before persisting, so an
            // unusable value (e.g. a zero interval) never lands on disk.
            apply_to_session(&config)?;
            config.save()?;
            println!("{key} = {}", config.get(&key).unwrap_or_default());
        }
    }
    Ok(())
}

/// Settings-saved transition: reload the persisted session's inputs and
/// force it back to idle.
pub fn apply_to_session(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctl = session::load_controller(config)?;
    let event = ctl.apply_settings(config)?;
    session::save_controller(&ctl)?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

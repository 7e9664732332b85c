use clap::Subcommand;
use instill_core::{Config, Event};

use super::session::{load_controller, persist_today, save_controller};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print today's completion count against the daily goal
    Today,
    /// Reset today's completed session count to zero
    ResetToday,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    let mut ctl = load_controller(&config)?;

    match action {
        StatsAction::Today => {
            if let Event::StateSnapshot {
                completed_today,
                daily_goal,
                ..
            } = ctl.snapshot()
            {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "completedSessions": completed_today,
                        "dailyGoal": daily_goal,
                    }))?
                );
            }
        }
        StatsAction::ResetToday => {
            let event = ctl.reset_today();
            persist_today(&ctl, &mut config);
            save_controller(&ctl)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

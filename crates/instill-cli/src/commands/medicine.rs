use clap::{Subcommand, ValueEnum};
use instill_core::{Config, Regimen};

use super::config::apply_to_session;

#[derive(Subcommand)]
pub enum MedicineAction {
    /// List doses in administration order
    List,
    /// Append a dose
    Add { name: String },
    /// Remove the dose at a zero-based index (the list keeps >= 1 entry)
    Remove { index: usize },
    /// Rename the dose at a zero-based index
    Rename { index: usize, name: String },
    /// Move a dose one place up or down
    Move {
        index: usize,
        #[arg(value_enum)]
        direction: Direction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

pub fn run(action: MedicineAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();

    if let MedicineAction::List = action {
        for (i, name) in config.medicines.iter().enumerate() {
            println!("{}. {name}", i + 1);
        }
        return Ok(());
    }

    // Route edits through the regimen so its rules apply: length >= 1,
    // blank names rejected, in-range moves only.
    let mut regimen = Regimen::new(config.medicines.clone())?;
    match action {
        MedicineAction::List => unreachable!("handled above"),
        MedicineAction::Add { name } => regimen.add(&name)?,
        MedicineAction::Remove { index } => {
            let removed = regimen.remove(index)?;
            println!("removed: {removed}");
        }
        MedicineAction::Rename { index, name } => regimen.rename(index, &name)?,
        MedicineAction::Move { index, direction } => {
            let offset = match direction {
                Direction::Up => -1,
                Direction::Down => 1,
            };
            regimen.move_dose(index, offset)?;
        }
    }

    config.medicines = regimen.doses().to_vec();
    apply_to_session(&config)?;
    config.save()?;

    for (i, name) in config.medicines.iter().enumerate() {
        println!("{}. {name}", i + 1);
    }
    Ok(())
}

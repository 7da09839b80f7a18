//! AI habit-plan intake commands.
//!
//! The plan text is whatever the suggestion service returned -- a JSON
//! array, possibly wrapped in markdown fences or prose. `preview`
//! shows the normalized drafts; `accept` bulk-inserts them.

use std::io::Read;
use std::path::PathBuf;

use clap::Subcommand;
use waddle_core::{suggestions, Database};

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Parse a plan and show the normalized habits without saving
    Preview {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Parse a plan and add all valid habits to the ledger
    Accept {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(action: PlanAction) -> CliResult {
    match action {
        PlanAction::Preview { file } => {
            let plan = suggestions::parse_plan(&read_input(file)?)?;
            println!("{}", serde_json::to_string_pretty(&plan.drafts)?);
            if plan.skipped > 0 {
                eprintln!("skipped {} invalid entries", plan.skipped);
            }
        }
        PlanAction::Accept { file } => {
            let plan = suggestions::parse_plan(&read_input(file)?)?;
            if plan.is_empty() {
                return Err("plan contains no valid habits".into());
            }

            let mut db = Database::open()?;
            let mut service = common::open_service(&db)?;
            let outcome = service.accept_plan(plan.drafts)?;
            println!("Added {} habits:", outcome.value.len());
            for habit in &outcome.value {
                println!("  {}  {}", habit.id, habit.title);
            }
            if plan.skipped > 0 {
                eprintln!("skipped {} invalid entries", plan.skipped);
            }
            common::flush(&mut db, &mut service)?;
        }
    }
    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String, Box<dyn std::error::Error>> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

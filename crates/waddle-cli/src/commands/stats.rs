//! Progress statistics commands.

use clap::Subcommand;
use waddle_core::{stats, Database};

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Due/completed summary for today and the trailing week
    Today,
    /// Current streak per habit
    Streaks,
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let service = common::open_service(&db)?;
    let today = chrono::Local::now().date_naive();

    match action {
        StatsAction::Today => {
            let due = service.due_on(today);
            let completed = due
                .iter()
                .filter(|h| service.completed_on(&h.id, today))
                .count();
            println!("{today}: {completed}/{} due habits completed", due.len());

            let summary = stats::week_summary(service.ledger(), today);
            println!(
                "7-day completion rate: {:.0}%",
                summary.completion_rate() * 100.0
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Streaks => {
            let streaks = stats::streaks(service.ledger(), today);
            println!("{}", serde_json::to_string_pretty(&streaks)?);
        }
    }
    Ok(())
}

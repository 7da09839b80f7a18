//! Remote sync commands.

use clap::Subcommand;
use waddle_core::Database;

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Replace local state with the full remote snapshot
    Refresh,
    /// Show what the next sync would operate on
    Status,
}

pub fn run(action: SyncAction) -> CliResult {
    let mut db = Database::open()?;
    let mut service = common::open_service(&db)?;

    match action {
        SyncAction::Refresh => {
            let summary = service.refresh()?;
            println!(
                "Refreshed: {} habits, {} log entries",
                summary.habit_count, summary.log_count
            );
            common::flush(&mut db, &mut service)?;
        }
        SyncAction::Status => {
            match service.session() {
                Some(session) => println!("Session: {}", session.user_id),
                None => println!("Session: none (guest mode, local only)"),
            }
            println!("Habits: {}", service.habits().len());
            println!("Log entries: {}", service.ledger().completion_count());
            if !service.guest_habits().is_empty() {
                println!(
                    "Pending guest habits awaiting sign-in: {}",
                    service.guest_habits().len()
                );
            }
            match service.current_challenge() {
                Some(challenge) => println!(
                    "Challenge: {} (day {}, {})",
                    challenge.id,
                    challenge.current_day,
                    challenge.status.as_str()
                ),
                None => println!("Challenge: none"),
            }
        }
    }
    Ok(())
}

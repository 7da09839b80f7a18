//! 21-day challenge commands for CLI.

use clap::Subcommand;
use waddle_core::{Database, CHALLENGE_LENGTH_DAYS};

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Start a challenge bound to a habit (fails any active one)
    Start {
        /// Habit ID to bind
        habit_id: String,
        /// Display name for the challenge
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the tracked challenge
    Status,
    /// Abandon the active challenge
    Quit,
}

pub fn run(action: ChallengeAction) -> CliResult {
    let mut db = Database::open()?;
    let mut service = common::open_service(&db)?;

    match action {
        ChallengeAction::Start { habit_id, name } => {
            let outcome = service.start_challenge(&habit_id, name.as_deref())?;
            println!("Challenge started: {}", outcome.value.id);
            println!("{}", serde_json::to_string_pretty(&outcome.value)?);
            common::flush(&mut db, &mut service)?;
        }
        ChallengeAction::Status => match service.current_challenge() {
            Some(challenge) => {
                println!(
                    "{} -- day {}/{} ({})",
                    challenge.name,
                    challenge.current_day,
                    CHALLENGE_LENGTH_DAYS,
                    challenge.status.as_str()
                );
                println!("{}", serde_json::to_string_pretty(challenge)?);
            }
            None => println!("No challenge yet. Start one with `challenge start <habit-id>`."),
        },
        ChallengeAction::Quit => {
            let outcome = service.quit_challenge()?;
            println!(
                "Challenge abandoned at day {}: {}",
                outcome.value.current_day, outcome.value.id
            );
            common::flush(&mut db, &mut service)?;
        }
    }
    Ok(())
}

//! Habit management commands for CLI.

use clap::Subcommand;
use waddle_core::{Database, Frequency, HabitDraft, TimeOfDay};

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Icon name for client rendering
        #[arg(long, default_value = "sparkles")]
        icon: String,
        /// Time of day: anytime, morning, afternoon or evening
        #[arg(long, default_value = "anytime")]
        time: String,
        /// Comma-separated weekday indices (0=Sun .. 6=Sat); empty means daily
        #[arg(long)]
        frequency: Option<String>,
    },
    /// List all habits
    List,
    /// Flip completion for a habit on a date
    Toggle {
        /// Habit ID
        id: String,
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List habits due on a date
    Due {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> CliResult {
    let mut db = Database::open()?;
    let mut service = common::open_service(&db)?;

    match action {
        HabitAction::Add {
            title,
            icon,
            time,
            frequency,
        } => {
            let draft = HabitDraft::new(title)
                .with_icon(icon)
                .with_time_of_day(TimeOfDay::parse(&time))
                .with_frequency(parse_frequency(frequency.as_deref()));
            let outcome = service.add_habit(draft)?;
            println!("Habit created: {}", outcome.value.id);
            println!("{}", serde_json::to_string_pretty(&outcome.value)?);
            common::flush(&mut db, &mut service)?;
        }
        HabitAction::List => {
            println!("{}", serde_json::to_string_pretty(service.habits())?);
        }
        HabitAction::Toggle { id, date } => {
            let date = common::parse_date(date.as_deref())?;
            let outcome = service.toggle_habit(&id, date)?;
            let state = if outcome.value.completed {
                "completed"
            } else {
                "incomplete"
            };
            println!("{id} on {date}: {state}");
            if let Some(progress) = outcome.value.challenge {
                println!(
                    "challenge: day {} ({})",
                    progress.current_day,
                    progress.status.as_str()
                );
            }
            common::flush(&mut db, &mut service)?;
        }
        HabitAction::Due { date } => {
            let date = common::parse_date(date.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&service.due_on(date))?);
        }
        HabitAction::Delete { id } => {
            service.remove_habit(&id)?;
            println!("Habit deleted: {id}");
            common::flush(&mut db, &mut service)?;
        }
    }
    Ok(())
}

/// "1,3,5" -> Frequency; out-of-range or junk entries are dropped,
/// matching the ledger's coercion policy.
fn parse_frequency(raw: Option<&str>) -> Frequency {
    match raw {
        Some(raw) => Frequency::new(raw.split(',').filter_map(|s| s.trim().parse().ok())),
        None => Frequency::every_day(),
    }
}

//! Remote persistence boundary.
//!
//! The core treats remote storage as an external collaborator: one row
//! per entity, one round trip per operation, at-least-once delivery,
//! no transactions across tables. [`RemoteStore`] is the seam;
//! [`rest::RestStore`] talks to a hosted PostgREST-style table API and
//! [`memory::MemoryStore`] backs tests and guest/offline runs.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::{Challenge, ChallengeStatus};
use crate::error::RemoteError;
use crate::habit::{Frequency, Habit, TimeOfDay};

/// `habits` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRow {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub time_of_day: String,
    pub frequency: Vec<u8>,
    #[serde(default)]
    pub streak: u32,
    pub owner: String,
}

/// `habit_completion_log` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub habit_id: String,
    pub date: NaiveDate,
    pub owner: String,
}

/// `challenges` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRow {
    pub id: String,
    pub habit_id: String,
    pub name: String,
    pub status: String,
    pub current_day: u8,
    pub owner: String,
}

impl HabitRow {
    pub fn from_habit(habit: &Habit, owner: &str) -> Self {
        Self {
            id: habit.id.clone(),
            title: habit.title.clone(),
            icon: habit.icon.clone(),
            time_of_day: habit.time_of_day.as_str().to_string(),
            frequency: habit.frequency.clone().into(),
            streak: habit.streak,
            owner: owner.to_string(),
        }
    }

    /// Server rows are trusted for identity but normalized for shape:
    /// unknown time-of-day falls back to Anytime and out-of-range
    /// weekdays are filtered, same as user input.
    pub fn into_habit(self) -> Habit {
        Habit {
            id: self.id,
            title: self.title,
            icon: self.icon,
            time_of_day: TimeOfDay::parse(&self.time_of_day),
            frequency: Frequency::new(self.frequency),
            streak: self.streak,
            created_at: Utc::now(),
        }
    }
}

impl ChallengeRow {
    pub fn from_challenge(challenge: &Challenge, owner: &str) -> Self {
        Self {
            id: challenge.id.clone(),
            habit_id: challenge.habit_id.clone(),
            name: challenge.name.clone(),
            status: challenge.status.as_str().to_string(),
            current_day: challenge.current_day,
            owner: owner.to_string(),
        }
    }

    pub fn into_challenge(self) -> Challenge {
        Challenge {
            id: self.id,
            habit_id: self.habit_id,
            name: self.name,
            status: ChallengeStatus::parse(&self.status).unwrap_or(ChallengeStatus::Failed),
            current_day: self.current_day,
            started_at: Utc::now(),
        }
    }
}

/// CRUD contract against the remote tables (spec'd collaborator).
///
/// Implementations are synchronous at the trait surface; the REST
/// implementation blocks on its own runtime internally.
pub trait RemoteStore: Send + Sync {
    /// Create a habit row. The server may apply defaults (including a
    /// different id); callers reconcile by re-fetching.
    fn create_habit(&self, row: &HabitRow) -> Result<HabitRow, RemoteError>;

    fn list_habits(&self, owner: &str) -> Result<Vec<HabitRow>, RemoteError>;

    fn delete_habit(&self, id: &str) -> Result<(), RemoteError>;

    fn insert_log(&self, row: &LogRow) -> Result<(), RemoteError>;

    fn delete_log(&self, habit_id: &str, date: NaiveDate) -> Result<(), RemoteError>;

    fn list_logs(&self, owner: &str) -> Result<Vec<LogRow>, RemoteError>;

    fn create_challenge(&self, row: &ChallengeRow) -> Result<ChallengeRow, RemoteError>;

    fn update_challenge(
        &self,
        id: &str,
        status: &str,
        current_day: u8,
    ) -> Result<(), RemoteError>;

    /// The single active challenge for `owner`, if any.
    fn active_challenge(&self, owner: &str) -> Result<Option<ChallengeRow>, RemoteError>;
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeStatus;

/// Every state change in the system produces an Event.
/// The service appends them; callers drain and render/log them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitAdded {
        habit_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    HabitRemoved {
        habit_id: String,
        at: DateTime<Utc>,
    },
    HabitToggled {
        habit_id: String,
        date: NaiveDate,
        completed: bool,
        at: DateTime<Utc>,
    },
    ChallengeStarted {
        challenge_id: String,
        habit_id: String,
        at: DateTime<Utc>,
    },
    /// The day counter moved in either direction.
    ChallengeProgressed {
        challenge_id: String,
        current_day: u8,
        at: DateTime<Utc>,
    },
    /// The challenge reached a terminal state.
    ChallengeEnded {
        challenge_id: String,
        status: ChallengeStatus,
        at: DateTime<Utc>,
    },
    /// Guest habits were bulk-inserted after sign-in.
    GuestHabitsMigrated {
        migrated: usize,
        at: DateTime<Utc>,
    },
    /// A remote write failed; local optimistic state stands.
    SyncFailed {
        operation: String,
        message: String,
        at: DateTime<Utc>,
    },
    /// Local state was replaced by a full remote snapshot.
    Refreshed {
        habit_count: usize,
        log_count: usize,
        at: DateTime<Utc>,
    },
}

//! In-process implementation of [`RemoteStore`].
//!
//! Backs unit tests and guest/offline development runs. A failure
//! switch makes the optimistic-update error paths testable, and an
//! id-minting switch simulates servers that assign their own row ids.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{ChallengeRow, HabitRow, LogRow, RemoteStore};
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct Inner {
    habits: Vec<HabitRow>,
    logs: Vec<LogRow>,
    challenges: Vec<ChallengeRow>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failing: AtomicBool,
    mint_ids: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the server mint its own ids on create, like the hosted
    /// backend does when the client leaves defaults in place.
    pub fn with_server_ids() -> Self {
        let store = Self::default();
        store.mint_ids.store(true, Ordering::Relaxed);
        store
    }

    /// When set, every operation fails with an unavailable error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(RemoteError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only happens if a test panicked mid-write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored habit rows (test helper).
    pub fn habit_count(&self) -> usize {
        self.lock().habits.len()
    }

    /// Number of stored log rows (test helper).
    pub fn log_count(&self) -> usize {
        self.lock().logs.len()
    }
}

impl RemoteStore for MemoryStore {
    fn create_habit(&self, row: &HabitRow) -> Result<HabitRow, RemoteError> {
        self.check()?;
        let mut row = row.clone();
        if self.mint_ids.load(Ordering::Relaxed) {
            row.id = Uuid::new_v4().to_string();
        }
        self.lock().habits.push(row.clone());
        Ok(row)
    }

    fn list_habits(&self, owner: &str) -> Result<Vec<HabitRow>, RemoteError> {
        self.check()?;
        Ok(self
            .lock()
            .habits
            .iter()
            .filter(|h| h.owner == owner)
            .cloned()
            .collect())
    }

    fn delete_habit(&self, id: &str) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        inner.habits.retain(|h| h.id != id);
        inner.logs.retain(|l| l.habit_id != id);
        Ok(())
    }

    fn insert_log(&self, row: &LogRow) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        // At most one entry per (habit_id, date).
        if !inner
            .logs
            .iter()
            .any(|l| l.habit_id == row.habit_id && l.date == row.date)
        {
            inner.logs.push(row.clone());
        }
        Ok(())
    }

    fn delete_log(&self, habit_id: &str, date: NaiveDate) -> Result<(), RemoteError> {
        self.check()?;
        self.lock()
            .logs
            .retain(|l| !(l.habit_id == habit_id && l.date == date));
        Ok(())
    }

    fn list_logs(&self, owner: &str) -> Result<Vec<LogRow>, RemoteError> {
        self.check()?;
        Ok(self
            .lock()
            .logs
            .iter()
            .filter(|l| l.owner == owner)
            .cloned()
            .collect())
    }

    fn create_challenge(&self, row: &ChallengeRow) -> Result<ChallengeRow, RemoteError> {
        self.check()?;
        self.lock().challenges.push(row.clone());
        Ok(row.clone())
    }

    fn update_challenge(&self, id: &str, status: &str, current_day: u8) -> Result<(), RemoteError> {
        self.check()?;
        let mut inner = self.lock();
        for c in inner.challenges.iter_mut().filter(|c| c.id == id) {
            c.status = status.to_string();
            c.current_day = current_day;
        }
        Ok(())
    }

    fn active_challenge(&self, owner: &str) -> Result<Option<ChallengeRow>, RemoteError> {
        self.check()?;
        Ok(self
            .lock()
            .challenges
            .iter()
            .filter(|c| c.owner == owner && c.status == "active")
            .last()
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_row(habit_id: &str, date: &str) -> LogRow {
        LogRow {
            habit_id: habit_id.to_string(),
            date: date.parse().unwrap(),
            owner: "u1".to_string(),
        }
    }

    #[test]
    fn insert_log_deduplicates_pairs() {
        let store = MemoryStore::new();
        store.insert_log(&log_row("h1", "2024-01-01")).unwrap();
        store.insert_log(&log_row("h1", "2024-01-01")).unwrap();
        assert_eq!(store.log_count(), 1);
    }

    #[test]
    fn failure_switch_fails_everything() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.list_habits("u1").is_err());
        assert!(store.insert_log(&log_row("h1", "2024-01-01")).is_err());
        store.set_failing(false);
        assert!(store.list_habits("u1").is_ok());
    }

    #[test]
    fn server_id_minting_changes_ids() {
        let store = MemoryStore::with_server_ids();
        let row = HabitRow {
            id: "client-id".to_string(),
            title: "Read".to_string(),
            icon: String::new(),
            time_of_day: "anytime".to_string(),
            frequency: vec![],
            streak: 0,
            owner: "u1".to_string(),
        };
        let created = store.create_habit(&row).unwrap();
        assert_ne!(created.id, "client-id");
    }
}

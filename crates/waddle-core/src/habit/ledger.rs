//! The habit ledger: authoritative habit set plus completion log.
//!
//! The log is a set keyed by `(habit_id, date)` -- presence means
//! "completed on that date". Toggling is a pure boolean flip, so two
//! toggles in a row always return the pair to its original state.
//!
//! The ledger is purely local state. Remote persistence and the
//! optimistic-write policy live in [`crate::service::HabitService`].

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{Habit, HabitDraft};
use crate::error::ValidationError;

/// In-memory habit set and completion log.
#[derive(Debug, Clone, Default)]
pub struct HabitLedger {
    habits: Vec<Habit>,
    log: HashSet<(String, NaiveDate)>,
}

impl HabitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, habit_id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == habit_id)
    }

    pub fn contains(&self, habit_id: &str) -> bool {
        self.get(habit_id).is_some()
    }

    /// Habits due on `date`: weekday in the frequency set, or the set
    /// is empty (daily).
    pub fn due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|h| h.frequency.is_due_on(date))
            .collect()
    }

    /// True iff a completion log entry exists for the pair.
    pub fn completed_on(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.log.contains(&(habit_id.to_string(), date))
    }

    /// All completion log entries, in no particular order.
    pub fn completions(&self) -> impl Iterator<Item = &(String, NaiveDate)> {
        self.log.iter()
    }

    pub fn completion_count(&self) -> usize {
        self.log.len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a habit from a draft, minting a fresh id.
    pub fn add(&mut self, draft: HabitDraft) -> Result<Habit, ValidationError> {
        draft.validate()?;
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            icon: draft.icon,
            time_of_day: draft.time_of_day,
            frequency: draft.frequency,
            streak: 0,
            created_at: Utc::now(),
        };
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Insert a fully-formed habit (snapshot restore, remote rows).
    pub fn insert(&mut self, habit: Habit) {
        if let Some(existing) = self.habits.iter_mut().find(|h| h.id == habit.id) {
            *existing = habit;
        } else {
            self.habits.push(habit);
        }
    }

    /// Remove a habit and all its log entries.
    pub fn remove(&mut self, habit_id: &str) -> Result<Habit, ValidationError> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.id == habit_id)
            .ok_or_else(|| ValidationError::UnknownHabit(habit_id.to_string()))?;
        self.log.retain(|(id, _)| id != habit_id);
        Ok(self.habits.remove(idx))
    }

    /// Flip the completion state for `(habit_id, date)`.
    ///
    /// Returns the new completed state. Toggling an unknown habit is an
    /// invariant violation and fails outright.
    pub fn toggle(&mut self, habit_id: &str, date: NaiveDate) -> Result<bool, ValidationError> {
        if !self.contains(habit_id) {
            return Err(ValidationError::UnknownHabit(habit_id.to_string()));
        }
        let key = (habit_id.to_string(), date);
        if self.log.remove(&key) {
            Ok(false)
        } else {
            self.log.insert(key);
            Ok(true)
        }
    }

    /// Mark a pair completed without flipping (snapshot restore).
    pub fn record_completion(&mut self, habit_id: String, date: NaiveDate) {
        self.log.insert((habit_id, date));
    }

    /// Replace the whole ledger with a remote snapshot.
    /// Last-writer-wins from the server's perspective; no merge.
    pub fn replace_all(&mut self, habits: Vec<Habit>, log: Vec<(String, NaiveDate)>) {
        self.habits = habits;
        self.log = log.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Frequency;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ledger_with(title: &str, frequency: Frequency) -> (HabitLedger, String) {
        let mut ledger = HabitLedger::new();
        let id = ledger
            .add(HabitDraft::new(title).with_frequency(frequency))
            .unwrap()
            .id
            .clone();
        (ledger, id)
    }

    #[test]
    fn toggle_flips_and_is_idempotent_in_pairs() {
        let (mut ledger, id) = ledger_with("Meditate", Frequency::every_day());
        let d = date("2024-01-01");

        assert!(!ledger.completed_on(&id, d));
        assert_eq!(ledger.toggle(&id, d).unwrap(), true);
        assert!(ledger.completed_on(&id, d));
        assert_eq!(ledger.toggle(&id, d).unwrap(), false);
        assert!(!ledger.completed_on(&id, d));
    }

    #[test]
    fn toggle_unknown_habit_fails() {
        let mut ledger = HabitLedger::new();
        let err = ledger.toggle("nope", date("2024-01-01")).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownHabit(_)));
    }

    #[test]
    fn at_most_one_entry_per_pair() {
        let (mut ledger, id) = ledger_with("Read", Frequency::every_day());
        let d = date("2024-03-10");
        ledger.toggle(&id, d).unwrap();
        // Restoring the same pair again must not create a duplicate.
        ledger.record_completion(id.clone(), d);
        assert_eq!(ledger.completion_count(), 1);
    }

    #[test]
    fn due_on_honors_frequency() {
        let (ledger, id) = ledger_with("Gym", Frequency::new([1, 3, 5]));
        // Monday.
        let monday = ledger.due_on(date("2024-01-01"));
        assert!(monday.iter().any(|h| h.id == id));
        // Tuesday.
        assert!(ledger.due_on(date("2024-01-02")).is_empty());
    }

    #[test]
    fn daily_habit_is_always_due() {
        let (ledger, id) = ledger_with("Water", Frequency::every_day());
        for day in 1..=7 {
            let d = date(&format!("2024-01-0{day}"));
            assert!(ledger.due_on(d).iter().any(|h| h.id == id));
        }
    }

    #[test]
    fn dates_are_independent() {
        let (mut ledger, id) = ledger_with("Journal", Frequency::every_day());
        ledger.toggle(&id, date("2024-01-01")).unwrap();
        assert!(ledger.completed_on(&id, date("2024-01-01")));
        assert!(!ledger.completed_on(&id, date("2024-01-02")));
    }

    #[test]
    fn remove_drops_log_entries() {
        let (mut ledger, id) = ledger_with("Stretch", Frequency::every_day());
        ledger.toggle(&id, date("2024-01-01")).unwrap();
        ledger.remove(&id).unwrap();
        assert_eq!(ledger.completion_count(), 0);
        assert!(!ledger.contains(&id));
    }

    #[test]
    fn replace_all_is_last_writer_wins() {
        let (mut ledger, id) = ledger_with("Old", Frequency::every_day());
        ledger.toggle(&id, date("2024-01-01")).unwrap();

        let mut other = HabitLedger::new();
        let new_habit = other.add(HabitDraft::new("New")).unwrap();
        ledger.replace_all(vec![new_habit.clone()], vec![]);

        assert!(!ledger.contains(&id));
        assert!(ledger.contains(&new_habit.id));
        assert_eq!(ledger.completion_count(), 0);
    }
}

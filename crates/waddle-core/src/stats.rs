//! Progress statistics derived from the completion log.
//!
//! The log is the authoritative completion record; the `streak` field
//! stored on habits is advisory display state. Everything here is a
//! pure derivation over the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit::HabitLedger;

/// How far back streak walks look before giving up.
const MAX_LOOKBACK_DAYS: u32 = 366;

/// Streak summary for one habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStreak {
    pub habit_id: String,
    pub title: String,
    pub current_streak: u32,
    pub total_completions: u32,
}

/// Due/completed counts for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub due: usize,
    pub completed: usize,
}

/// Rolling 7-day view ending at a reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub days: Vec<DaySummary>,
}

impl WeekSummary {
    /// Completed-over-due across the window. 0.0 when nothing was due.
    pub fn completion_rate(&self) -> f64 {
        let due: usize = self.days.iter().map(|d| d.due).sum();
        if due == 0 {
            return 0.0;
        }
        let completed: usize = self.days.iter().map(|d| d.completed).sum();
        completed as f64 / due as f64
    }
}

/// Consecutive-due-days streak for a habit, walking back from `today`.
///
/// Days on which the habit is not due are skipped rather than breaking
/// the streak. An incomplete `today` does not break the streak either;
/// the day is simply still in progress and not counted yet.
pub fn current_streak(
    ledger: &HabitLedger,
    habit_id: &str,
    today: NaiveDate,
) -> Result<u32, ValidationError> {
    let habit = ledger
        .get(habit_id)
        .ok_or_else(|| ValidationError::UnknownHabit(habit_id.to_string()))?;

    let mut date = today;
    if habit.frequency.is_due_on(date) && !ledger.completed_on(habit_id, date) {
        match date.pred_opt() {
            Some(prev) => date = prev,
            None => return Ok(0),
        }
    }

    let mut streak = 0;
    for _ in 0..MAX_LOOKBACK_DAYS {
        if habit.frequency.is_due_on(date) {
            if ledger.completed_on(habit_id, date) {
                streak += 1;
            } else {
                break;
            }
        }
        match date.pred_opt() {
            Some(prev) => date = prev,
            None => break,
        }
    }
    Ok(streak)
}

/// Streaks for every habit in the ledger.
pub fn streaks(ledger: &HabitLedger, today: NaiveDate) -> Vec<HabitStreak> {
    ledger
        .habits()
        .iter()
        .map(|h| HabitStreak {
            habit_id: h.id.clone(),
            title: h.title.clone(),
            // get() succeeded by construction, so this cannot fail.
            current_streak: current_streak(ledger, &h.id, today).unwrap_or(0),
            total_completions: ledger
                .completions()
                .filter(|(id, _)| *id == h.id)
                .count() as u32,
        })
        .collect()
}

/// Due/completed counts for the 7 days ending at `today`.
pub fn week_summary(ledger: &HabitLedger, today: NaiveDate) -> WeekSummary {
    let days = (0..7)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(back)))
        .map(|date| {
            let due = ledger.due_on(date);
            let completed = due
                .iter()
                .filter(|h| ledger.completed_on(&h.id, date))
                .count();
            DaySummary {
                date,
                due: due.len(),
                completed,
            }
        })
        .collect();
    WeekSummary { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Frequency, HabitDraft};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ledger_with(frequency: Frequency) -> (HabitLedger, String) {
        let mut ledger = HabitLedger::new();
        let id = ledger
            .add(HabitDraft::new("Habit").with_frequency(frequency))
            .unwrap()
            .id;
        (ledger, id)
    }

    #[test]
    fn daily_streak_counts_consecutive_days() {
        let (mut ledger, id) = ledger_with(Frequency::every_day());
        for d in ["2024-01-03", "2024-01-04", "2024-01-05"] {
            ledger.toggle(&id, date(d)).unwrap();
        }
        assert_eq!(current_streak(&ledger, &id, date("2024-01-05")).unwrap(), 3);
    }

    #[test]
    fn gap_breaks_the_streak() {
        let (mut ledger, id) = ledger_with(Frequency::every_day());
        ledger.toggle(&id, date("2024-01-02")).unwrap();
        ledger.toggle(&id, date("2024-01-04")).unwrap();
        ledger.toggle(&id, date("2024-01-05")).unwrap();
        assert_eq!(current_streak(&ledger, &id, date("2024-01-05")).unwrap(), 2);
    }

    #[test]
    fn incomplete_today_does_not_break_streak() {
        let (mut ledger, id) = ledger_with(Frequency::every_day());
        ledger.toggle(&id, date("2024-01-03")).unwrap();
        ledger.toggle(&id, date("2024-01-04")).unwrap();
        // Nothing logged for the 5th yet.
        assert_eq!(current_streak(&ledger, &id, date("2024-01-05")).unwrap(), 2);
    }

    #[test]
    fn non_due_days_are_skipped_not_broken() {
        // Mon/Wed/Fri habit completed Mon and Wed; querying on Thursday
        // must not treat Tue/Thu as misses.
        let (mut ledger, id) = ledger_with(Frequency::new([1, 3, 5]));
        ledger.toggle(&id, date("2024-01-01")).unwrap(); // Monday
        ledger.toggle(&id, date("2024-01-03")).unwrap(); // Wednesday
        assert_eq!(current_streak(&ledger, &id, date("2024-01-04")).unwrap(), 2);
    }

    #[test]
    fn unknown_habit_errors() {
        let ledger = HabitLedger::new();
        assert!(current_streak(&ledger, "nope", date("2024-01-01")).is_err());
    }

    #[test]
    fn week_summary_counts_due_and_completed() {
        let (mut ledger, id) = ledger_with(Frequency::every_day());
        ledger.toggle(&id, date("2024-01-06")).unwrap();
        ledger.toggle(&id, date("2024-01-07")).unwrap();

        let summary = week_summary(&ledger, date("2024-01-07"));
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0].date, date("2024-01-01"));
        assert_eq!(summary.days[6].date, date("2024-01-07"));
        let due: usize = summary.days.iter().map(|d| d.due).sum();
        assert_eq!(due, 7);
        assert!((summary.completion_rate() - 2.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn empty_ledger_has_zero_rate() {
        let summary = week_summary(&HabitLedger::new(), date("2024-01-07"));
        assert_eq!(summary.completion_rate(), 0.0);
    }
}

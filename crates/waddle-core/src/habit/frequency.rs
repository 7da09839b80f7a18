//! Weekly recurrence schedule for habits.
//!
//! A frequency is a set of weekday indices (0 = Sunday .. 6 = Saturday)
//! on which a habit is due. The empty set means "every day", which is
//! also the default. Out-of-range values are filtered at construction
//! rather than rejected: plans coming back from the model routinely
//! carry noisy weekday values and the product treats them as
//! best-effort input.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Highest valid weekday index (Saturday).
pub const MAX_WEEKDAY: u8 = 6;

/// Weekday index for a calendar date, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Set of weekdays on which a habit is due.
///
/// Serializes as a plain array of weekday indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct Frequency {
    days: BTreeSet<u8>,
}

impl Frequency {
    /// Every day (the empty set).
    pub fn every_day() -> Self {
        Self::default()
    }

    /// Build from weekday indices, dropping anything above Saturday.
    pub fn new<I: IntoIterator<Item = u8>>(days: I) -> Self {
        Self {
            days: days.into_iter().filter(|d| *d <= MAX_WEEKDAY).collect(),
        }
    }

    /// True when the habit is due on the given weekday index.
    pub fn is_due(&self, weekday: u8) -> bool {
        self.days.is_empty() || self.days.contains(&weekday)
    }

    /// True when the habit is due on the given calendar date.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.is_due(weekday_index(date))
    }

    /// True when the habit is due every day.
    pub fn is_daily(&self) -> bool {
        self.days.is_empty()
    }

    /// Weekday indices in ascending order.
    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        self.days.iter().copied()
    }
}

impl From<Vec<u8>> for Frequency {
    fn from(days: Vec<u8>) -> Self {
        Self::new(days)
    }
}

impl From<Frequency> for Vec<u8> {
    fn from(f: Frequency) -> Self {
        f.days.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_set_means_every_day() {
        let f = Frequency::every_day();
        for weekday in 0..=6 {
            assert!(f.is_due(weekday));
        }
        assert!(f.is_daily());
    }

    #[test]
    fn mon_wed_fri_schedule() {
        let f = Frequency::new([1, 3, 5]);
        // 2024-01-01 is a Monday.
        assert!(f.is_due_on(date("2024-01-01")));
        // Tuesday.
        assert!(!f.is_due_on(date("2024-01-02")));
        // Wednesday.
        assert!(f.is_due_on(date("2024-01-03")));
        // Sunday.
        assert!(!f.is_due_on(date("2024-01-07")));
    }

    #[test]
    fn out_of_range_days_are_dropped() {
        let f = Frequency::new([1, 9, 3, 255]);
        assert_eq!(f.days().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn all_invalid_collapses_to_every_day() {
        // Filtering everything leaves the empty set, i.e. daily.
        let f = Frequency::new([7, 8, 200]);
        assert!(f.is_daily());
    }

    #[test]
    fn weekday_index_is_sunday_based() {
        // 2024-01-07 is a Sunday.
        assert_eq!(weekday_index(date("2024-01-07")), 0);
        assert_eq!(weekday_index(date("2024-01-08")), 1);
        assert_eq!(weekday_index(date("2024-01-13")), 6);
    }

    #[test]
    fn serde_round_trip_normalizes() {
        let f: Frequency = serde_json::from_str("[5,1,9,3]").unwrap();
        assert_eq!(f, Frequency::new([1, 3, 5]));
        assert_eq!(serde_json::to_string(&f).unwrap(), "[1,3,5]");
    }
}

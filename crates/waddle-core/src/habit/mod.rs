//! Habit domain types and the completion ledger.

pub mod frequency;
pub mod ledger;

pub use frequency::{weekday_index, Frequency};
pub use ledger::HabitLedger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Preferred time of day for a habit. Display-level grouping only;
/// it never affects due/completed derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Anytime,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Anytime => "anytime",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Parse leniently; anything unrecognized falls back to `Anytime`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "morning" => TimeOfDay::Morning,
            "afternoon" => TimeOfDay::Afternoon,
            "evening" => TimeOfDay::Evening,
            _ => TimeOfDay::Anytime,
        }
    }
}

/// A recurring user-defined action tracked for completion.
///
/// The `streak` field is advisory display state carried over from the
/// remote rows; real completion truth lives in the ledger's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub time_of_day: TimeOfDay,
    pub frequency: Frequency,
    #[serde(default)]
    pub streak: u32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a habit, before an id is minted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitDraft {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub frequency: Frequency,
}

impl HabitDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// A draft is valid iff its title has visible content.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_fails_validation() {
        assert!(HabitDraft::new("").validate().is_err());
        assert!(HabitDraft::new("   ").validate().is_err());
        assert!(HabitDraft::new("Drink water").validate().is_ok());
    }

    #[test]
    fn time_of_day_parse_is_lenient() {
        assert_eq!(TimeOfDay::parse("Morning"), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::parse("EVENING"), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::parse("noonish"), TimeOfDay::Anytime);
    }
}

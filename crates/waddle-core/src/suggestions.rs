//! Habit-plan intake from generative model output.
//!
//! The suggestion service returns habit plans as a JSON array, but the
//! raw text frequently arrives wrapped in markdown fences or
//! surrounding prose. This module extracts the first JSON array from
//! the text, then validates and normalizes each entry into a
//! [`HabitDraft`] ready for bulk insert into the ledger.
//!
//! The model call itself lives outside this crate; only its output
//! shape is handled here.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::habit::{Frequency, HabitDraft, TimeOfDay};

/// Icon used when a suggestion does not name one.
const DEFAULT_ICON: &str = "sparkles";

/// One entry of the model's JSON array, taken permissively.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(default)]
    title: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    time: Option<String>,
    /// Weekday indices; values outside 0..=6 are dropped.
    #[serde(default)]
    frequency: Option<Vec<i64>>,
}

/// A normalized habit plan plus a count of entries that failed
/// validation and were skipped.
#[derive(Debug, Clone, Default)]
pub struct HabitPlan {
    pub drafts: Vec<HabitDraft>,
    pub skipped: usize,
}

impl HabitPlan {
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

/// Parse raw model text into a habit plan.
///
/// Fails only when no JSON array can be located or the array itself is
/// malformed; individual bad entries are skipped and counted.
pub fn parse_plan(raw: &str) -> Result<HabitPlan, ValidationError> {
    let json = extract_json_array(raw).ok_or_else(|| ValidationError::InvalidValue {
        field: "plan".to_string(),
        message: "no JSON array found in model output".to_string(),
    })?;

    let entries: Vec<RawSuggestion> =
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidValue {
            field: "plan".to_string(),
            message: e.to_string(),
        })?;

    let mut plan = HabitPlan::default();
    for entry in entries {
        match normalize(entry) {
            Some(draft) => plan.drafts.push(draft),
            None => plan.skipped += 1,
        }
    }
    Ok(plan)
}

/// Slice from the first `[` to the last `]`, tolerating ```json fences
/// and prose around the array.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn normalize(entry: RawSuggestion) -> Option<HabitDraft> {
    let title = entry.title.trim();
    if title.is_empty() {
        return None;
    }

    let frequency = match entry.frequency {
        // Negative values cannot be weekdays; wide positives are
        // filtered by Frequency itself.
        Some(days) => Frequency::new(
            days.into_iter()
                .filter(|d| (0..=255).contains(d))
                .map(|d| d as u8),
        ),
        None => Frequency::every_day(),
    };

    Some(
        HabitDraft::new(title)
            .with_icon(entry.icon.filter(|i| !i.trim().is_empty()).unwrap_or_else(|| DEFAULT_ICON.to_string()))
            .with_time_of_day(entry.time.as_deref().map(TimeOfDay::parse).unwrap_or_default())
            .with_frequency(frequency),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_array() {
        let plan = parse_plan(r#"[{"title":"Read 10 pages","icon":"book"}]"#).unwrap();
        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.drafts[0].title, "Read 10 pages");
        assert_eq!(plan.drafts[0].icon, "book");
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n[{\"title\":\"Stretch\"}]\n```";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.drafts[0].icon, DEFAULT_ICON);
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let raw = "Here is your plan!\n[{\"title\":\"Walk\",\"time\":\"Morning\"}]\nGood luck!";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.drafts[0].time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn coerces_invalid_weekdays() {
        let raw = r#"[{"title":"Gym","frequency":[1,3,9,-2,5]}]"#;
        let plan = parse_plan(raw).unwrap();
        let days: Vec<u8> = plan.drafts[0].frequency.days().collect();
        assert_eq!(days, vec![1, 3, 5]);
    }

    #[test]
    fn skips_entries_without_title() {
        let raw = r#"[{"title":"Hydrate"},{"icon":"zap"},{"title":"  "}]"#;
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.skipped, 2);
    }

    #[test]
    fn missing_frequency_defaults_to_daily() {
        let plan = parse_plan(r#"[{"title":"Meditate"}]"#).unwrap();
        assert!(plan.drafts[0].frequency.is_daily());
    }

    #[test]
    fn no_array_is_an_error() {
        assert!(parse_plan("Sorry, I can't help with that.").is_err());
        assert!(parse_plan("").is_err());
    }

    #[test]
    fn malformed_array_is_an_error() {
        assert!(parse_plan("[{\"title\": }]").is_err());
    }
}

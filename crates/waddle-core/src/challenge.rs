//! 21-day challenge progression engine.
//!
//! A challenge binds to exactly one habit and advances in lock-step
//! with completion toggles on that habit. The engine is a downstream
//! observer of ledger mutations: it never touches the ledger itself.
//!
//! ## State transitions
//!
//! ```text
//! start  -> Active (fails any previously active challenge first)
//! toggle -> current_day +/- 1, clamped to [0, 21]; 21 -> Completed
//! quit   -> Failed
//! ```
//!
//! The counter tracks net completions of the bound habit while the
//! challenge is active, not calendar consecutiveness. Unchecking a
//! prior day's completion regresses progress accordingly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Total days to complete a challenge.
pub const CHALLENGE_LENGTH_DAYS: u8 = 21;

/// Label used when the user starts a challenge without naming it.
pub const DEFAULT_CHALLENGE_NAME: &str = "21-Day Challenge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Failed,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Active => "active",
            ChallengeStatus::Completed => "completed",
            ChallengeStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ChallengeStatus::Active),
            "completed" => Some(ChallengeStatus::Completed),
            "failed" => Some(ChallengeStatus::Failed),
            _ => None,
        }
    }

    /// Completed and Failed absorb all further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChallengeStatus::Active)
    }
}

/// A 21-day commitment bound to a single habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub habit_id: String,
    pub name: String,
    pub status: ChallengeStatus,
    /// Progress counter, always within `[0, 21]`.
    pub current_day: u8,
    pub started_at: DateTime<Utc>,
}

/// Outcome of feeding one toggle into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current_day: u8,
    pub status: ChallengeStatus,
}

/// State machine over at most one tracked challenge.
///
/// The tracked slot keeps the most recent challenge even after it
/// reaches a terminal state, so callers can render the completed or
/// failed run; only an `Active` one reacts to toggles.
#[derive(Debug, Clone, Default)]
pub struct ChallengeEngine {
    challenge: Option<Challenge>,
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The tracked challenge regardless of status.
    pub fn current(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// The tracked challenge iff it is still active.
    pub fn active(&self) -> Option<&Challenge> {
        self.challenge
            .as_ref()
            .filter(|c| c.status == ChallengeStatus::Active)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new challenge bound to `habit_id`.
    ///
    /// At most one challenge is active at any time: a currently active
    /// one is forcibly failed first and returned as the second element.
    pub fn start(&mut self, habit_id: &str, name: Option<&str>) -> (Challenge, Option<Challenge>) {
        let displaced = match self.challenge.take() {
            Some(mut old) if old.status == ChallengeStatus::Active => {
                old.status = ChallengeStatus::Failed;
                Some(old)
            }
            _ => None,
        };

        let challenge = Challenge {
            id: Uuid::new_v4().to_string(),
            habit_id: habit_id.to_string(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_CHALLENGE_NAME)
                .to_string(),
            status: ChallengeStatus::Active,
            current_day: 0,
            started_at: Utc::now(),
        };
        self.challenge = Some(challenge.clone());
        (challenge, displaced)
    }

    /// Restore a previously persisted challenge (snapshot load).
    ///
    /// Persisted rows are normalized to the engine's invariants: the
    /// day counter is clamped to `[0, 21]`, and an active challenge
    /// whose counter sits at 21 is completed, since active-at-21 is
    /// not a reachable state.
    pub fn restore(&mut self, mut challenge: Challenge) {
        challenge.current_day = challenge.current_day.min(CHALLENGE_LENGTH_DAYS);
        if challenge.current_day >= CHALLENGE_LENGTH_DAYS
            && challenge.status == ChallengeStatus::Active
        {
            challenge.status = ChallengeStatus::Completed;
        }
        self.challenge = Some(challenge);
    }

    /// React to a ledger toggle on `habit_id`.
    ///
    /// No-op unless a challenge is active and bound to that habit.
    /// Completion advances the day counter, un-completion regresses it;
    /// both are clamped to `[0, 21]`. Reaching 21 completes the
    /// challenge.
    pub fn on_toggle(&mut self, habit_id: &str, completed: bool) -> Option<Progress> {
        let challenge = self.challenge.as_mut()?;
        if challenge.status != ChallengeStatus::Active || challenge.habit_id != habit_id {
            return None;
        }

        challenge.current_day = if completed {
            (challenge.current_day + 1).min(CHALLENGE_LENGTH_DAYS)
        } else {
            challenge.current_day.saturating_sub(1)
        };
        if challenge.current_day >= CHALLENGE_LENGTH_DAYS {
            challenge.status = ChallengeStatus::Completed;
        }

        Some(Progress {
            current_day: challenge.current_day,
            status: challenge.status,
        })
    }

    /// Drop the tracked challenge entirely (remote snapshot had none).
    pub fn clear(&mut self) {
        self.challenge = None;
    }

    /// Abandon the active challenge, discarding progress.
    pub fn quit(&mut self) -> Option<&Challenge> {
        let challenge = self.challenge.as_mut()?;
        if challenge.status != ChallengeStatus::Active {
            return None;
        }
        challenge.status = ChallengeStatus::Failed;
        Some(challenge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn start_begins_at_day_zero() {
        let mut engine = ChallengeEngine::new();
        let (c, displaced) = engine.start("h1", Some("My Journey"));
        assert_eq!(c.current_day, 0);
        assert_eq!(c.status, ChallengeStatus::Active);
        assert_eq!(c.name, "My Journey");
        assert!(displaced.is_none());
    }

    #[test]
    fn blank_name_gets_default_label() {
        let mut engine = ChallengeEngine::new();
        let (c, _) = engine.start("h1", Some("   "));
        assert_eq!(c.name, DEFAULT_CHALLENGE_NAME);
        let (c, _) = engine.start("h1", None);
        assert_eq!(c.name, DEFAULT_CHALLENGE_NAME);
    }

    #[test]
    fn twenty_one_completions_complete_the_challenge() {
        let mut engine = ChallengeEngine::new();
        engine.start("h1", None);

        for day in 1..=20 {
            let p = engine.on_toggle("h1", true).unwrap();
            assert_eq!(p.current_day, day);
            assert_eq!(p.status, ChallengeStatus::Active);
        }
        let p = engine.on_toggle("h1", true).unwrap();
        assert_eq!(p.current_day, 21);
        assert_eq!(p.status, ChallengeStatus::Completed);

        // A 22nd toggle is a no-op: the challenge is terminal.
        assert!(engine.on_toggle("h1", true).is_none());
        assert_eq!(engine.current().unwrap().current_day, 21);
    }

    #[test]
    fn uncompleting_regresses_and_floors_at_zero() {
        let mut engine = ChallengeEngine::new();
        engine.start("h1", None);

        // Net zero sequence.
        engine.on_toggle("h1", true).unwrap();
        let p = engine.on_toggle("h1", false).unwrap();
        assert_eq!(p.current_day, 0);

        // Never goes negative, even from day 0.
        let p = engine.on_toggle("h1", false).unwrap();
        assert_eq!(p.current_day, 0);
        assert_eq!(p.status, ChallengeStatus::Active);
    }

    #[test]
    fn toggles_on_other_habits_are_ignored() {
        let mut engine = ChallengeEngine::new();
        engine.start("h1", None);
        assert!(engine.on_toggle("h2", true).is_none());
        assert_eq!(engine.current().unwrap().current_day, 0);
    }

    #[test]
    fn starting_again_fails_the_active_challenge() {
        let mut engine = ChallengeEngine::new();
        let (first, _) = engine.start("h1", None);
        engine.on_toggle("h1", true).unwrap();

        let (second, displaced) = engine.start("h2", None);
        let displaced = displaced.unwrap();
        assert_eq!(displaced.id, first.id);
        assert_eq!(displaced.status, ChallengeStatus::Failed);

        let active = engine.active().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.habit_id, "h2");
        assert_eq!(active.current_day, 0);
    }

    #[test]
    fn quit_fails_unconditionally_and_is_terminal() {
        let mut engine = ChallengeEngine::new();
        engine.start("h1", None);
        engine.on_toggle("h1", true).unwrap();

        let c = engine.quit().unwrap();
        assert_eq!(c.status, ChallengeStatus::Failed);
        assert!(engine.active().is_none());
        assert!(engine.quit().is_none());
        assert!(engine.on_toggle("h1", true).is_none());
    }

    #[test]
    fn completions_need_not_be_consecutive() {
        // Deliberate product behavior: the counter tracks net
        // completions while active, with no calendar-continuity check.
        // Any 21 completion toggles finish the challenge, whatever
        // dates they land on.
        let mut engine = ChallengeEngine::new();
        engine.start("h1", None);
        for _ in 0..21 {
            engine.on_toggle("h1", true);
        }
        assert_eq!(engine.current().unwrap().status, ChallengeStatus::Completed);
    }

    #[test]
    fn restore_clamps_out_of_range_days() {
        let mut engine = ChallengeEngine::new();
        let (mut c, _) = ChallengeEngine::new().start("h1", None);
        c.current_day = 200;
        engine.restore(c);
        assert_eq!(engine.current().unwrap().current_day, CHALLENGE_LENGTH_DAYS);
    }

    #[test]
    fn restore_completes_an_active_challenge_at_day_21() {
        // A persisted row can carry active-at-21 (e.g. the terminal
        // status update never reached the server). Restoring it must
        // not resurrect an active challenge past the finish line.
        let mut engine = ChallengeEngine::new();
        let (mut c, _) = ChallengeEngine::new().start("h1", None);
        c.current_day = 21;
        engine.restore(c);

        let restored = engine.current().unwrap();
        assert_eq!(restored.status, ChallengeStatus::Completed);
        assert_eq!(restored.current_day, 21);
        assert!(engine.active().is_none());
        assert!(engine.on_toggle("h1", true).is_none());
    }

    proptest! {
        /// `current_day` never leaves [0, 21] under any toggle sequence.
        #[test]
        fn day_counter_stays_in_bounds(toggles in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut engine = ChallengeEngine::new();
            engine.start("h1", None);
            for completed in toggles {
                engine.on_toggle("h1", completed);
                let c = engine.current().unwrap();
                prop_assert!(c.current_day <= CHALLENGE_LENGTH_DAYS);
            }
        }

        /// Completed is reached iff the counter hits 21, and only ever
        /// via an advancing toggle.
        #[test]
        fn completed_iff_day_21(toggles in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut engine = ChallengeEngine::new();
            engine.start("h1", None);
            for completed in toggles {
                engine.on_toggle("h1", completed);
            }
            let c = engine.current().unwrap();
            prop_assert_eq!(
                c.status == ChallengeStatus::Completed,
                c.current_day == CHALLENGE_LENGTH_DAYS
            );
        }
    }
}

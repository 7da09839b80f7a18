//! Session-scoped habit service.
//!
//! `HabitService` owns the ledger, the challenge engine and the remote
//! store for one user session. It is constructed once per session and
//! passed by reference to callers; there is no ambient global state.
//!
//! Every mutation follows the same policy: the local optimistic change
//! is applied first, the remote write is issued afterward, and a
//! remote failure never rolls the local change back. Failures are not
//! swallowed either -- they come back inside the [`Outcome`] value and
//! as [`Event::SyncFailed`] entries, so callers and tests can observe
//! the divergence.
//!
//! All mutating methods take `&mut self`, so a service instance has a
//! single writer by construction; concurrent toggles against the same
//! habit cannot interleave.

use chrono::{NaiveDate, Utc};

use crate::challenge::{Challenge, ChallengeEngine, ChallengeStatus, Progress};
use crate::error::{CoreError, RemoteError, Result};
use crate::events::Event;
use crate::habit::{Habit, HabitDraft, HabitLedger};
use crate::remote::{ChallengeRow, HabitRow, LogRow, RemoteStore};

/// An authenticated user identity. The core treats it as an opaque
/// token gating whether remote sync occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Result of a mutation: the local value plus the remote write error,
/// if any. Local state always reflects `value`, synced or not.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub remote_error: Option<RemoteError>,
}

impl<T> Outcome<T> {
    fn local(value: T) -> Self {
        Self {
            value,
            remote_error: None,
        }
    }

    /// True when the remote write (if attempted) succeeded.
    pub fn synced(&self) -> bool {
        self.remote_error.is_none()
    }
}

/// What a toggle did, locally and to the bound challenge.
#[derive(Debug, Clone, Copy)]
pub struct ToggleResult {
    /// New completion state for the `(habit, date)` pair.
    pub completed: bool,
    /// Challenge movement caused by this toggle, if one was bound.
    pub challenge: Option<Progress>,
}

/// Counts from a full remote refresh.
#[derive(Debug, Clone, Copy)]
pub struct RefreshSummary {
    pub habit_count: usize,
    pub log_count: usize,
}

pub struct HabitService {
    ledger: HabitLedger,
    challenges: ChallengeEngine,
    remote: Box<dyn RemoteStore>,
    session: Option<Session>,
    /// Habit ids created while no session existed; migrated exactly
    /// once when a session is first established.
    guest_habits: Vec<String>,
    events: Vec<Event>,
}

impl HabitService {
    /// Guest-mode service: mutations stay local until sign-in.
    pub fn new(remote: Box<dyn RemoteStore>) -> Self {
        Self {
            ledger: HabitLedger::new(),
            challenges: ChallengeEngine::new(),
            remote,
            session: None,
            guest_habits: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_session(remote: Box<dyn RemoteStore>, user_id: &str) -> Self {
        let mut service = Self::new(remote);
        service.session = Some(Session {
            user_id: user_id.to_string(),
        });
        service
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_guest(&self) -> bool {
        self.session.is_none()
    }

    pub fn habits(&self) -> &[Habit] {
        self.ledger.habits()
    }

    pub fn get_habit(&self, habit_id: &str) -> Option<&Habit> {
        self.ledger.get(habit_id)
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        self.ledger.due_on(date)
    }

    pub fn completed_on(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.ledger.completed_on(habit_id, date)
    }

    pub fn ledger(&self) -> &HabitLedger {
        &self.ledger
    }

    pub fn active_challenge(&self) -> Option<&Challenge> {
        self.challenges.active()
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.challenges.current()
    }

    /// Drain accumulated events in order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Establish a session and migrate guest-created habits to the
    /// remote store. The migration is attempted exactly once: failed
    /// rows are reported, not retried.
    pub fn sign_in(&mut self, user_id: &str) -> Outcome<usize> {
        self.session = Some(Session {
            user_id: user_id.to_string(),
        });

        let pending = std::mem::take(&mut self.guest_habits);
        let rows: Vec<HabitRow> = pending
            .iter()
            .filter_map(|id| self.ledger.get(id))
            .map(|h| HabitRow::from_habit(h, user_id))
            .collect();

        let mut outcome = Outcome::local(0);
        for row in rows {
            match self.remote.create_habit(&row) {
                Ok(_) => outcome.value += 1,
                Err(e) => self.note_sync_failure("migrate_habit", e, &mut outcome),
            }
        }
        self.events.push(Event::GuestHabitsMigrated {
            migrated: outcome.value,
            at: Utc::now(),
        });
        outcome
    }

    pub fn sign_out(&mut self) {
        self.session = None;
    }

    // ── Habit mutations ──────────────────────────────────────────────

    /// Add a habit. The local insert is immediate; with a session the
    /// row is persisted and the local set is then refreshed from the
    /// remote source of truth, so the returned id may be
    /// server-assigned rather than the optimistic one.
    pub fn add_habit(&mut self, draft: HabitDraft) -> Result<Outcome<Habit>> {
        let habit = self.ledger.add(draft)?;
        let mut outcome = Outcome::local(habit.clone());

        match self.owner() {
            None => self.guest_habits.push(habit.id.clone()),
            Some(owner) => {
                let row = HabitRow::from_habit(&habit, &owner);
                match self.remote.create_habit(&row) {
                    Ok(created) => {
                        let final_id = created.id.clone();
                        if let Err(e) = self.refresh_ledger(&owner) {
                            self.note_sync_failure("refresh_after_add", e, &mut outcome);
                        }
                        if let Some(h) = self.ledger.get(&final_id) {
                            outcome.value = h.clone();
                        }
                    }
                    Err(e) => self.note_sync_failure("create_habit", e, &mut outcome),
                }
            }
        }

        self.events.push(Event::HabitAdded {
            habit_id: outcome.value.id.clone(),
            title: outcome.value.title.clone(),
            at: Utc::now(),
        });
        Ok(outcome)
    }

    /// Bulk-accept a habit plan (the "accept AI plan" action).
    pub fn accept_plan(&mut self, drafts: Vec<HabitDraft>) -> Result<Outcome<Vec<Habit>>> {
        let mut outcome = Outcome::local(Vec::with_capacity(drafts.len()));
        for draft in drafts {
            let added = self.add_habit(draft)?;
            if let Some(e) = added.remote_error {
                outcome.remote_error.get_or_insert(e);
            }
            outcome.value.push(added.value);
        }
        Ok(outcome)
    }

    /// Remove a habit from the active set.
    pub fn remove_habit(&mut self, habit_id: &str) -> Result<Outcome<Habit>> {
        let habit = self.ledger.remove(habit_id)?;
        self.guest_habits.retain(|id| id != habit_id);
        let mut outcome = Outcome::local(habit);

        if self.owner().is_some() {
            if let Err(e) = self.remote.delete_habit(habit_id) {
                self.note_sync_failure("delete_habit", e, &mut outcome);
            }
        }

        self.events.push(Event::HabitRemoved {
            habit_id: habit_id.to_string(),
            at: Utc::now(),
        });
        Ok(outcome)
    }

    /// Flip the completion state for `(habit_id, date)`.
    ///
    /// The local flip happens first, then the remote insert/delete,
    /// then the challenge engine sees the new state exactly once.
    pub fn toggle_habit(&mut self, habit_id: &str, date: NaiveDate) -> Result<Outcome<ToggleResult>> {
        let completed = self.ledger.toggle(habit_id, date)?;
        let mut outcome = Outcome::local(ToggleResult {
            completed,
            challenge: None,
        });

        self.events.push(Event::HabitToggled {
            habit_id: habit_id.to_string(),
            date,
            completed,
            at: Utc::now(),
        });

        if let Some(owner) = self.owner() {
            let result = if completed {
                self.remote.insert_log(&LogRow {
                    habit_id: habit_id.to_string(),
                    date,
                    owner,
                })
            } else {
                self.remote.delete_log(habit_id, date)
            };
            if let Err(e) = result {
                self.note_sync_failure("toggle_log", e, &mut outcome);
            }
        }

        outcome.value.challenge = self.forward_toggle(habit_id, completed, &mut outcome);
        Ok(outcome)
    }

    // ── Challenge mutations ──────────────────────────────────────────

    /// Start a 21-day challenge bound to an existing habit. A
    /// currently active challenge is failed first.
    pub fn start_challenge(
        &mut self,
        habit_id: &str,
        name: Option<&str>,
    ) -> Result<Outcome<Challenge>> {
        if !self.ledger.contains(habit_id) {
            return Err(CoreError::Validation(
                crate::error::ValidationError::UnknownHabit(habit_id.to_string()),
            ));
        }

        let (challenge, displaced) = self.challenges.start(habit_id, name);
        let mut outcome = Outcome::local(challenge.clone());

        if let Some(failed) = &displaced {
            self.events.push(Event::ChallengeEnded {
                challenge_id: failed.id.clone(),
                status: ChallengeStatus::Failed,
                at: Utc::now(),
            });
        }
        self.events.push(Event::ChallengeStarted {
            challenge_id: challenge.id.clone(),
            habit_id: habit_id.to_string(),
            at: Utc::now(),
        });

        if let Some(owner) = self.owner() {
            if let Some(failed) = &displaced {
                if let Err(e) =
                    self.remote
                        .update_challenge(&failed.id, failed.status.as_str(), failed.current_day)
                {
                    self.note_sync_failure("fail_challenge", e, &mut outcome);
                }
            }
            let row = ChallengeRow::from_challenge(&challenge, &owner);
            if let Err(e) = self.remote.create_challenge(&row) {
                self.note_sync_failure("create_challenge", e, &mut outcome);
            }
        }

        Ok(outcome)
    }

    /// Abandon the active challenge.
    pub fn quit_challenge(&mut self) -> Result<Outcome<Challenge>> {
        let challenge = self
            .challenges
            .quit()
            .cloned()
            .ok_or(CoreError::Validation(
                crate::error::ValidationError::NoActiveChallenge,
            ))?;
        let mut outcome = Outcome::local(challenge.clone());

        self.events.push(Event::ChallengeEnded {
            challenge_id: challenge.id.clone(),
            status: ChallengeStatus::Failed,
            at: Utc::now(),
        });
        if self.owner().is_some() {
            if let Err(e) = self.remote.update_challenge(
                &challenge.id,
                challenge.status.as_str(),
                challenge.current_day,
            ) {
                self.note_sync_failure("quit_challenge", e, &mut outcome);
            }
        }
        Ok(outcome)
    }

    // ── Sync ─────────────────────────────────────────────────────────

    /// Replace local state with the full remote snapshot.
    /// Last-writer-wins from the server's perspective; no merge.
    pub fn refresh(&mut self) -> Result<RefreshSummary> {
        let owner = self.owner().ok_or(RemoteError::NoSession)?;
        self.refresh_ledger(&owner).map_err(CoreError::Remote)?;

        match self.remote.active_challenge(&owner).map_err(CoreError::Remote)? {
            Some(row) => self.challenges.restore(row.into_challenge()),
            // Local active challenge not present remotely: the server
            // snapshot wins.
            None => {
                if self.challenges.active().is_some() {
                    self.challenges.clear();
                }
            }
        }

        let summary = RefreshSummary {
            habit_count: self.ledger.habits().len(),
            log_count: self.ledger.completion_count(),
        };
        self.events.push(Event::Refreshed {
            habit_count: summary.habit_count,
            log_count: summary.log_count,
            at: Utc::now(),
        });
        Ok(summary)
    }

    // ── Snapshot restore (local cache) ───────────────────────────────

    /// Load ledger state from a local snapshot, bypassing remote sync.
    pub fn restore_ledger(&mut self, habits: Vec<Habit>, log: Vec<(String, NaiveDate)>) {
        self.ledger.replace_all(habits, log);
    }

    pub fn restore_challenge(&mut self, challenge: Challenge) {
        self.challenges.restore(challenge);
    }

    /// Re-mark habits as guest-created (snapshot restore before
    /// sign-in), so a later sign-in still migrates them.
    pub fn restore_guest_habits(&mut self, ids: Vec<String>) {
        self.guest_habits = ids;
    }

    pub fn guest_habits(&self) -> &[String] {
        &self.guest_habits
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn owner(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.user_id.clone())
    }

    /// Forward a toggle to the challenge engine exactly once, after
    /// the ledger mutation, and persist any resulting movement.
    fn forward_toggle(
        &mut self,
        habit_id: &str,
        completed: bool,
        outcome: &mut Outcome<ToggleResult>,
    ) -> Option<Progress> {
        let progress = self.challenges.on_toggle(habit_id, completed)?;
        let challenge_id = self
            .challenges
            .current()
            .map(|c| c.id.clone())
            .unwrap_or_default();

        self.events.push(Event::ChallengeProgressed {
            challenge_id: challenge_id.clone(),
            current_day: progress.current_day,
            at: Utc::now(),
        });
        if progress.status.is_terminal() {
            self.events.push(Event::ChallengeEnded {
                challenge_id: challenge_id.clone(),
                status: progress.status,
                at: Utc::now(),
            });
        }

        if self.owner().is_some() {
            if let Err(e) = self.remote.update_challenge(
                &challenge_id,
                progress.status.as_str(),
                progress.current_day,
            ) {
                self.note_sync_failure("update_challenge", e, outcome);
            }
        }
        Some(progress)
    }

    fn refresh_ledger(&mut self, owner: &str) -> std::result::Result<(), RemoteError> {
        let habits = self.remote.list_habits(owner)?;
        let logs = self.remote.list_logs(owner)?;
        self.ledger.replace_all(
            habits.into_iter().map(HabitRow::into_habit).collect(),
            logs.into_iter().map(|l| (l.habit_id, l.date)).collect(),
        );
        Ok(())
    }

    fn note_sync_failure<T>(&mut self, operation: &str, err: RemoteError, outcome: &mut Outcome<T>) {
        self.events.push(Event::SyncFailed {
            operation: operation.to_string(),
            message: err.to_string(),
            at: Utc::now(),
        });
        outcome.remote_error.get_or_insert(err);
    }
}

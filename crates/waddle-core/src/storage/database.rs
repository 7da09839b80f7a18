//! SQLite-backed local cache.
//!
//! Persists the habit set, completion log and tracked challenge across
//! process runs, plus a small key-value table for session state. The
//! cache is a snapshot of the service's in-memory state, not a second
//! source of truth: it is rewritten wholesale on save and replaced
//! wholesale on remote refresh.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::challenge::{Challenge, ChallengeStatus};
use crate::error::{DatabaseError, Result};
use crate::habit::{Frequency, Habit, TimeOfDay};

/// Key under which the signed-in user id is stored.
pub const KV_SESSION_USER: &str = "session_user";
/// Key under which guest-created habit ids await migration.
pub const KV_GUEST_HABITS: &str = "guest_habits";

/// SQLite cache of ledger and challenge state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/waddle/waddle.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("waddle.db");
        let conn = Connection::open(&path).map_err(|e| DatabaseError::OpenFailed {
            path,
            source: e,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS habits (
                    id          TEXT PRIMARY KEY,
                    title       TEXT NOT NULL,
                    icon        TEXT NOT NULL DEFAULT '',
                    time_of_day TEXT NOT NULL DEFAULT 'anytime',
                    frequency   TEXT NOT NULL DEFAULT '[]',
                    streak      INTEGER NOT NULL DEFAULT 0,
                    created_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habit_log (
                    habit_id TEXT NOT NULL,
                    date     TEXT NOT NULL,
                    PRIMARY KEY (habit_id, date)
                );

                CREATE TABLE IF NOT EXISTS challenges (
                    id          TEXT PRIMARY KEY,
                    habit_id    TEXT NOT NULL,
                    name        TEXT NOT NULL,
                    status      TEXT NOT NULL,
                    current_day INTEGER NOT NULL,
                    started_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_habit_log_habit ON habit_log(habit_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Rewrite the whole snapshot in one transaction.
    pub fn save_snapshot(
        &mut self,
        habits: &[Habit],
        log: &[(String, NaiveDate)],
        challenge: Option<&Challenge>,
    ) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;

        tx.execute("DELETE FROM habits", [])
            .map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM habit_log", [])
            .map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM challenges", [])
            .map_err(DatabaseError::from)?;

        for habit in habits {
            let frequency = serde_json::to_string(&habit.frequency)?;
            tx.execute(
                "INSERT INTO habits (id, title, icon, time_of_day, frequency, streak, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    habit.id,
                    habit.title,
                    habit.icon,
                    habit.time_of_day.as_str(),
                    frequency,
                    habit.streak,
                    habit.created_at.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        }

        for (habit_id, date) in log {
            tx.execute(
                "INSERT OR IGNORE INTO habit_log (habit_id, date) VALUES (?1, ?2)",
                params![habit_id, date.to_string()],
            )
            .map_err(DatabaseError::from)?;
        }

        if let Some(challenge) = challenge {
            tx.execute(
                "INSERT INTO challenges (id, habit_id, name, status, current_day, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    challenge.id,
                    challenge.habit_id,
                    challenge.name,
                    challenge.status.as_str(),
                    challenge.current_day,
                    challenge.started_at.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        }

        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    pub fn load_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, icon, time_of_day, frequency, streak, created_at FROM habits")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, title, icon, time_of_day, frequency, streak, created_at) =
                row.map_err(DatabaseError::from)?;
            habits.push(Habit {
                id,
                title,
                icon,
                time_of_day: TimeOfDay::parse(&time_of_day),
                frequency: serde_json::from_str::<Frequency>(&frequency).unwrap_or_default(),
                streak,
                created_at: created_at
                    .parse()
                    .unwrap_or_else(|_| chrono::Utc::now()),
            });
        }
        Ok(habits)
    }

    pub fn load_log(&self) -> Result<Vec<(String, NaiveDate)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT habit_id, date FROM habit_log")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(DatabaseError::from)?;

        let mut log = Vec::new();
        for row in rows {
            let (habit_id, date) = row.map_err(DatabaseError::from)?;
            if let Ok(date) = date.parse() {
                log.push((habit_id, date));
            }
        }
        Ok(log)
    }

    /// The single cached challenge, if one was saved.
    pub fn load_challenge(&self) -> Result<Option<Challenge>> {
        self.conn
            .query_row(
                "SELECT id, habit_id, name, status, current_day, started_at
                 FROM challenges LIMIT 1",
                [],
                |row| {
                    Ok(Challenge {
                        id: row.get(0)?,
                        habit_id: row.get(1)?,
                        name: row.get(2)?,
                        status: ChallengeStatus::parse(&row.get::<_, String>(3)?)
                            .unwrap_or(ChallengeStatus::Failed),
                        current_day: row.get(4)?,
                        started_at: row
                            .get::<_, String>(5)?
                            .parse()
                            .unwrap_or_else(|_| chrono::Utc::now()),
                    })
                },
            )
            .optional()
            .map_err(DatabaseError::from)
            .map_err(Into::into)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(DatabaseError::from)
            .map_err(Into::into)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;
    use crate::habit::HabitLedger;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn snapshot_round_trip() {
        let mut db = Database::open_memory().unwrap();

        let mut ledger = HabitLedger::new();
        let habit = ledger
            .add(HabitDraft::new("Read").with_frequency(Frequency::new([1, 3])))
            .unwrap();
        ledger.toggle(&habit.id, date("2024-01-01")).unwrap();

        let log: Vec<_> = ledger.completions().cloned().collect();
        db.save_snapshot(ledger.habits(), &log, None).unwrap();

        let habits = db.load_habits().unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].title, "Read");
        assert_eq!(habits[0].frequency, Frequency::new([1, 3]));

        let log = db.load_log().unwrap();
        assert_eq!(log, vec![(habit.id.clone(), date("2024-01-01"))]);
    }

    #[test]
    fn snapshot_overwrites_previous_state() {
        let mut db = Database::open_memory().unwrap();
        let mut ledger = HabitLedger::new();
        ledger.add(HabitDraft::new("Old")).unwrap();
        db.save_snapshot(ledger.habits(), &[], None).unwrap();

        let mut newer = HabitLedger::new();
        newer.add(HabitDraft::new("New")).unwrap();
        db.save_snapshot(newer.habits(), &[], None).unwrap();

        let habits = db.load_habits().unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].title, "New");
    }

    #[test]
    fn challenge_round_trip() {
        let mut db = Database::open_memory().unwrap();
        let mut engine = crate::challenge::ChallengeEngine::new();
        let (mut challenge, _) = engine.start("h1", Some("Journey"));
        challenge.current_day = 5;

        db.save_snapshot(&[], &[], Some(&challenge)).unwrap();
        let loaded = db.load_challenge().unwrap().unwrap();
        assert_eq!(loaded.id, challenge.id);
        assert_eq!(loaded.current_day, 5);
        assert_eq!(loaded.status, ChallengeStatus::Active);
    }

    #[test]
    fn empty_database_loads_empty() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_habits().unwrap().is_empty());
        assert!(db.load_log().unwrap().is_empty());
        assert!(db.load_challenge().unwrap().is_none());
    }

    #[test]
    fn kv_round_trip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get(KV_SESSION_USER).unwrap().is_none());
        db.kv_set(KV_SESSION_USER, "u1").unwrap();
        assert_eq!(db.kv_get(KV_SESSION_USER).unwrap().as_deref(), Some("u1"));
        db.kv_set(KV_SESSION_USER, "u2").unwrap();
        assert_eq!(db.kv_get(KV_SESSION_USER).unwrap().as_deref(), Some("u2"));
        db.kv_delete(KV_SESSION_USER).unwrap();
        assert!(db.kv_get(KV_SESSION_USER).unwrap().is_none());
    }
}

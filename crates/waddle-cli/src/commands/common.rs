//! Shared plumbing for CLI commands.
//!
//! Each invocation reconstructs a `HabitService` from the SQLite
//! snapshot and flushes it back after mutations. The remote store is
//! the configured REST endpoint when one exists, otherwise an
//! in-process store (guest/offline mode).

use chrono::NaiveDate;

use waddle_core::storage::database::{KV_GUEST_HABITS, KV_SESSION_USER};
use waddle_core::{Config, Database, Event, HabitService, MemoryStore, RemoteStore, RestStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Build the session service from local state and configuration.
pub fn open_service(db: &Database) -> Result<HabitService, Box<dyn std::error::Error>> {
    build_service(db, &Config::load()?)
}

/// A stored session id only takes effect when a remote endpoint is
/// configured. With a session but no remote (e.g. `config
/// clear-remote` after signing in), the service must run as guest:
/// attaching the session would make mutations reconcile the ledger
/// against an empty in-process store and wipe the local snapshot.
fn build_service(
    db: &Database,
    config: &Config,
) -> Result<HabitService, Box<dyn std::error::Error>> {
    let remote: Box<dyn RemoteStore> = match &config.remote {
        Some(remote) => Box::new(RestStore::new(&remote.base_url, &remote.api_key)?),
        None => Box::new(MemoryStore::new()),
    };

    let session = match config.remote {
        Some(_) => db.kv_get(KV_SESSION_USER)?,
        None => None,
    };
    let mut service = match session {
        Some(user_id) => HabitService::with_session(remote, &user_id),
        None => HabitService::new(remote),
    };

    service.restore_ledger(db.load_habits()?, db.load_log()?);
    if let Some(challenge) = db.load_challenge()? {
        service.restore_challenge(challenge);
    }
    if let Some(raw) = db.kv_get(KV_GUEST_HABITS)? {
        service.restore_guest_habits(serde_json::from_str(&raw)?);
    }
    Ok(service)
}

/// Write the service state back to the snapshot and surface any sync
/// failures as warnings. Local state is already committed either way.
pub fn flush(db: &mut Database, service: &mut HabitService) -> CliResult {
    let log: Vec<_> = service.ledger().completions().cloned().collect();
    db.save_snapshot(service.habits(), &log, service.current_challenge())?;
    db.kv_set(
        KV_GUEST_HABITS,
        &serde_json::to_string(service.guest_habits())?,
    )?;

    for event in service.drain_events() {
        if let Event::SyncFailed {
            operation, message, ..
        } = event
        {
            eprintln!("warning: remote sync failed ({operation}): {message}");
        }
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
pub fn parse_date(arg: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match arg {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

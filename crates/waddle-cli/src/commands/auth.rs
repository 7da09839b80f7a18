//! Session management commands.
//!
//! Signing in establishes the session id that gates remote sync and
//! migrates any guest-created habits to the remote store.

use clap::Subcommand;
use waddle_core::storage::database::KV_SESSION_USER;
use waddle_core::{Config, Database};

use super::common::{self, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Establish a session and migrate guest habits
    SignIn {
        /// Opaque user id from the auth provider
        user_id: String,
    },
    /// Drop the session (local state is kept)
    SignOut,
    /// Show session state
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    let mut db = Database::open()?;

    match action {
        AuthAction::SignIn { user_id } => {
            // A session without a remote has nothing to sync against.
            if Config::load()?.remote.is_none() {
                return Err(
                    "no remote endpoint configured; run `config set-remote <url> <key>` first"
                        .into(),
                );
            }
            let mut service = common::open_service(&db)?;
            service.sign_out();
            db.kv_set(KV_SESSION_USER, &user_id)?;

            let outcome = service.sign_in(&user_id);
            println!("Signed in as {user_id}");
            if outcome.value > 0 {
                println!("Migrated {} guest habits to remote storage", outcome.value);
            }
            common::flush(&mut db, &mut service)?;
        }
        AuthAction::SignOut => {
            db.kv_delete(KV_SESSION_USER)?;
            println!("Signed out");
        }
        AuthAction::Status => match db.kv_get(KV_SESSION_USER)? {
            Some(user_id) => println!("Signed in as {user_id}"),
            None => println!("Guest mode (local only)"),
        },
    }
    Ok(())
}

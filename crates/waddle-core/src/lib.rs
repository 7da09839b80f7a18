//! # Waddle Core Library
//!
//! This library provides the core business logic for the Waddle habit
//! tracker. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary, with any GUI shell being
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Habit Ledger**: the authoritative habit set and completion log,
//!   with pure due/completed derivations per calendar date
//! - **Challenge Engine**: a 21-day challenge state machine advanced
//!   strictly by ledger toggles on its bound habit
//! - **Habit Service**: a session-scoped facade applying optimistic
//!   local mutations and persisting them to a remote table store
//! - **Storage**: SQLite snapshot cache and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`HabitLedger`]: habit set + completion log
//! - [`ChallengeEngine`]: challenge state machine
//! - [`HabitService`]: per-session service object
//! - [`RemoteStore`]: trait boundary to the hosted table API
//! - [`Database`]: local snapshot persistence

pub mod challenge;
pub mod error;
pub mod events;
pub mod habit;
pub mod remote;
pub mod service;
pub mod stats;
pub mod storage;
pub mod suggestions;

pub use challenge::{Challenge, ChallengeEngine, ChallengeStatus, CHALLENGE_LENGTH_DAYS};
pub use error::{ConfigError, CoreError, DatabaseError, RemoteError, ValidationError};
pub use events::Event;
pub use habit::{Frequency, Habit, HabitDraft, HabitLedger, TimeOfDay};
pub use remote::{MemoryStore, RemoteStore, RestStore};
pub use service::{HabitService, Outcome, Session, ToggleResult};
pub use storage::{Config, Database};

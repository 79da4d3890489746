//! Core scoring for click-speed trials.
//!
//! This crate judges submitted trials for client tampering and physically
//! implausible speeds, stores every trial (flagged ones included), keeps a
//! per-user summary derived from valid trials, and ranks users per trial
//! duration:
//!
//! - [`anticheat`]: pure validator producing a [`Verdict`]
//! - [`stats`]: best/average/count fold over valid trials
//! - [`leaderboard`]: ranking policy and query bounds
//! - [`storage`]: SQLite repository behind the [`ArenaStore`] trait
//! - [`service`]: the submit → persist → re-aggregate flow
//!
//! # Quick Start
//!
//! ```no_run
//! use clicktest_core::{AntiCheatPolicy, Arena, ArenaStore, SqliteStore, TrialSubmission};
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = SqliteStore::open(std::path::Path::new("clicktest.db"))?;
//! let user = store.create_user("alice")?;
//! let arena = Arena::new(store, AntiCheatPolicy::default());
//!
//! let payload = TrialSubmission::from_json(
//!     r#"{"duration_ms":10000,"total_clicks":150,"cps":15.0,
//!         "started_at":"2026-03-01T12:00:00Z","ended_at":"2026-03-01T12:00:10Z"}"#,
//! )?;
//! let receipt = arena.submit_payload(user.id, payload)?;
//! assert!(receipt.is_valid);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |----------------------|-------------|
//! | `CLICKTEST_DB` | SQLite database path |
//! | `CLICKTEST_TAMPER_TOLERANCE` | Allowed reported/recomputed CPS gap (default `0.50`) |
//! | `CLICKTEST_MAX_CPS` | Highest plausible reported CPS (default `20.00`) |

pub mod anticheat;
pub mod config;
pub mod cps;
pub mod errors;
pub mod leaderboard;
pub mod model;
pub mod service;
pub mod stats;
pub mod storage;
pub mod submission;

pub use anticheat::{validate, AntiCheatPolicy, FlagReason, Verdict};
pub use config::{ArenaConfig, ConfigError};
pub use cps::Cps;
pub use errors::{ArenaError, StoreError};
pub use leaderboard::{LeaderboardEntry, LeaderboardQuery};
pub use model::{FlaggedTrial, HistoryEntry, NewTrial, SubmitReceipt, Trial, User, UserId};
pub use service::Arena;
pub use stats::UserStats;
pub use storage::{ArenaStore, SqliteStore};
pub use submission::{SchemaError, TrialSubmission};

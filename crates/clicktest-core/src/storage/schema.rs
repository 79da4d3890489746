//! SQLite schema for click-trial storage.
//!
//! Tables:
//! - `users`: Account rows referenced by trials and the leaderboard ban filter
//! - `trials`: Append-only trial log; `is_valid` fixed at insert
//! - `flagged_trials`: One row per invalid trial with its reason codes
//! - `user_stats`: Current summary per user, overwritten on recompute
//!
//! CPS columns hold integer hundredths.

/// DDL for trial storage.
///
/// Schema version: 1
pub const ARENA_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    username         TEXT NOT NULL UNIQUE,
    is_banned        INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL
);

-- Trials (append-only, immutable)
CREATE TABLE IF NOT EXISTS trials (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL REFERENCES users(id),
    duration_ms      INTEGER NOT NULL,
    total_clicks     INTEGER NOT NULL,
    cps_hundredths   INTEGER NOT NULL,
    started_at       TEXT NOT NULL,
    ended_at         TEXT NOT NULL,
    is_valid         INTEGER NOT NULL,
    device_type      TEXT,
    browser          TEXT,
    user_agent       TEXT
);

CREATE TABLE IF NOT EXISTS flagged_trials (
    trial_id         INTEGER PRIMARY KEY REFERENCES trials(id),
    reasons          TEXT NOT NULL,
    flagged_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_stats (
    user_id          INTEGER PRIMARY KEY REFERENCES users(id),
    best_cps         INTEGER NOT NULL,
    avg_cps          INTEGER NOT NULL,
    total_tests      INTEGER NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_trials_user_valid
    ON trials(user_id, is_valid);
CREATE INDEX IF NOT EXISTS idx_trials_ranking
    ON trials(duration_ms, is_valid, user_id);
CREATE INDEX IF NOT EXISTS idx_trials_user_started
    ON trials(user_id, started_at);
"#;

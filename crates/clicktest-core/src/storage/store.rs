//! SqliteStore: SQLite-backed trial, flag and summary persistence.
//!
//! - Trials are append-only; a trial and its flag row commit together
//! - Summaries are rebuilt from the full valid-trial set, never patched
//! - Leaderboards are a fresh query on every call

use super::store_internal::{conn, ranking, stats, trials, txn, users};
use super::ArenaStore;
use crate::anticheat::Verdict;
use crate::errors::StoreError;
use crate::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::model::{FlaggedTrial, HistoryEntry, NewTrial, Trial, TrialId, User, UserId};
use crate::stats::UserStats;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-backed arena store.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a file-backed store, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Create store from existing connection (for multi-connection tests).
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn::init_connection_impl(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ArenaStore for SqliteStore {
    fn create_user(&self, username: &str) -> Result<User, StoreError> {
        let conn = self.lock()?;
        users::create_user_impl(&conn, username)
    }

    fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        users::find_user_impl(&conn, user_id)
    }

    fn find_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        users::find_user_by_name_impl(&conn, username)
    }

    fn set_banned(&self, user_id: UserId, banned: bool) -> Result<(), StoreError> {
        let conn = self.lock()?;
        users::set_banned_impl(&conn, user_id, banned)
    }

    fn user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let conn = self.lock()?;
        users::user_ids_impl(&conn)
    }

    fn insert_trial(
        &self,
        user_id: UserId,
        trial: &NewTrial,
        verdict: &Verdict,
    ) -> Result<Trial, StoreError> {
        let conn = self.lock()?;
        txn::with_immediate_txn(&conn, |c| {
            trials::insert_trial_inner_impl(c, user_id, trial, verdict)
        })
    }

    fn get_trial(&self, trial_id: TrialId) -> Result<Option<Trial>, StoreError> {
        let conn = self.lock()?;
        trials::get_trial_impl(&conn, trial_id)
    }

    fn get_flag(&self, trial_id: TrialId) -> Result<Option<FlaggedTrial>, StoreError> {
        let conn = self.lock()?;
        trials::get_flag_impl(&conn, trial_id)
    }

    fn history(&self, user_id: UserId, limit: u32) -> Result<Vec<HistoryEntry>, StoreError> {
        let conn = self.lock()?;
        trials::history_impl(&conn, user_id, limit)
    }

    fn recompute_user_stats(&self, user_id: UserId) -> Result<UserStats, StoreError> {
        let conn = self.lock()?;
        txn::with_immediate_txn(&conn, |c| stats::recompute_inner_impl(c, user_id))
    }

    fn get_user_stats(&self, user_id: UserId) -> Result<UserStats, StoreError> {
        let conn = self.lock()?;
        stats::get_user_stats_impl(&conn, user_id)
    }

    fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let conn = self.lock()?;
        ranking::leaderboard_impl(&conn, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anticheat::{validate, AntiCheatPolicy, FlagReason};
    use crate::cps::Cps;
    use chrono::{TimeZone, Utc};

    fn new_trial(duration_ms: u64, total_clicks: u64, cps: Cps, minute: u32) -> NewTrial {
        NewTrial {
            duration_ms,
            total_clicks,
            reported_cps: cps,
            started_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 10).unwrap(),
            device_type: Some("desktop".to_string()),
            browser: None,
            user_agent: None,
        }
    }

    fn store_trial(store: &SqliteStore, user_id: UserId, t: &NewTrial) -> Trial {
        let verdict = validate(
            &AntiCheatPolicy::default(),
            t.duration_ms,
            t.total_clicks,
            t.reported_cps,
        );
        store.insert_trial(user_id, t, &verdict).unwrap()
    }

    #[test]
    fn test_store_bootstraps_schema() {
        let store = SqliteStore::memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        for expected in ["flagged_trials", "trials", "user_stats", "users"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_store_sets_foreign_keys() {
        let store = SqliteStore::memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_create_user_rejects_duplicate_username() {
        let store = SqliteStore::memory().unwrap();
        store.create_user("alice").unwrap();
        let err = store.create_user("alice").unwrap_err();
        assert_eq!(
            err,
            StoreError::UsernameTaken {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_find_user_by_id_and_name() {
        let store = SqliteStore::memory().unwrap();
        let alice = store.create_user("alice").unwrap();
        assert_eq!(store.find_user(alice.id).unwrap(), Some(alice.clone()));
        assert_eq!(store.find_user_by_name("alice").unwrap(), Some(alice));
        assert_eq!(store.find_user(999).unwrap(), None);
    }

    #[test]
    fn test_set_banned_unknown_user() {
        let store = SqliteStore::memory().unwrap();
        assert_eq!(
            store.set_banned(42, true),
            Err(StoreError::UserNotFound { user_id: 42 })
        );
    }

    #[test]
    fn test_insert_valid_trial_has_no_flag() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        let trial = store_trial(&store, user.id, &new_trial(10_000, 150, Cps::from_parts(15, 0), 0));

        assert!(trial.is_valid);
        assert_eq!(trial.cps, Cps::from_parts(15, 0));
        assert_eq!(store.get_flag(trial.id).unwrap(), None);
        assert_eq!(store.get_trial(trial.id).unwrap(), Some(trial));
    }

    #[test]
    fn test_insert_invalid_trial_writes_flag_with_both_reasons() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("bot").unwrap();
        // calculated 30.00 vs reported 25.00, and 25.00 is over the ceiling
        let trial = store_trial(&store, user.id, &new_trial(10_000, 300, Cps::from_parts(25, 0), 0));

        assert!(!trial.is_valid);
        let flag = store.get_flag(trial.id).unwrap().unwrap();
        assert_eq!(
            flag.reasons,
            vec![FlagReason::ClientTampering, FlagReason::ImpossibleCps]
        );
    }

    #[test]
    fn test_insert_trial_unknown_user_writes_nothing() {
        let store = SqliteStore::memory().unwrap();
        let t = new_trial(10_000, 150, Cps::from_parts(15, 0), 0);
        let verdict = validate(&AntiCheatPolicy::default(), 10_000, 150, t.reported_cps);
        assert_eq!(
            store.insert_trial(7, &t, &verdict),
            Err(StoreError::UserNotFound { user_id: 7 })
        );

        let conn = store.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM trials", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_recompute_excludes_invalid_trials() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store_trial(&store, user.id, &new_trial(10_000, 150, Cps::from_parts(15, 0), 0));
        store_trial(&store, user.id, &new_trial(10_000, 120, Cps::from_parts(12, 0), 1));
        store_trial(&store, user.id, &new_trial(10_000, 250, Cps::from_parts(25, 0), 2));

        let stats = store.recompute_user_stats(user.id).unwrap();
        assert_eq!(stats.best_cps, Cps::from_parts(15, 0));
        assert_eq!(stats.avg_cps, Cps::from_parts(13, 50));
        assert_eq!(stats.total_tests, 2);
        assert!(stats.updated_at.is_some());
        assert_eq!(store.get_user_stats(user.id).unwrap(), stats);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store_trial(&store, user.id, &new_trial(10_000, 100, Cps::from_parts(10, 0), 0));

        let a = store.recompute_user_stats(user.id).unwrap();
        let b = store.recompute_user_stats(user.id).unwrap();
        assert_eq!(
            (a.best_cps, a.avg_cps, a.total_tests),
            (b.best_cps, b.avg_cps, b.total_tests)
        );
    }

    #[test]
    fn test_recompute_without_valid_trials_leaves_no_row() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store_trial(&store, user.id, &new_trial(10_000, 250, Cps::from_parts(25, 0), 0));

        let stats = store.recompute_user_stats(user.id).unwrap();
        assert_eq!(stats, UserStats::empty(user.id));
        assert_eq!(store.get_user_stats(user.id).unwrap(), UserStats::empty(user.id));
    }

    #[test]
    fn test_recompute_zeroes_row_after_trials_revoked() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store_trial(&store, user.id, &new_trial(10_000, 150, Cps::from_parts(15, 0), 0));
        store.recompute_user_stats(user.id).unwrap();

        store
            .conn
            .lock()
            .unwrap()
            .execute("UPDATE trials SET is_valid = 0 WHERE user_id = ?1", [user.id])
            .unwrap();

        let stats = store.recompute_user_stats(user.id).unwrap();
        assert_eq!(stats.best_cps, Cps::ZERO);
        assert_eq!(stats.avg_cps, Cps::ZERO);
        assert_eq!(stats.total_tests, 0);
        assert!(stats.updated_at.is_some());
        assert_eq!(store.get_user_stats(user.id).unwrap(), stats);
        assert!(store.leaderboard(&LeaderboardQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_failed_recompute_rolls_back_and_keeps_summary() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        store_trial(&store, user.id, &new_trial(10_000, 100, Cps::from_parts(10, 0), 0));
        let before = store.recompute_user_stats(user.id).unwrap();

        store_trial(&store, user.id, &new_trial(10_000, 150, Cps::from_parts(15, 0), 1));
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER block_stats BEFORE UPDATE ON user_stats
                 BEGIN SELECT RAISE(ABORT, 'stats write blocked'); END;",
            )
            .unwrap();

        let err = store.recompute_user_stats(user.id).unwrap_err();
        assert!(
            matches!(&err, StoreError::Database(msg) if msg.contains("stats write blocked")),
            "{err:?}"
        );
        assert_eq!(store.get_user_stats(user.id).unwrap(), before);
        assert!(store.conn.lock().unwrap().is_autocommit());

        // The connection is usable again once the blocker is gone.
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch("DROP TRIGGER block_stats;")
            .unwrap();
        let after = store.recompute_user_stats(user.id).unwrap();
        assert_eq!(after.best_cps, Cps::from_parts(15, 0));
        assert_eq!(after.total_tests, 2);
    }

    #[test]
    fn test_recompute_unknown_user() {
        let store = SqliteStore::memory().unwrap();
        assert_eq!(
            store.recompute_user_stats(3),
            Err(StoreError::UserNotFound { user_id: 3 })
        );
    }

    #[test]
    fn test_history_orders_newest_first_and_limits() {
        let store = SqliteStore::memory().unwrap();
        let user = store.create_user("alice").unwrap();
        for minute in 0..5 {
            store_trial(&store, user.id, &new_trial(10_000, 100, Cps::from_parts(10, 0), minute));
        }
        let rows = store.history(user.id, 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].started_at > rows[1].started_at);
        assert!(rows[1].started_at > rows[2].started_at);
    }

    #[test]
    fn test_leaderboard_filters_banned_and_duration() {
        let store = SqliteStore::memory().unwrap();
        let alice = store.create_user("alice").unwrap();
        let bob = store.create_user("bob").unwrap();
        let carol = store.create_user("carol").unwrap();
        store_trial(&store, alice.id, &new_trial(10_000, 140, Cps::from_parts(14, 0), 0));
        store_trial(&store, bob.id, &new_trial(10_000, 160, Cps::from_parts(16, 0), 0));
        store_trial(&store, carol.id, &new_trial(5_000, 90, Cps::from_parts(18, 0), 0));
        store.set_banned(bob.id, true).unwrap();

        let board = store.leaderboard(&LeaderboardQuery::default()).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].rank, 1);

        let short = store
            .leaderboard(&LeaderboardQuery::new(Some(5_000), None))
            .unwrap();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].user_id, carol.id);
    }

    #[test]
    fn test_repair_all_stats_visits_every_user() {
        let store = SqliteStore::memory().unwrap();
        let alice = store.create_user("alice").unwrap();
        store.create_user("bob").unwrap();
        store_trial(&store, alice.id, &new_trial(10_000, 100, Cps::from_parts(10, 0), 0));

        assert_eq!(store.repair_all_stats().unwrap(), 2);
        assert_eq!(store.get_user_stats(alice.id).unwrap().total_tests, 1);
    }
}

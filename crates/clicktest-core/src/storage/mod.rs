pub mod schema;
pub mod store;
mod store_internal;

pub use schema::ARENA_SCHEMA;
pub use store::SqliteStore;

use crate::anticheat::Verdict;
use crate::errors::StoreError;
use crate::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::model::{FlaggedTrial, HistoryEntry, NewTrial, Trial, TrialId, User, UserId};
use crate::stats::UserStats;

/// What the submission flow needs from persistence.
///
/// Trials are append-only. `insert_trial` writes the trial and its flag
/// record together; `recompute_user_stats` rescans and overwrites the
/// summary as one unit, leaving the old summary in place on failure.
pub trait ArenaStore {
    fn create_user(&self, username: &str) -> Result<User, StoreError>;
    fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;
    fn find_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn set_banned(&self, user_id: UserId, banned: bool) -> Result<(), StoreError>;
    fn user_ids(&self) -> Result<Vec<UserId>, StoreError>;

    fn insert_trial(
        &self,
        user_id: UserId,
        trial: &NewTrial,
        verdict: &Verdict,
    ) -> Result<Trial, StoreError>;
    fn get_trial(&self, trial_id: TrialId) -> Result<Option<Trial>, StoreError>;
    fn get_flag(&self, trial_id: TrialId) -> Result<Option<FlaggedTrial>, StoreError>;
    fn history(&self, user_id: UserId, limit: u32) -> Result<Vec<HistoryEntry>, StoreError>;

    fn recompute_user_stats(&self, user_id: UserId) -> Result<UserStats, StoreError>;
    fn get_user_stats(&self, user_id: UserId) -> Result<UserStats, StoreError>;

    fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Recompute every user's summary. Returns how many users were visited.
    fn repair_all_stats(&self) -> Result<usize, StoreError> {
        let ids = self.user_ids()?;
        for user_id in &ids {
            self.recompute_user_stats(*user_id)?;
        }
        tracing::info!(users = ids.len(), "stats repair complete");
        Ok(ids.len())
    }
}

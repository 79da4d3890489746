//! Leaderboard ranking policy.
//!
//! Only valid trials of the requested duration from non-banned users count.
//! Each user appears once with their best CPS. Ordering is `best_cps` desc,
//! then `user_id` asc; rank is the 1-based output position (no shared ranks).

use crate::cps::Cps;
use crate::model::UserId;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_LEADERBOARD_DURATION_MS: u64 = 10_000;
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 100;
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub duration_ms: u64,
    pub limit: u32,
}

impl LeaderboardQuery {
    /// Absent or zero values fall back to defaults; `limit` is capped.
    pub fn new(duration_ms: Option<u64>, limit: Option<u32>) -> Self {
        let duration_ms = match duration_ms {
            None | Some(0) => DEFAULT_LEADERBOARD_DURATION_MS,
            Some(d) => d,
        };
        let limit = match limit {
            None | Some(0) => DEFAULT_LEADERBOARD_LIMIT,
            Some(n) => n.min(MAX_LEADERBOARD_LIMIT),
        };
        Self { duration_ms, limit }
    }
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A user's qualifying best, before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBest {
    pub user_id: UserId,
    pub username: String,
    pub best_cps: Cps,
    pub total_tests: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub username: String,
    pub best_cps: Cps,
    pub total_tests: u64,
}

pub fn compare_best(a: &UserBest, b: &UserBest) -> Ordering {
    b.best_cps
        .cmp(&a.best_cps)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sorts, truncates to `limit`, and assigns positional ranks.
pub fn rank(mut rows: Vec<UserBest>, limit: u32) -> Vec<LeaderboardEntry> {
    rows.sort_by(compare_best);
    rows.into_iter()
        .take(limit as usize)
        .zip(1u32..)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            user_id: row.user_id,
            username: row.username,
            best_cps: row.best_cps,
            total_tests: row.total_tests,
        })
        .collect()
}

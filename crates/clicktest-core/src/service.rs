//! Submission flow: judge, persist, re-aggregate.
//!
//! Each submission runs in order:
//! 1. Validate against the anti-cheat policy
//! 2. Persist the trial and, if invalid, its flag record (one transaction)
//! 3. Recompute and overwrite the user's summary (a second transaction)
//!
//! A failure in step 3 leaves the trial stored and the old summary in place;
//! the next successful recompute for that user repairs it.

use crate::anticheat::{self, AntiCheatPolicy};
use crate::errors::{ArenaError, StoreError};
use crate::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::model::{clamp_history_limit, HistoryEntry, NewTrial, SubmitReceipt, UserId};
use crate::stats::UserStats;
use crate::storage::ArenaStore;
use crate::submission::TrialSubmission;

pub struct Arena<S> {
    store: S,
    policy: AntiCheatPolicy,
}

impl<S: ArenaStore> Arena<S> {
    pub fn new(store: S, policy: AntiCheatPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &AntiCheatPolicy {
        &self.policy
    }

    /// Schema-check a raw payload, then [`submit`](Self::submit) it.
    pub fn submit_payload(
        &self,
        user_id: UserId,
        payload: TrialSubmission,
    ) -> Result<SubmitReceipt, ArenaError> {
        let trial = payload.into_new_trial()?;
        self.submit(user_id, trial)
    }

    /// Judge and store one trial. Flagged trials are still stored and still
    /// produce a receipt; only `is_valid` tells them apart.
    pub fn submit(&self, user_id: UserId, trial: NewTrial) -> Result<SubmitReceipt, ArenaError> {
        let verdict = anticheat::validate(
            &self.policy,
            trial.duration_ms,
            trial.total_clicks,
            trial.reported_cps,
        );

        let stored = self.store.insert_trial(user_id, &trial, &verdict)?;

        if verdict.is_valid {
            tracing::info!(
                user_id,
                trial_id = stored.id,
                cps = %stored.cps,
                "trial accepted"
            );
        } else {
            let reasons = anticheat::encode_reasons(&verdict.reasons);
            tracing::warn!(
                user_id,
                trial_id = stored.id,
                reported = %trial.reported_cps,
                calculated = %verdict.calculated,
                reasons = %reasons,
                "trial flagged"
            );
        }

        if let Err(source) = self.store.recompute_user_stats(user_id) {
            tracing::error!(
                user_id,
                trial_id = stored.id,
                error = %source,
                "stats recompute failed; summary is stale until next recompute"
            );
            return Err(ArenaError::Aggregation {
                trial_id: stored.id,
                source,
            });
        }

        Ok(SubmitReceipt::from(&stored))
    }

    pub fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, ArenaError> {
        let entries = self.store.leaderboard(query)?;
        tracing::debug!(
            duration_ms = query.duration_ms,
            limit = query.limit,
            rows = entries.len(),
            "leaderboard query"
        );
        Ok(entries)
    }

    /// Stored summary for a known user; all zeros if nothing valid yet.
    pub fn user_stats(&self, user_id: UserId) -> Result<UserStats, ArenaError> {
        self.require_user(user_id)?;
        Ok(self.store.get_user_stats(user_id)?)
    }

    pub fn history(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<HistoryEntry>, ArenaError> {
        self.require_user(user_id)?;
        let limit = clamp_history_limit(limit);
        let rows = self.store.history(user_id, limit)?;
        tracing::debug!(user_id, limit, rows = rows.len(), "history query");
        Ok(rows)
    }

    pub fn repair_stats(&self) -> Result<usize, ArenaError> {
        Ok(self.store.repair_all_stats()?)
    }

    fn require_user(&self, user_id: UserId) -> Result<(), StoreError> {
        match self.store.find_user(user_id)? {
            Some(_) => Ok(()),
            None => Err(StoreError::UserNotFound { user_id }),
        }
    }
}

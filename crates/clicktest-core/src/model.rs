use crate::anticheat::FlagReason;
use crate::cps::Cps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TrialId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

/// A schema-checked trial ready to be judged and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrial {
    pub duration_ms: u64,
    pub total_clicks: u64,
    pub reported_cps: Cps,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub user_agent: Option<String>,
}

/// A stored trial. Immutable once written; `is_valid` is never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trial {
    pub id: TrialId,
    pub user_id: UserId,
    pub duration_ms: u64,
    pub total_clicks: u64,
    pub cps: Cps,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub is_valid: bool,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub user_agent: Option<String>,
}

/// Present only for invalid trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedTrial {
    pub trial_id: TrialId,
    pub reasons: Vec<FlagReason>,
    pub flagged_at: DateTime<Utc>,
}

/// Response body for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub id: TrialId,
    pub cps: Cps,
    pub total_clicks: u64,
    pub duration_ms: u64,
    pub is_valid: bool,
}

impl From<&Trial> for SubmitReceipt {
    fn from(t: &Trial) -> Self {
        Self {
            id: t.id,
            cps: t.cps,
            total_clicks: t.total_clicks,
            duration_ms: t.duration_ms,
            is_valid: t.is_valid,
        }
    }
}

/// One row of a user's recent-trial history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: TrialId,
    pub duration_ms: u64,
    pub total_clicks: u64,
    pub cps: Cps,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub is_valid: bool,
}

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const MAX_HISTORY_LIMIT: u32 = 50;

/// 0 means "use the default"; anything above the cap is clamped.
pub fn clamp_history_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => DEFAULT_HISTORY_LIMIT,
        Some(n) => n.min(MAX_HISTORY_LIMIT),
    }
}

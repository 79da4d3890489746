//! Per-user summary over valid trials.
//!
//! The summary is always derived from the full set of a user's valid trials;
//! [`StatsAccumulator`] is the fold the store runs over that set.

use crate::cps::Cps;
use crate::model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub best_cps: Cps,
    pub avg_cps: Cps,
    pub total_tests: u64,
    /// `None` until a summary has been written for this user.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserStats {
    /// All-zero summary for a user with no valid trials.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            best_cps: Cps::ZERO,
            avg_cps: Cps::ZERO,
            total_tests: 0,
            updated_at: None,
        }
    }
}

/// Running count/sum/max over CPS values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsAccumulator {
    count: u64,
    sum: i128,
    best: Option<Cps>,
}

/// The three aggregate fields, computed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub best_cps: Cps,
    pub avg_cps: Cps,
    pub total_tests: u64,
}

impl StatsAccumulator {
    pub fn push(&mut self, cps: Cps) {
        self.count += 1;
        self.sum += i128::from(cps.hundredths());
        self.best = Some(self.best.map_or(cps, |b| b.max(cps)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self) -> Aggregate {
        Aggregate {
            best_cps: self.best.unwrap_or(Cps::ZERO),
            avg_cps: Cps::mean(self.sum, self.count),
            total_tests: self.count,
        }
    }
}

impl FromIterator<Cps> for StatsAccumulator {
    fn from_iter<I: IntoIterator<Item = Cps>>(iter: I) -> Self {
        let mut acc = Self::default();
        for cps in iter {
            acc.push(cps);
        }
        acc
    }
}

//! Submission validation.
//!
//! Recomputes a trial's CPS from its raw counters and flags submissions whose
//! reported CPS disagrees with that value or is beyond human reach.
//!
//! Checks run in a fixed order and are independent:
//! 1. `CLIENT_TAMPERING`: |reported - calculated| > tamper tolerance
//! 2. `IMPOSSIBLE_CPS`: reported > max plausible CPS
//!
//! Every failing check is recorded, so a payload that is both falsified and
//! implausible carries both reasons.

use crate::cps::Cps;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default allowed drift between reported and recalculated CPS.
pub const DEFAULT_TAMPER_TOLERANCE: Cps = Cps::from_parts(0, 50);

/// Default ceiling for an unassisted click rate.
pub const DEFAULT_MAX_PLAUSIBLE_CPS: Cps = Cps::from_parts(20, 0);

/// Thresholds applied by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntiCheatPolicy {
    pub tamper_tolerance: Cps,
    pub max_plausible_cps: Cps,
}

impl Default for AntiCheatPolicy {
    fn default() -> Self {
        Self {
            tamper_tolerance: DEFAULT_TAMPER_TOLERANCE,
            max_plausible_cps: DEFAULT_MAX_PLAUSIBLE_CPS,
        }
    }
}

/// Why a trial was marked invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagReason {
    ClientTampering,
    ImpossibleCps,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientTampering => "CLIENT_TAMPERING",
            Self::ImpossibleCps => "IMPOSSIBLE_CPS",
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CLIENT_TAMPERING" => Ok(Self::ClientTampering),
            "IMPOSSIBLE_CPS" => Ok(Self::ImpossibleCps),
            other => Err(format!("unknown flag reason: {other}")),
        }
    }
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_valid: bool,
    /// CPS recomputed from `total_clicks` and `duration_ms`, saturating at
    /// [`Cps::MAX`] when the counters are too large to represent.
    pub calculated: Cps,
    /// Failed checks in check order; empty iff `is_valid`.
    pub reasons: Vec<FlagReason>,
}

impl Verdict {
    pub fn primary_reason(&self) -> Option<FlagReason> {
        self.reasons.first().copied()
    }

    pub fn has_reason(&self, reason: FlagReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Judge a submission. `duration_ms` must be non-zero; callers reject zero
/// durations as a schema violation before getting here.
pub fn validate(
    policy: &AntiCheatPolicy,
    duration_ms: u64,
    total_clicks: u64,
    reported: Cps,
) -> Verdict {
    debug_assert!(duration_ms > 0, "zero duration must be rejected upstream");
    let calculated = Cps::from_counts(total_clicks, duration_ms.max(1)).unwrap_or(Cps::MAX);

    let mut reasons = Vec::new();
    if reported.abs_diff(calculated) > policy.tamper_tolerance {
        reasons.push(FlagReason::ClientTampering);
    }
    if reported > policy.max_plausible_cps {
        reasons.push(FlagReason::ImpossibleCps);
    }

    Verdict {
        is_valid: reasons.is_empty(),
        calculated,
        reasons,
    }
}

/// Comma-joined wire codes, as persisted alongside flagged trials.
pub fn encode_reasons(reasons: &[FlagReason]) -> String {
    reasons
        .iter()
        .map(FlagReason::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_reasons(s: &str) -> Result<Vec<FlagReason>, String> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cps(s: &str) -> Cps {
        s.parse().unwrap()
    }

    #[test]
    fn test_exact_match_is_valid() {
        let v = validate(&AntiCheatPolicy::default(), 10_000, 150, cps("15.00"));
        assert!(v.is_valid);
        assert_eq!(v.calculated, cps("15.00"));
        assert!(v.reasons.is_empty());
        assert_eq!(v.primary_reason(), None);
    }

    #[test]
    fn test_falsified_and_implausible_records_both() {
        let v = validate(&AntiCheatPolicy::default(), 10_000, 150, cps("20.5"));
        assert!(!v.is_valid);
        assert_eq!(
            v.reasons,
            vec![FlagReason::ClientTampering, FlagReason::ImpossibleCps]
        );
        assert_eq!(v.primary_reason(), Some(FlagReason::ClientTampering));
    }

    #[test]
    fn test_honest_but_impossible() {
        let v = validate(&AntiCheatPolicy::default(), 1_000, 25, cps("25.00"));
        assert!(!v.is_valid);
        assert_eq!(v.reasons, vec![FlagReason::ImpossibleCps]);
        assert!(!v.has_reason(FlagReason::ClientTampering));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let policy = AntiCheatPolicy::default();
        // calculated 15.00, diff exactly 0.50 -> accepted
        assert!(validate(&policy, 10_000, 150, cps("15.50")).is_valid);
        assert!(validate(&policy, 10_000, 150, cps("14.50")).is_valid);
        // diff 0.51 -> tampering
        let v = validate(&policy, 10_000, 150, cps("15.51"));
        assert_eq!(v.reasons, vec![FlagReason::ClientTampering]);
    }

    #[test]
    fn test_max_cps_boundary_is_inclusive() {
        let policy = AntiCheatPolicy::default();
        assert!(validate(&policy, 1_000, 20, cps("20.00")).is_valid);
        let v = validate(&policy, 1_000, 20, cps("20.01"));
        assert_eq!(v.reasons, vec![FlagReason::ImpossibleCps]);
    }

    #[test]
    fn test_rounding_applies_before_comparison() {
        // 100 clicks / 3s = 33.33 after rounding; with a loose ceiling the
        // report of 33.83 sits exactly on the tolerance edge.
        let policy = AntiCheatPolicy {
            max_plausible_cps: cps("100"),
            ..Default::default()
        };
        assert!(validate(&policy, 3_000, 100, cps("33.83")).is_valid);
        assert!(!validate(&policy, 3_000, 100, cps("33.84")).is_valid);
    }

    #[test]
    fn test_zero_clicks() {
        let policy = AntiCheatPolicy::default();
        assert!(validate(&policy, 5_000, 0, Cps::ZERO).is_valid);
        let v = validate(&policy, 5_000, 0, cps("1.00"));
        assert_eq!(v.reasons, vec![FlagReason::ClientTampering]);
    }

    #[test]
    fn test_negative_report_is_tampering() {
        let v = validate(&AntiCheatPolicy::default(), 10_000, 50, cps("-5"));
        assert_eq!(v.reasons, vec![FlagReason::ClientTampering]);
    }

    #[test]
    fn test_oversized_counters_never_validate() {
        let policy = AntiCheatPolicy::default();
        let v = validate(&policy, 1, 100_000_000_000_000, Cps::ZERO);
        assert!(!v.is_valid);
        assert_eq!(v.calculated, Cps::MAX);
        assert_eq!(v.reasons, vec![FlagReason::ClientTampering]);

        let v = validate(&policy, 1, u64::MAX, Cps::MAX);
        assert_eq!(v.reasons, vec![FlagReason::ImpossibleCps]);
    }

    #[test]
    fn test_extreme_negative_report_is_tampering() {
        let v = validate(
            &AntiCheatPolicy::default(),
            1,
            92_233_720_368_547,
            Cps::from_hundredths(i64::MIN + 1),
        );
        assert!(!v.is_valid);
        assert_eq!(v.reasons, vec![FlagReason::ClientTampering]);
    }

    #[test]
    fn test_custom_policy() {
        let strict = AntiCheatPolicy {
            tamper_tolerance: Cps::ZERO,
            max_plausible_cps: cps("14.10"),
        };
        assert!(!validate(&strict, 10_000, 150, cps("15.00")).is_valid);
        assert!(!validate(&strict, 10_000, 100, cps("10.01")).is_valid);
        assert!(validate(&strict, 10_000, 100, cps("10.00")).is_valid);
    }

    #[test]
    fn test_accepts_within_tolerance_across_durations() {
        let policy = AntiCheatPolicy::default();
        for duration in [1_000u64, 5_000, 10_000, 15_000, 30_000, 60_000] {
            for clicks in [0u64, 1, 7, 42, 99, 150, 199] {
                let calculated = Cps::from_counts(clicks, duration).unwrap();
                if calculated > policy.max_plausible_cps {
                    continue;
                }
                let v = validate(&policy, duration, clicks, calculated);
                assert!(v.is_valid, "{clicks} clicks in {duration}ms");
            }
        }
    }

    #[test]
    fn test_reason_codes_roundtrip_through_storage_format() {
        let all = vec![FlagReason::ClientTampering, FlagReason::ImpossibleCps];
        let encoded = encode_reasons(&all);
        assert_eq!(encoded, "CLIENT_TAMPERING,IMPOSSIBLE_CPS");
        assert_eq!(decode_reasons(&encoded).unwrap(), all);
        assert!(decode_reasons("SPEEDHACK").is_err());
        assert_eq!(decode_reasons("").unwrap(), vec![]);
    }

    #[test]
    fn test_reason_serde_uses_wire_codes() {
        let json = serde_json::to_string(&FlagReason::ImpossibleCps).unwrap();
        assert_eq!(json, "\"IMPOSSIBLE_CPS\"");
    }
}

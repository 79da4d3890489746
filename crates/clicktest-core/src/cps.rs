//! Fixed-point clicks-per-second.
//!
//! Every CPS value the system stores, compares, or prints is held as an
//! integer count of hundredths. Rounding is half-away-from-zero everywhere,
//! so the calculated value and the client-reported value go through the
//! same rounding before they are compared.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SCALE: i64 = 100;

/// Clicks per second with two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cps(i64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpsParseError {
    #[error("empty CPS value")]
    Empty,
    #[error("malformed CPS value: {0:?}")]
    Malformed(String),
    #[error("CPS value out of range: {0}")]
    OutOfRange(String),
}

impl Cps {
    pub const ZERO: Cps = Cps(0);
    pub const MAX: Cps = Cps(i64::MAX);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// `whole.frac` where `frac` is hundredths, e.g. `from_parts(15, 50)` is 15.50.
    pub const fn from_parts(whole: i64, frac: i64) -> Self {
        Self(whole * SCALE + frac)
    }

    /// `total_clicks / (duration_ms / 1000)`, rounded to hundredths.
    ///
    /// Returns `None` for a zero duration or a result that does not fit.
    pub fn from_counts(total_clicks: u64, duration_ms: u64) -> Option<Self> {
        if duration_ms == 0 {
            return None;
        }
        // hundredths = clicks * 100_000 / duration, rounded half up (both sides positive)
        let num = u128::from(total_clicks) * 200_000 + u128::from(duration_ms);
        let den = u128::from(duration_ms) * 2;
        i64::try_from(num / den).ok().map(Self)
    }

    /// Rounds a reported float to hundredths through its shortest decimal
    /// form, so `1.005` rounds the same as the string `"1.005"`. Rejects NaN,
    /// infinities and magnitudes that do not fit.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        value.to_string().parse().ok()
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Rounded mean of `sum` spread over `count` values.
    pub fn mean(sum: i128, count: u64) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        let count = i128::from(count);
        let half = count / 2;
        let rounded = if sum >= 0 {
            (sum + half) / count
        } else {
            (sum - half) / count
        };
        Self(rounded as i64)
    }

    /// Distance between two values, saturating at [`Cps::MAX`].
    pub fn abs_diff(self, other: Self) -> Self {
        Self(i64::try_from(self.0.abs_diff(other.0)).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Cps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / SCALE as u64, abs % SCALE as u64)
    }
}

impl FromStr for Cps {
    type Err = CpsParseError;

    /// Exact decimal parse; digits past the second decimal round half away from zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CpsParseError::Empty);
        }
        let malformed = || CpsParseError::Malformed(s.to_string());

        let (negative, digits) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let whole_val: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| CpsParseError::OutOfRange(s.to_string()))?
        };
        let frac_bytes = frac.as_bytes();
        let digit = |i: usize| frac_bytes.get(i).map_or(0, |b| i64::from(b - b'0'));
        let mut hundredths = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            hundredths += 1;
        }

        let value = whole_val
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(hundredths))
            .ok_or_else(|| CpsParseError::OutOfRange(s.to_string()))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Serialize for Cps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Cps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CpsVisitor)
    }
}

/// Accepts a JSON number or a decimal string; clients send either.
struct CpsVisitor;

impl Visitor<'_> for CpsVisitor {
    type Value = Cps;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or decimal string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Cps, E> {
        Cps::from_f64(v).ok_or_else(|| E::custom(format!("CPS value out of range: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Cps, E> {
        v.checked_mul(SCALE)
            .map(Cps)
            .ok_or_else(|| E::custom(format!("CPS value out of range: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Cps, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(SCALE))
            .map(Cps)
            .ok_or_else(|| E::custom(format!("CPS value out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Cps, E> {
        v.parse().map_err(E::custom)
    }
}

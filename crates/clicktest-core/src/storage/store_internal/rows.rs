//! Column conversions shared by the table modules.

use crate::errors::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC RFC 3339 so text ordering matches time ordering.
pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn ts_from_sql(table: &'static str, s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            table,
            detail: format!("invalid timestamp {s:?}: {e}"),
        })
}

pub(crate) fn u64_to_sql(column: &'static str, v: u64) -> Result<i64, StoreError> {
    i64::try_from(v).map_err(|_| StoreError::OutOfRange {
        column,
        value: v.to_string(),
    })
}

pub(crate) fn u64_from_sql(column: &'static str, v: i64) -> Result<u64, StoreError> {
    u64::try_from(v).map_err(|_| StoreError::OutOfRange {
        column,
        value: v.to_string(),
    })
}

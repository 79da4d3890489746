//! Summary recompute and read paths.

use super::rows::{ts_from_sql, ts_to_sql, u64_from_sql, u64_to_sql};
use super::trials::valid_cps_for_user_impl;
use super::users::user_exists_impl;
use crate::cps::Cps;
use crate::errors::StoreError;
use crate::model::UserId;
use crate::stats::{StatsAccumulator, UserStats};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// Full rescan + overwrite. Must run inside a write transaction so the scan
/// and the overwrite see the same trial set.
pub(crate) fn recompute_inner_impl(
    conn: &Connection,
    user_id: UserId,
) -> Result<UserStats, StoreError> {
    if !user_exists_impl(conn, user_id)? {
        return Err(StoreError::UserNotFound { user_id });
    }

    let acc: StatsAccumulator = valid_cps_for_user_impl(conn, user_id)?.into_iter().collect();
    let agg = acc.finish();
    let now = ts_to_sql(&Utc::now());

    let written = if agg.total_tests > 0 {
        conn.execute(
            r#"
            INSERT INTO user_stats (user_id, best_cps, avg_cps, total_tests, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                best_cps = excluded.best_cps,
                avg_cps = excluded.avg_cps,
                total_tests = excluded.total_tests,
                updated_at = excluded.updated_at
            "#,
            params![
                user_id,
                agg.best_cps.hundredths(),
                agg.avg_cps.hundredths(),
                u64_to_sql("total_tests", agg.total_tests)?,
                now,
            ],
        )?
    } else {
        // No valid trials: nothing to create. A row only goes stale when a
        // trial's is_valid is revised after the fact (e.g. by hand in the
        // database); repair then zeroes it.
        conn.execute(
            "UPDATE user_stats SET best_cps = 0, avg_cps = 0, total_tests = 0, updated_at = ?1
             WHERE user_id = ?2",
            params![now, user_id],
        )?
    };

    Ok(UserStats {
        user_id,
        best_cps: agg.best_cps,
        avg_cps: agg.avg_cps,
        total_tests: agg.total_tests,
        updated_at: if written > 0 {
            Some(ts_from_sql("user_stats", &now)?)
        } else {
            None
        },
    })
}

pub(crate) fn get_user_stats_impl(
    conn: &Connection,
    user_id: UserId,
) -> Result<UserStats, StoreError> {
    let row: Option<(i64, i64, i64, String)> = conn
        .query_row(
            "SELECT best_cps, avg_cps, total_tests, updated_at FROM user_stats WHERE user_id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    match row {
        Some((best, avg, total, updated_at)) => Ok(UserStats {
            user_id,
            best_cps: Cps::from_hundredths(best),
            avg_cps: Cps::from_hundredths(avg),
            total_tests: u64_from_sql("total_tests", total)?,
            updated_at: Some(ts_from_sql("user_stats", &updated_at)?),
        }),
        None => Ok(UserStats::empty(user_id)),
    }
}

//! Trial append and read paths.

use super::rows::{ts_from_sql, ts_to_sql, u64_from_sql, u64_to_sql};
use super::users::user_exists_impl;
use crate::anticheat::{decode_reasons, encode_reasons, Verdict};
use crate::cps::Cps;
use crate::errors::StoreError;
use crate::model::{FlaggedTrial, HistoryEntry, NewTrial, Trial, TrialId, UserId};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Appends the trial and, for an invalid verdict, its flag row. Callers
/// wrap this in a transaction so both land or neither does.
pub(crate) fn insert_trial_inner_impl(
    conn: &Connection,
    user_id: UserId,
    trial: &NewTrial,
    verdict: &Verdict,
) -> Result<Trial, StoreError> {
    if !user_exists_impl(conn, user_id)? {
        return Err(StoreError::UserNotFound { user_id });
    }

    conn.execute(
        r#"
        INSERT INTO trials (
            user_id, duration_ms, total_clicks, cps_hundredths, started_at, ended_at,
            is_valid, device_type, browser, user_agent
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            user_id,
            u64_to_sql("duration_ms", trial.duration_ms)?,
            u64_to_sql("total_clicks", trial.total_clicks)?,
            trial.reported_cps.hundredths(),
            ts_to_sql(&trial.started_at),
            ts_to_sql(&trial.ended_at),
            verdict.is_valid as i32,
            trial.device_type,
            trial.browser,
            trial.user_agent,
        ],
    )?;
    let trial_id = conn.last_insert_rowid();

    if !verdict.is_valid {
        conn.execute(
            "INSERT INTO flagged_trials (trial_id, reasons, flagged_at) VALUES (?1, ?2, ?3)",
            params![
                trial_id,
                encode_reasons(&verdict.reasons),
                ts_to_sql(&Utc::now())
            ],
        )?;
    }

    get_trial_impl(conn, trial_id)?.ok_or_else(|| StoreError::CorruptRow {
        table: "trials",
        detail: format!("trial {trial_id} missing after insert"),
    })
}

const TRIAL_COLUMNS: &str = "id, user_id, duration_ms, total_clicks, cps_hundredths, \
     started_at, ended_at, is_valid, device_type, browser, user_agent";

struct TrialRow {
    id: i64,
    user_id: i64,
    duration_ms: i64,
    total_clicks: i64,
    cps_hundredths: i64,
    started_at: String,
    ended_at: String,
    is_valid: i64,
    device_type: Option<String>,
    browser: Option<String>,
    user_agent: Option<String>,
}

fn read_trial_row(row: &Row<'_>) -> rusqlite::Result<TrialRow> {
    Ok(TrialRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        duration_ms: row.get(2)?,
        total_clicks: row.get(3)?,
        cps_hundredths: row.get(4)?,
        started_at: row.get(5)?,
        ended_at: row.get(6)?,
        is_valid: row.get(7)?,
        device_type: row.get(8)?,
        browser: row.get(9)?,
        user_agent: row.get(10)?,
    })
}

impl TryFrom<TrialRow> for Trial {
    type Error = StoreError;

    fn try_from(r: TrialRow) -> Result<Self, Self::Error> {
        Ok(Trial {
            id: r.id,
            user_id: r.user_id,
            duration_ms: u64_from_sql("duration_ms", r.duration_ms)?,
            total_clicks: u64_from_sql("total_clicks", r.total_clicks)?,
            cps: Cps::from_hundredths(r.cps_hundredths),
            started_at: ts_from_sql("trials", &r.started_at)?,
            ended_at: ts_from_sql("trials", &r.ended_at)?,
            is_valid: r.is_valid != 0,
            device_type: r.device_type,
            browser: r.browser,
            user_agent: r.user_agent,
        })
    }
}

pub(crate) fn get_trial_impl(
    conn: &Connection,
    trial_id: TrialId,
) -> Result<Option<Trial>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {TRIAL_COLUMNS} FROM trials WHERE id = ?1"),
            [trial_id],
            read_trial_row,
        )
        .optional()?;
    row.map(Trial::try_from).transpose()
}

pub(crate) fn get_flag_impl(
    conn: &Connection,
    trial_id: TrialId,
) -> Result<Option<FlaggedTrial>, StoreError> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT reasons, flagged_at FROM flagged_trials WHERE trial_id = ?1",
            [trial_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((reasons, flagged_at)) => Ok(Some(FlaggedTrial {
            trial_id,
            reasons: decode_reasons(&reasons).map_err(|detail| StoreError::CorruptRow {
                table: "flagged_trials",
                detail,
            })?,
            flagged_at: ts_from_sql("flagged_trials", &flagged_at)?,
        })),
        None => Ok(None),
    }
}

pub(crate) fn history_impl(
    conn: &Connection,
    user_id: UserId,
    limit: u32,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRIAL_COLUMNS} FROM trials
         WHERE user_id = ?1
         ORDER BY started_at DESC, id DESC
         LIMIT ?2"
    ))?;
    let rows = stmt
        .query_map(params![user_id, i64::from(limit)], read_trial_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|r| -> Result<HistoryEntry, StoreError> {
            let t = Trial::try_from(r)?;
            Ok(HistoryEntry {
                id: t.id,
                duration_ms: t.duration_ms,
                total_clicks: t.total_clicks,
                cps: t.cps,
                started_at: t.started_at,
                ended_at: t.ended_at,
                is_valid: t.is_valid,
            })
        })
        .collect()
}

/// CPS of every valid trial the user owns.
pub(crate) fn valid_cps_for_user_impl(
    conn: &Connection,
    user_id: UserId,
) -> Result<Vec<Cps>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT cps_hundredths FROM trials WHERE user_id = ?1 AND is_valid = 1 ORDER BY id ASC",
    )?;
    let values = stmt
        .query_map([user_id], |row| row.get::<_, i64>(0))?
        .map(|r| r.map(Cps::from_hundredths))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}

use super::rows::{u64_from_sql, u64_to_sql};
use crate::cps::Cps;
use crate::errors::StoreError;
use crate::leaderboard::{self, LeaderboardEntry, LeaderboardQuery, UserBest};
use rusqlite::{params, Connection};

pub(crate) fn leaderboard_impl(
    conn: &Connection,
    query: &LeaderboardQuery,
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.username, MAX(t.cps_hundredths) AS best_cps, COUNT(t.id) AS total_tests
        FROM trials t
        JOIN users u ON t.user_id = u.id
        WHERE t.is_valid = 1
          AND t.duration_ms = ?1
          AND u.is_banned = 0
        GROUP BY u.id, u.username
        ORDER BY best_cps DESC, u.id ASC
        LIMIT ?2
        "#,
    )?;
    let rows = stmt
        .query_map(
            params![
                u64_to_sql("duration_ms", query.duration_ms)?,
                i64::from(query.limit)
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let bests = rows
        .into_iter()
        .map(|(user_id, username, best, total)| -> Result<UserBest, StoreError> {
            Ok(UserBest {
                user_id,
                username,
                best_cps: Cps::from_hundredths(best),
                total_tests: u64_from_sql("total_tests", total)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(leaderboard::rank(bests, query.limit))
}

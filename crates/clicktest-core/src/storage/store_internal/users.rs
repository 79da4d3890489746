use super::rows::{ts_from_sql, ts_to_sql};
use crate::errors::StoreError;
use crate::model::{User, UserId};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) fn create_user_impl(conn: &Connection, username: &str) -> Result<User, StoreError> {
    let created_at = Utc::now();
    let insert_result = conn.execute(
        "INSERT INTO users (username, is_banned, created_at) VALUES (?1, 0, ?2)",
        params![username, ts_to_sql(&created_at)],
    );

    if let Err(e) = insert_result {
        if e.to_string().contains("UNIQUE constraint failed") {
            return Err(StoreError::UsernameTaken {
                username: username.to_string(),
            });
        }
        return Err(e.into());
    }

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        is_banned: false,
        created_at: ts_from_sql("users", &ts_to_sql(&created_at))?,
    })
}

fn user_from_parts(
    (id, username, is_banned, created_at): (i64, String, i64, String),
) -> Result<User, StoreError> {
    Ok(User {
        id,
        username,
        is_banned: is_banned != 0,
        created_at: ts_from_sql("users", &created_at)?,
    })
}

pub(crate) fn find_user_impl(conn: &Connection, user_id: UserId) -> Result<Option<User>, StoreError> {
    let row: Option<(i64, String, i64, String)> = conn
        .query_row(
            "SELECT id, username, is_banned, created_at FROM users WHERE id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;
    row.map(user_from_parts).transpose()
}

pub(crate) fn find_user_by_name_impl(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, StoreError> {
    let row: Option<(i64, String, i64, String)> = conn
        .query_row(
            "SELECT id, username, is_banned, created_at FROM users WHERE username = ?1",
            [username],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;
    row.map(user_from_parts).transpose()
}

pub(crate) fn user_exists_impl(conn: &Connection, user_id: UserId) -> Result<bool, StoreError> {
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(exists > 0)
}

pub(crate) fn set_banned_impl(
    conn: &Connection,
    user_id: UserId,
    banned: bool,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE users SET is_banned = ?1 WHERE id = ?2",
        params![banned as i32, user_id],
    )?;
    if changed == 0 {
        return Err(StoreError::UserNotFound { user_id });
    }
    Ok(())
}

pub(crate) fn user_ids_impl(conn: &Connection) -> Result<Vec<UserId>, StoreError> {
    let mut stmt = conn.prepare("SELECT id FROM users ORDER BY id ASC")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

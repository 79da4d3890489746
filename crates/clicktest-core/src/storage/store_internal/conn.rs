use super::super::schema::ARENA_SCHEMA;
use crate::errors::StoreError;
use rusqlite::Connection;

pub(crate) const BUSY_TIMEOUT_MS: u32 = 5000;

pub(crate) fn init_connection_impl(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    // WAL mode for file-backed DBs (no-op for in-memory)
    let _ = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0));
    conn.busy_timeout(std::time::Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))?;
    conn.execute_batch(ARENA_SCHEMA)?;
    Ok(())
}

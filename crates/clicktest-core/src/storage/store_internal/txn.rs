use crate::errors::StoreError;
use rusqlite::Connection;

/// Runs `f` inside `BEGIN IMMEDIATE`. The write lock is taken up front, so a
/// read-then-write inside `f` cannot interleave with another writer.
pub(crate) fn with_immediate_txn<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    conn.execute("BEGIN IMMEDIATE", [])?;

    let result = f(conn);

    match &result {
        Ok(_) => {
            if let Err(e) = conn.execute("COMMIT", []) {
                let _ = conn.execute("ROLLBACK", []);
                return Err(e.into());
            }
        }
        Err(_) => {
            let _ = conn.execute("ROLLBACK", []);
        }
    }

    result
}

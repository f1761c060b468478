//! Optimistic Concurrency Protocol
//! Mission: One conditional-update implementation shared by every entity
//!
//! The contract: the caller read the row at some version, computed new field
//! values, and asks for a single atomic write that lands only if the version
//! is still what it observed. Either the full patch plus version bump lands,
//! or nothing does.

use rusqlite::{Connection, ToSql};

use super::StoreError;

/// Apply a version-guarded update to one row of `table`.
///
/// `columns` and `values` are the business fields to overwrite; the column
/// names come from static strings in the calling module, never from request
/// input. `owner` optionally adds a `user_id` guard for rows scoped to one
/// user. Returns the new version so the caller's in-memory copy stays
/// consistent without a second read.
///
/// Zero matched rows means the snapshot went stale (a concurrent writer got
/// there first, or the row was deleted) and surfaces as
/// [`StoreError::EditConflict`]. The protocol does not retry; that is the
/// caller's decision.
pub fn conditional_update(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
    values: &[&dyn ToSql],
    id: i64,
    expected_version: i64,
    owner: Option<i64>,
) -> Result<i64, StoreError> {
    debug_assert_eq!(columns.len(), values.len());

    let mut sql = format!("UPDATE {table} SET ");
    for col in columns {
        sql.push_str(col);
        sql.push_str(" = ?, ");
    }
    sql.push_str("version = version + 1 WHERE id = ? AND version = ?");
    if owner.is_some() {
        sql.push_str(" AND user_id = ?");
    }
    sql.push_str(" RETURNING version");

    let mut params: Vec<&dyn ToSql> = values.to_vec();
    params.push(&id);
    params.push(&expected_version);
    if let Some(owner_id) = owner.as_ref() {
        params.push(owner_id);
    }

    let new_version = conn
        .query_row(&sql, params.as_slice(), |row| row.get::<_, i64>(0))
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::EditConflict,
            other => StoreError::from(other),
        })?;

    Ok(new_version)
}

//! Queries over the `members` table.
//!
//! Passwords are stored and compared as plain text.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Member;

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Member>> {
    let sql = format!("SELECT {} FROM members ORDER BY id", Member::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let members = stmt
        .query_map([], Member::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Member>> {
    let sql = format!("SELECT {} FROM members WHERE id = ?1", Member::COLUMNS);
    conn.query_row(&sql, params![id], Member::from_row).optional()
}

/// Find the member whose account and password both match.
///
/// Succeeds only when exactly one row matches; duplicate accounts sharing a
/// password are treated as a failed login.
pub fn authenticate(
    conn: &Connection,
    account: &str,
    password: &str,
) -> rusqlite::Result<Option<Member>> {
    let sql = format!(
        "SELECT {} FROM members WHERE account = ?1 AND password = ?2",
        Member::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut matches = stmt
        .query_map(params![account, password], Member::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if matches.len() == 1 {
        Ok(matches.pop())
    } else {
        Ok(None)
    }
}

/// True when some member other than `member_id` already uses `account`.
pub fn account_taken_by_other(
    conn: &Connection,
    account: &str,
    member_id: i64,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM members WHERE account = ?1 AND id != ?2",
        params![account, member_id],
        |row| row.get(0),
    )
}

pub fn update_credentials(
    conn: &Connection,
    member_id: i64,
    account: &str,
    password: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE members SET account = ?1, password = ?2 WHERE id = ?3",
        params![account, password, member_id],
    )
}

/// Delete a member and every session it holds.
pub fn delete(conn: &Connection, member_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM sessions WHERE member_id = ?1", params![member_id])?;
    conn.execute("DELETE FROM members WHERE id = ?1", params![member_id])
}

#[cfg(test)]
pub(crate) fn insert(
    conn: &Connection,
    username: &str,
    account: &str,
    password: &str,
) -> i64 {
    conn.execute(
        "INSERT INTO members (username, account, password) VALUES (?1, ?2, ?3)",
        params![username, account, password],
    )
    .unwrap();
    conn.last_insert_rowid()
}

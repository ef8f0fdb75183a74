use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::error::AppResult;
use crate::extractors::CurrentMember;
use crate::state::DbPool;

/// Create a new session for a member. Returns the session token.
pub fn create_session(pool: &DbPool, member_id: i64, idle_minutes: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, member_id, token, expires_at)
         VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, member_id, token, lifetime_modifier(idle_minutes)],
    )?;

    Ok(token)
}

/// Resolve a token to its member while the session is unexpired and the
/// member still exists.
pub fn find_member(pool: &DbPool, token: &str) -> AppResult<Option<CurrentMember>> {
    let conn = pool.get()?;
    let member = conn
        .query_row(
            "SELECT m.id, m.username FROM sessions s
             JOIN members m ON m.id = s.member_id
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(CurrentMember {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(member)
}

/// Whether a token still names an unexpired session.
pub fn is_live(pool: &DbPool, token: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let live = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sessions WHERE token = ?1 AND expires_at > datetime('now')",
        params![token],
        |row| row.get(0),
    )?;
    Ok(live)
}

/// Push the expiry of a session out to `idle_minutes` from now.
pub fn renew_session(pool: &DbPool, token: &str, idle_minutes: u64) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE sessions SET expires_at = datetime('now', ?2) WHERE token = ?1",
        params![token, lifetime_modifier(idle_minutes)],
    )?;
    Ok(())
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Drop every expired session. Returns the number removed.
pub fn purge_expired(pool: &DbPool) -> AppResult<usize> {
    let conn = pool.get()?;
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(removed)
}

fn lifetime_modifier(idle_minutes: u64) -> String {
    format!("+{} minutes", idle_minutes)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

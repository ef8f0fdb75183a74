pub mod announcements;
pub mod members;
pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::config::AdminConfig;
use crate::error::AppResult;
use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_announcements",
        include_str!("../../migrations/001_announcements.sql"),
    ),
    (
        "002_members",
        include_str!("../../migrations/002_members.sql"),
    ),
    (
        "003_sessions",
        include_str!("../../migrations/003_sessions.sql"),
    ),
];

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
    let pool = Pool::builder().max_size(8).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    Ok(pool)
}

/// Per-connection settings. The bundled SQLite enforces foreign keys by
/// default; they are switched off so deleting an announcement leaves its
/// image rows behind.
fn init_connection(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = OFF;
        ",
    )
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Insert the default admin member, but only while the members table is empty.
/// Returns true when a row was inserted.
pub fn seed_default_admin(pool: &DbPool, admin: &AdminConfig) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let inserted = conn.execute(
        "INSERT INTO members (username, account, password)
         SELECT ?1, ?2, ?3
         WHERE NOT EXISTS (SELECT 1 FROM members)",
        params![admin.username, admin.account, admin.password],
    )?;

    if inserted > 0 {
        tracing::info!(account = %admin.account, "Seeded default admin member");
    }
    Ok(inserted > 0)
}

/// Run one unit of work on a pooled connection.
pub fn with_conn<T>(
    pool: &DbPool,
    work: impl FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>,
) -> AppResult<T> {
    let conn = pool.get()?;
    Ok(work(&conn)?)
}

#[cfg(test)]
pub(crate) fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory().with_init(init_connection);
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    run_migrations(&pool).unwrap();
    pool
}

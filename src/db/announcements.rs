//! Queries over the `announcements` and `images` tables.
//!
//! Every function runs a single statement on the caller's connection and
//! relies on SQLite autocommit; nothing here spans a transaction.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{Announcement, Image};

pub struct NewAnnouncement<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub image: Option<&'a str>,
    pub timestamp: &'a str,
}

/// Announcements newest first, optionally capped at `limit` rows.
pub fn list(conn: &Connection, limit: Option<u32>) -> rusqlite::Result<Vec<Announcement>> {
    let sql = format!(
        "SELECT {} FROM announcements ORDER BY id DESC LIMIT ?1",
        Announcement::COLUMNS
    );
    // LIMIT -1 means no limit in SQLite
    let limit = limit.map(i64::from).unwrap_or(-1);

    let mut stmt = conn.prepare(&sql)?;
    let announcements = stmt
        .query_map(params![limit], Announcement::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(announcements)
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Announcement>> {
    let sql = format!(
        "SELECT {} FROM announcements WHERE id = ?1",
        Announcement::COLUMNS
    );
    conn.query_row(&sql, params![id], Announcement::from_row)
        .optional()
}

/// Insert a new announcement and return its generated id.
pub fn create(conn: &Connection, new: &NewAnnouncement<'_>) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO announcements (title, content, image, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![new.title, new.content, new.image, new.timestamp],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    id: i64,
    title: &str,
    content: &str,
    image: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE announcements SET title = ?1, content = ?2, image = ?3 WHERE id = ?4",
        params![title, content, image, id],
    )
}

/// Delete the announcement row only. Gallery rows and files are left behind.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM announcements WHERE id = ?1", params![id])
}

pub fn add_image(conn: &Connection, announcement_id: i64, filename: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO images (announcement_id, filename) VALUES (?1, ?2)",
        params![announcement_id, filename],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn images_for(conn: &Connection, announcement_id: i64) -> rusqlite::Result<Vec<Image>> {
    let sql = format!(
        "SELECT {} FROM images WHERE announcement_id = ?1 ORDER BY id",
        Image::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let images = stmt
        .query_map(params![announcement_id], Image::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(images)
}

pub fn get_image(conn: &Connection, image_id: i64) -> rusqlite::Result<Option<Image>> {
    let sql = format!("SELECT {} FROM images WHERE id = ?1", Image::COLUMNS);
    conn.query_row(&sql, params![image_id], Image::from_row)
        .optional()
}

pub fn delete_image(conn: &Connection, image_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM images WHERE id = ?1", params![image_id])
}

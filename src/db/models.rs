use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Cover image filename inside the upload directory.
    pub image: Option<String>,
    pub timestamp: String,
}

impl Announcement {
    pub const COLUMNS: &'static str = "id, title, content, image, timestamp";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            image: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub announcement_id: i64,
    pub filename: String,
    pub is_cover: bool,
}

impl Image {
    pub const COLUMNS: &'static str = "id, announcement_id, filename, COALESCE(is_cover, 0)";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            announcement_id: row.get(1)?,
            filename: row.get(2)?,
            is_cover: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub account: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Member {
    pub const COLUMNS: &'static str = "id, username, account, password";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            account: row.get(2)?,
            password: row.get(3)?,
        })
    }
}

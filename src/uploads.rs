//! Image uploads: filename sanitising, the on-disk store, and the multipart
//! announcement form.
//!
//! Files are written under their sanitised original name. A second upload with
//! the same name replaces the first; there is no size, type, or content check
//! beyond the request body limit.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AppError, AppResult};

/// Reduce an uploaded filename to `[A-Za-z0-9_.-]`.
///
/// The name is NFKD-decomposed so accented letters keep their base letter,
/// then non-ASCII characters are dropped, path separators become word breaks,
/// runs of whitespace collapse to `_`, and leading/trailing `.` and `_` are
/// stripped. May return an empty string, which callers treat as "no file".
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The local directory uploads are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an upload to disk and return the stored filename, or `None` when
    /// the name sanitises to nothing.
    pub async fn save(&self, file: &UploadedFile) -> AppResult<Option<String>> {
        let filename = secure_filename(&file.file_name);
        if filename.is_empty() {
            tracing::warn!(original = %file.file_name, "Skipping upload with unusable filename");
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), &file.bytes).await?;
        tracing::debug!(%filename, size = file.bytes.len(), "Stored upload");
        Ok(Some(filename))
    }

    /// Save each file in turn, skipping those whose names sanitise away.
    pub async fn save_all(&self, files: &[UploadedFile]) -> AppResult<Vec<String>> {
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            if let Some(name) = self.save(file).await? {
                stored.push(name);
            }
        }
        Ok(stored)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, filename: &str) -> AppResult<()> {
        let filename = secure_filename(filename);
        if filename.is_empty() {
            return Ok(());
        }

        match tokio::fs::remove_file(self.dir.join(&filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Fields of the create/edit announcement form.
#[derive(Debug, Default)]
pub struct AnnouncementForm {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Single cover image from the `image` field.
    pub cover: Option<UploadedFile>,
    /// Gallery images from every `images` field.
    pub gallery: Vec<UploadedFile>,
}

impl AnnouncementForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = AnnouncementForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "title" => form.title = Some(field.text().await?),
                "content" => form.content = Some(field.text().await?),
                "image" | "images" => {
                    // Browsers send an empty part with no filename when the
                    // file input was left blank.
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let bytes = field.bytes().await?.to_vec();
                    if file_name.is_empty() {
                        continue;
                    }

                    let file = UploadedFile { file_name, bytes };
                    if name == "image" {
                        form.cover = Some(file);
                    } else {
                        form.gallery.push(file);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Title and content, both of which are required.
    pub fn text_fields(&self) -> AppResult<(&str, &str)> {
        let title = self
            .title
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Title is required".into()))?;
        let content = self
            .content
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Content is required".into()))?;
        Ok((title, content))
    }
}

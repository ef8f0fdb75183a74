use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::Local;

use crate::db::announcements::{self, NewAnnouncement};
use crate::db::models::{Announcement, Image};
use crate::db::with_conn;
use crate::error::{log_write_failure, AppError, AppResult};
use crate::extractors::CurrentMember;
use crate::routes::home::Html;
use crate::state::{AppState, DbPool};
use crate::uploads::AnnouncementForm;

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub username: String,
    pub announcements: Vec<Announcement>,
}

#[derive(Template)]
#[template(path = "pages/create.html")]
pub struct CreateTemplate {
    /// Path the form posts back to; both create routes accept the upload.
    pub action: String,
}

#[derive(Template)]
#[template(path = "pages/edit.html")]
pub struct EditTemplate {
    pub announcement: Announcement,
    pub images: Vec<Image>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/create", get(create_form).post(create))
        .route(
            "/admin_announcements/create_announcements",
            get(create_form).post(create),
        )
        .route("/admin/edit/{id}", get(edit_form).post(edit))
        .route("/admin/delete/{id}", get(delete))
        .route(
            "/admin_announcements/delete-image/{image_id}/{announcement_id}",
            get(delete_image),
        )
}

// --- Handlers ---

async fn admin_page(
    State(state): State<AppState>,
    member: CurrentMember,
) -> AppResult<Html<AdminTemplate>> {
    let conn = state.db.get()?;
    let announcements = announcements::list(&conn, None)?;

    Ok(Html(AdminTemplate {
        username: member.username,
        announcements,
    }))
}

async fn create_form(_member: CurrentMember, uri: Uri) -> Html<CreateTemplate> {
    Html(CreateTemplate {
        action: uri.path().to_string(),
    })
}

async fn create(
    State(state): State<AppState>,
    _member: CurrentMember,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = AnnouncementForm::from_multipart(multipart).await?;
    let (title, content) = form.text_fields()?;

    let cover = match &form.cover {
        Some(file) => state.uploads.save(file).await?,
        None => None,
    };
    let gallery = state.uploads.save_all(&form.gallery).await?;
    let timestamp = Local::now().format("%Y-%m-%d").to_string();

    let new = NewAnnouncement {
        title,
        content,
        image: cover.as_deref(),
        timestamp: &timestamp,
    };
    if let Some(id) = log_write_failure(
        "create announcement",
        insert_with_gallery(&state.db, &new, &gallery),
    ) {
        tracing::info!(announcement_id = id, images = gallery.len(), "Created announcement");
    }

    Ok(Redirect::to("/admin").into_response())
}

async fn edit_form(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let conn = state.db.get()?;
    let announcement = announcements::get(&conn, id)?.ok_or(AppError::NotFound)?;
    let images = announcements::images_for(&conn, id)?;

    Ok(Html(EditTemplate {
        announcement,
        images,
    }))
}

async fn edit(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Response> {
    let existing = with_conn(&state.db, |conn| announcements::get(conn, id))?
        .ok_or(AppError::NotFound)?;

    let form = AnnouncementForm::from_multipart(multipart).await?;
    let (title, content) = form.text_fields()?;

    // The cover only changes when a usable new file arrives
    let new_cover = match &form.cover {
        Some(file) => state.uploads.save(file).await?,
        None => None,
    };
    let image = new_cover.or(existing.image);
    let gallery = state.uploads.save_all(&form.gallery).await?;

    let result = with_conn(&state.db, |conn| {
        announcements::update(conn, id, title, content, image.as_deref())?;
        for filename in &gallery {
            announcements::add_image(conn, id, filename)?;
        }
        Ok(())
    });
    if log_write_failure("update announcement", result).is_some() {
        tracing::info!(announcement_id = id, added_images = gallery.len(), "Updated announcement");
    }

    Ok(Redirect::to("/admin").into_response())
}

async fn delete(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(id): Path<i64>,
) -> Redirect {
    let result = with_conn(&state.db, |conn| announcements::delete(conn, id));
    if let Some(removed) = log_write_failure("delete announcement", result) {
        tracing::info!(announcement_id = id, removed, "Deleted announcement");
    }

    Redirect::to("/admin")
}

async fn delete_image(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path((image_id, announcement_id)): Path<(i64, i64)>,
) -> Redirect {
    let image = match with_conn(&state.db, |conn| announcements::get_image(conn, image_id)) {
        Ok(image) => image,
        Err(e) => {
            tracing::error!(image_id, error = %e, "Failed to look up image");
            None
        }
    };

    if let Some(image) = image {
        if let Err(e) = state.uploads.remove(&image.filename).await {
            tracing::error!(image_id, error = %e, "Failed to remove image file");
        }
        let result = with_conn(&state.db, |conn| announcements::delete_image(conn, image_id));
        if log_write_failure("delete image", result).is_some() {
            tracing::info!(image_id, filename = %image.filename, "Deleted image");
        }
    }

    Redirect::to(&format!("/admin/edit/{}", announcement_id))
}

// --- Write helpers ---

/// Insert the announcement row first to learn its id, then one row per
/// gallery file. A failure part way through leaves the earlier rows in place.
fn insert_with_gallery(
    pool: &DbPool,
    new: &NewAnnouncement<'_>,
    gallery: &[String],
) -> AppResult<i64> {
    with_conn(pool, |conn| {
        let id = announcements::create(conn, new)?;
        for filename in gallery {
            announcements::add_image(conn, id, filename)?;
        }
        Ok(id)
    })
}

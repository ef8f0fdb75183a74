use askama::Template;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;

use crate::db::announcements;
use crate::db::models::{Announcement, Image};
use crate::error::{AppError, AppResult};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/announcements.html")]
pub struct AnnouncementListTemplate {
    pub announcements: Vec<Announcement>,
}

#[derive(Template)]
#[template(path = "pages/announcement_detail.html")]
pub struct AnnouncementDetailTemplate {
    pub announcement: Announcement,
    pub images: Vec<Image>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(list_page))
        .route("/announcements/{id}", get(detail_page))
}

async fn list_page(State(state): State<AppState>) -> AppResult<Html<AnnouncementListTemplate>> {
    let conn = state.db.get()?;
    let announcements = announcements::list(&conn, None)?;
    Ok(Html(AnnouncementListTemplate { announcements }))
}

async fn detail_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Html<AnnouncementDetailTemplate>> {
    let conn = state.db.get()?;
    let announcement = announcements::get(&conn, id)?.ok_or(AppError::NotFound)?;
    let images = announcements::images_for(&conn, id)?;

    Ok(Html(AnnouncementDetailTemplate {
        announcement,
        images,
    }))
}

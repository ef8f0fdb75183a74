use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::announcements;
use crate::db::models::Announcement;
use crate::error::AppResult;
use crate::state::AppState;

/// How many announcements the front page shows.
pub const HOME_LIMIT: u32 = 3;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub announcements: Vec<Announcement>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let conn = state.db.get()?;
    let announcements = announcements::list(&conn, Some(HOME_LIMIT))?;

    Ok(Html(HomeTemplate { announcements }).into_response())
}

pub mod admin;
pub mod announcements;
pub mod assets;
pub mod auth;
pub mod home;
pub mod members;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::auth::require_login;
use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(admin::router())
        .merge(members::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(announcements::router())
        .merge(auth::router())
        .merge(protected)
        .nest_service("/static/uploads", ServeDir::new(state.uploads.dir()))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes()))
        .with_state(state)
}

/// A submitted form value, unless it is missing or only whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

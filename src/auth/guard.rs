use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::cookies::{clear_cookie, flash_cookie, get_cookie_value, session_cookie};
use crate::auth::flash::Flash;
use crate::auth::session;
use crate::state::AppState;

/// Redirect to the login page, leaving a "please log in" notice behind.
pub fn login_redirect() -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, flash_cookie(Flash::LoginRequired.code())),
        ],
        "",
    )
        .into_response()
}

/// Forbid browsers and proxies from caching a response.
pub fn apply_no_cache(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Gate for the admin area.
///
/// Requests without a live session are redirected to `/login`. Authenticated
/// requests get their idle expiry pushed forward, the member placed in request
/// extensions for [`crate::extractors::CurrentMember`], and an uncacheable
/// response that refreshes the cookie, or clears it if the session is gone.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.auth.cookie_name.as_str();
    let idle_minutes = state.config.auth.session_minutes;

    let Some(token) = get_cookie_value(request.headers(), cookie_name).map(str::to_string) else {
        return login_redirect();
    };

    let member = match session::find_member(&state.db, &token) {
        Ok(Some(member)) => member,
        Ok(None) => {
            tracing::debug!("Session missing or expired, redirecting to login");
            return login_redirect();
        }
        Err(e) => return e.into_response(),
    };

    if let Err(e) = session::renew_session(&state.db, &token, idle_minutes) {
        return e.into_response();
    }

    request.extensions_mut().insert(member);
    let mut response = next.run(request).await;

    // The handler may have ended the session (a member deleting itself)
    let cookie = match session::is_live(&state.db, &token) {
        Ok(true) => Some(session_cookie(cookie_name, &token, idle_minutes)),
        Ok(false) => Some(clear_cookie(cookie_name)),
        Err(e) => {
            tracing::warn!(error = %e, "Could not re-check session after request");
            None
        }
    };

    let headers = response.headers_mut();
    if let Some(Ok(cookie)) = cookie.map(|c| HeaderValue::from_str(&c)) {
        headers.append(header::SET_COOKIE, cookie);
    }
    apply_no_cache(headers);

    response
}

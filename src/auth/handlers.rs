use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::cookies::{clear_cookie, flash_cookie, get_cookie_value, session_cookie, FLASH_COOKIE};
use crate::auth::flash::Flash;
use crate::auth::session;
use crate::db::members;
use crate::error::{AppError, AppResult};
use crate::routes::home::Html;
use crate::routes::non_blank;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub notice: Option<&'static str>,
    pub error: Option<String>,
    pub account: String,
}

// -- Request types --

#[derive(Deserialize)]
pub struct LoginForm {
    pub account: Option<String>,
    pub password: Option<String>,
}

// -- Handlers --

/// GET /login: render the login form, consuming any pending flash notice
pub async fn login_page(headers: HeaderMap) -> Response {
    let flash = Flash::from_headers(&headers);
    let page = Html(LoginTemplate {
        notice: flash.map(Flash::message),
        error: None,
        account: String::new(),
    });

    match flash {
        Some(_) => (
            AppendHeaders([(header::SET_COOKIE, clear_cookie(FLASH_COOKIE))]),
            page,
        )
            .into_response(),
        None => page.into_response(),
    }
}

/// POST /login: check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let (Some(account), Some(password)) = (
        non_blank(form.account.as_deref()),
        non_blank(form.password.as_deref()),
    ) else {
        return Err(AppError::BadRequest(
            "Account and password are both required".into(),
        ));
    };

    let member = {
        let conn = state.db.get()?;
        members::authenticate(&conn, account, password)?
    };

    let Some(member) = member else {
        tracing::info!(%account, "Rejected login");
        let page = Html(LoginTemplate {
            notice: None,
            error: Some("Incorrect account or password".to_string()),
            account: account.to_string(),
        });
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    let idle_minutes = state.config.auth.session_minutes;
    let token = session::create_session(&state.db, member.id, idle_minutes)?;
    tracing::info!(member_id = member.id, "Member logged in");

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/admin_welcome")],
        AppendHeaders([
            (
                header::SET_COOKIE,
                session_cookie(&state.config.auth.cookie_name, &token, idle_minutes),
            ),
            (header::SET_COOKIE, clear_cookie(FLASH_COOKIE)),
        ]),
        "",
    )
        .into_response())
}

/// GET /logout: drop the session and return to the login page
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_name = &state.config.auth.cookie_name;

    if let Some(token) = get_cookie_value(&headers, cookie_name) {
        if let Err(e) = session::delete_session(&state.db, token) {
            tracing::error!(error = %e, "Failed to delete session on logout");
        }
    }

    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/login")],
        AppendHeaders([
            (header::SET_COOKIE, clear_cookie(cookie_name)),
            (header::SET_COOKIE, flash_cookie(Flash::LoggedOut.code())),
        ]),
        "",
    )
        .into_response()
}

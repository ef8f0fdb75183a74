use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::members;
use crate::db::models::Member;
use crate::db::with_conn;
use crate::error::{log_write_failure, AppError, AppResult};
use crate::extractors::CurrentMember;
use crate::routes::home::Html;
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/admin_welcome.html")]
pub struct WelcomeTemplate {
    pub username: String,
    pub current_id: i64,
    pub members: Vec<Member>,
}

#[derive(Template)]
#[template(path = "pages/edit_profile.html")]
pub struct EditProfileTemplate {
    pub member: Member,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    pub account: Option<String>,
    pub password: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin_welcome", get(welcome))
        .route("/edit_profile/{iid}", get(edit_profile_form).post(edit_profile))
        .route("/delete/{iid}", get(delete_member))
}

async fn welcome(
    State(state): State<AppState>,
    member: CurrentMember,
) -> AppResult<Html<WelcomeTemplate>> {
    let members = with_conn(&state.db, members::list)?;

    Ok(Html(WelcomeTemplate {
        username: member.username,
        current_id: member.id,
        members,
    }))
}

async fn edit_profile_form(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(iid): Path<i64>,
) -> AppResult<Html<EditProfileTemplate>> {
    let member = with_conn(&state.db, |conn| members::get(conn, iid))?.ok_or(AppError::NotFound)?;
    Ok(Html(EditProfileTemplate { member }))
}

/// POST /edit_profile/{iid}: replace a member's account and password.
/// No confirmation of the current password is asked for.
async fn edit_profile(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(iid): Path<i64>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let (Some(account), Some(password)) = (
        non_blank(form.account.as_deref()),
        non_blank(form.password.as_deref()),
    ) else {
        return Err(AppError::BadRequest(
            "Account and password must be changed together".into(),
        ));
    };

    with_conn(&state.db, |conn| members::get(conn, iid))?.ok_or(AppError::NotFound)?;

    if with_conn(&state.db, |conn| members::account_taken_by_other(conn, account, iid))? {
        tracing::info!(member_id = iid, %account, "Rejected profile edit: account in use");
        return Err(AppError::Conflict(
            "That account is already used by another member".into(),
        ));
    }

    let result = with_conn(&state.db, |conn| {
        members::update_credentials(conn, iid, account, password)
    });
    if log_write_failure("update profile", result).is_some() {
        tracing::info!(member_id = iid, "Updated member credentials");
    }

    Ok(Redirect::to("/admin_welcome").into_response())
}

/// GET /delete/{iid}: remove a member. Nothing stops a member deleting itself.
async fn delete_member(
    State(state): State<AppState>,
    member: CurrentMember,
    Path(iid): Path<i64>,
) -> Redirect {
    let result = with_conn(&state.db, |conn| members::delete(conn, iid));
    if let Some(removed) = log_write_failure("delete member", result) {
        if iid == member.id {
            tracing::warn!(member_id = iid, "Member deleted its own account");
        }
        tracing::info!(member_id = iid, removed, "Deleted member");
    }

    Redirect::to("/admin_welcome")
}

mod common;

use axum::http::{header, StatusCode};
use common::{body_text, location, set_cookie_value, set_cookies, spawn_app, SESSION_COOKIE};

const PROTECTED: &[&str] = &[
    "/admin",
    "/admin/create",
    "/admin_announcements/create_announcements",
    "/admin/edit/1",
    "/admin/delete/1",
    "/admin_announcements/delete-image/1/1",
    "/admin_welcome",
    "/edit_profile/1",
    "/delete/1",
];

#[tokio::test]
async fn protected_routes_redirect_anonymous_visitors_to_login() {
    let app = spawn_app();

    for uri in PROTECTED {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login", "{}", uri);
        assert_eq!(
            set_cookie_value(&response, "noticeboard_flash").as_deref(),
            Some("login_required"),
            "{}",
            uri
        );
    }

    // Nothing ran behind the guard
    let members: i64 = app
        .conn()
        .query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
        .unwrap();
    assert_eq!(members, 1);
}

#[tokio::test]
async fn unknown_session_token_is_rejected() {
    let app = spawn_app();
    let response = app
        .get("/admin", Some(&format!("{}=not-a-real-token", SESSION_COOKIE)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn login_page_shows_flash_notice_once() {
    let app = spawn_app();

    let response = app
        .get("/login", Some("noticeboard_flash=login_required"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("noticeboard_flash=;") && c.contains("Max-Age=0")));
    let body = body_text(response).await;
    assert!(body.contains("Please log in to continue."));

    let body = body_text(app.get("/login", None).await).await;
    assert!(!body.contains("Please log in to continue."));
}

#[tokio::test]
async fn seeded_admin_can_log_in() {
    let app = spawn_app();

    let response = app
        .post_form("/login", "account=admin&password=admin", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin_welcome");
    let session = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with(SESSION_COOKIE))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("Path=/"));

    let token = set_cookie_value(&response, SESSION_COOKIE).unwrap();
    let cookie = format!("{}={}", SESSION_COOKIE, token);

    let response = app.get("/admin_welcome", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome, admin"));

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_pages_are_not_cacheable_and_refresh_the_cookie() {
    let app = spawn_app();
    let cookie = app.login_admin().await;

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");

    let refreshed = set_cookie_value(&response, SESSION_COOKIE).unwrap();
    assert_eq!(format!("{}={}", SESSION_COOKIE, refreshed), cookie);
}

#[tokio::test]
async fn public_pages_stay_cacheable() {
    let app = spawn_app();
    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn idle_session_expires() {
    let app = spawn_app();
    let cookie = app.login_admin().await;

    app.conn()
        .execute(
            "UPDATE sessions SET expires_at = datetime('now', '-1 minutes')",
            [],
        )
        .unwrap();

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn activity_slides_the_expiry_forward() {
    let app = spawn_app();
    let cookie = app.login_admin().await;

    app.conn()
        .execute(
            "UPDATE sessions SET expires_at = datetime('now', '+1 minutes')",
            [],
        )
        .unwrap();

    let response = app.get("/admin_welcome", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let renewed: bool = app
        .conn()
        .query_row(
            "SELECT expires_at > datetime('now', '+20 minutes') FROM sessions",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(renewed);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = spawn_app();
    let cookie = app.login_admin().await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", SESSION_COOKIE)) && c.contains("Max-Age=0")));
    assert_eq!(
        set_cookie_value(&response, "noticeboard_flash").as_deref(),
        Some("logged_out")
    );

    let sessions: i64 = app
        .conn()
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(sessions, 0);

    // The old cookie no longer opens anything
    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn logout_without_a_session_still_redirects() {
    let app = spawn_app();
    let response = app.get("/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn wrong_password_rerenders_login() {
    let app = spawn_app();

    let response = app
        .post_form("/login", "account=admin&password=nope", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_value(&response, SESSION_COOKIE).is_none());
    let body = body_text(response).await;
    assert!(body.contains("Incorrect account or password"));
    assert!(body.contains("value=\"admin\""));
}

#[tokio::test]
async fn blank_credentials_are_a_bad_request() {
    let app = spawn_app();

    for form in ["account=admin", "password=admin", "account=&password=", ""] {
        let response = app.post_form("/login", form, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", form);
    }

    let response = app.post_form("/login", "account=admin", None).await;
    let body = body_text(response).await;
    assert!(body.contains("Account and password are both required"));
}

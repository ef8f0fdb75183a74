//! Shared harness: a fresh data directory, database and router per test,
//! driven in-process through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;
use tower::ServiceExt;

use noticeboard::config::Config;
use noticeboard::db;
use noticeboard::routes;
use noticeboard::state::AppState;

pub const SESSION_COOKIE: &str = "noticeboard_session";
const BOUNDARY: &str = "noticeboard-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    /// Field name, filename, contents.
    File(&'a str, &'a str, &'a [u8]),
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _tmp: TempDir,
}

pub fn spawn_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.resolve_paths(tmp.path());

    let pool = db::create_pool(config.db_path()).unwrap();
    db::run_migrations(&pool).unwrap();
    db::seed_default_admin(&pool, &config.admin).unwrap();

    let state = AppState::new(pool, config);
    let router = routes::app(state.clone());
    TestApp {
        state,
        router,
        _tmp: tmp,
    }
}

impl TestApp {
    pub fn conn(&self) -> PooledConnection<SqliteConnectionManager> {
        self.state.db.get().unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(&self, uri: &str, parts: &[Part<'_>], cookie: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return a `Cookie` header value carrying the session.
    pub async fn login(&self, account: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login",
                &format!("account={}&password={}", account, password),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let token = set_cookie_value(&response, SESSION_COOKIE).expect("session cookie");
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub async fn login_admin(&self) -> String {
        self.login("admin", "admin").await
    }

    /// Create an announcement through the admin form and return its id.
    pub async fn create_announcement(&self, cookie: &str, parts: &[Part<'_>]) -> i64 {
        let response = self.post_multipart("/admin/create", parts, cookie).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");
        self.conn()
            .query_row("SELECT MAX(id) FROM announcements", [], |row| row.get(0))
            .unwrap()
    }

    pub fn upload_path(&self, filename: &str) -> std::path::PathBuf {
        self.state.uploads.dir().join(filename)
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Every `Set-Cookie` header on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The value a response assigns to cookie `name`, if it sets one.
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?.to_string();
        pair.strip_prefix(&prefix).map(str::to_string)
    })
}

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::auth::guard::login_redirect;

/// The member behind the current admin session.
#[derive(Debug, Clone)]
pub struct CurrentMember {
    pub id: i64,
    pub username: String,
}

/// Extractor for routes behind [`crate::auth::guard::require_login`].
/// Redirects to the login page when the gate did not run or found no session.
impl<S> FromRequestParts<S> for CurrentMember
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentMember>()
            .cloned()
            .ok_or_else(login_redirect)
    }
}

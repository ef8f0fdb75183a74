//! One-shot notices carried across a redirect in a short-lived cookie.
//!
//! Only a fixed code travels in the cookie; the text shown to the user comes
//! from [`Flash::message`].

use axum::http::HeaderMap;

use crate::auth::cookies::{get_cookie_value, FLASH_COOKIE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoginRequired,
    LoggedOut,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::LoginRequired => "login_required",
            Flash::LoggedOut => "logged_out",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "login_required" => Some(Flash::LoginRequired),
            "logged_out" => Some(Flash::LoggedOut),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::LoginRequired => "Please log in to continue.",
            Flash::LoggedOut => "You have been logged out.",
        }
    }

    /// The pending notice on an incoming request, if any.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        get_cookie_value(headers, FLASH_COOKIE).and_then(Self::from_code)
    }
}

//! Session cookie handling.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use quizgrade_core::session::SessionId;

pub(crate) const SESSION_COOKIE: &str = "quizgrade_session";

/// Session id carried by the request, if any parses.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

pub(crate) fn set_cookie_value(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Attach a `Set-Cookie` for `id` when the session was just minted.
pub(crate) fn with_session(id: SessionId, minted: bool, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if minted {
        if let Ok(value) = HeaderValue::from_str(&set_cookie_value(id)) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

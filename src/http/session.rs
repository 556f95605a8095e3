//! Session cookies and the authenticated-user extractor

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::services::{accounts, ServiceError};

use super::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "food_tracker_session";

/// Find a cookie by name across all `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value that stores `token` for `max_age_secs`
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// The user behind the request's session cookie. Handlers that take this
/// reject unauthenticated requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE)
            .ok_or_else(|| ServiceError::Unauthorized("Login required".to_string()))?;

        let user_id = accounts::authenticate(&state.database, token)?;
        Ok(CurrentUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=ru"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("food_tracker_session=abc123"),
        );

        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(&headers, "lang"), Some("ru"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("tok", 60),
            "food_tracker_session=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}

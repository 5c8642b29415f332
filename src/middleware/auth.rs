// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling.
//!
//! The session is the GitHub access token itself, kept by the browser in an
//! HTTP-only cookie. Nothing is stored server-side.

use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;

/// Name of the cookie carrying the GitHub access token.
pub const SESSION_COOKIE: &str = "github-access-token";

/// GitHub access token taken from the session cookie.
#[derive(Clone)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Middleware that requires a session cookie.
///
/// Only checks presence; GitHub decides whether the token is still valid
/// on the first API call.
pub async fn require_session(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

/// Session cookie for a freshly issued token. No expiry: it lives for the
/// browser session.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

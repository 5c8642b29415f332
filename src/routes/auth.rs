// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{session_cookie, SessionToken};
use crate::models::GitHubUser;
use crate::services::GitHubError;
use crate::AppState;

/// Public routes: login redirect and OAuth callback.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", get(auth_start))
        .route("/api/auth/github", get(auth_callback))
}

/// Routes that need the session cookie.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth", get(current_user))
        .route("/api/auth/", get(current_user))
}

/// Start OAuth flow - redirect to GitHub authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Redirect {
    tracing::info!(
        client_id = %state.config.github_client_id,
        "Starting OAuth flow, redirecting to GitHub"
    );
    Redirect::temporary(&state.oauth_service.authorize_url())
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code for a token and store it in the session cookie.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let frontend_url = &state.config.frontend_url;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from GitHub");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok((jar, Redirect::to(&redirect)));
    }

    let code = params
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for access token");

    let token = state
        .oauth_service
        .exchange_code_for_token(&code)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::info!("OAuth successful, session cookie issued");

    let jar = jar.add(session_cookie(token, state.config.secure_cookies()));
    Ok((jar, Redirect::to(frontend_url)))
}

/// Current GitHub user for the session token.
async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<GitHubUser>> {
    let user = state
        .user_service
        .get_authenticated_user(token.as_str())
        .await
        .map_err(|e| match e {
            GitHubError::Unauthorized => AppError::Unauthorized,
            other => AppError::GitHub(other),
        })?;

    Ok(Json(user))
}

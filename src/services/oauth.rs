// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth code exchange.

use crate::config::Config;
use crate::services::GitHubError;

/// Scope needed to create and write the private backup repository.
const OAUTH_SCOPE: &str = "repo";

/// Exchanges OAuth authorization codes for GitHub access tokens.
#[derive(Clone)]
pub struct OAuthService {
    http: reqwest::Client,
    oauth_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: Option<String>,
}

impl OAuthService {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            oauth_url: config.github_oauth_url.clone(),
            client_id: config.github_client_id.clone(),
            client_secret: config.github_client_secret.clone(),
            redirect_uri: config.github_redirect_uri.clone(),
        }
    }

    /// GitHub authorization page the login route redirects to.
    pub fn authorize_url(&self) -> String {
        let mut url = format!(
            "{}/login/oauth/authorize?client_id={}&scope={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            OAUTH_SCOPE
        );
        if let Some(redirect_uri) = &self.redirect_uri {
            url.push_str("&redirect_uri=");
            url.push_str(&urlencoding::encode(redirect_uri));
        }
        url
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Returns `Ok(None)` when GitHub answers without an `access_token`
    /// (expired or already used codes come back as HTTP 200 with an `error`).
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Option<String>, GitHubError> {
        let url = format!("{}/login/oauth/access_token", self.oauth_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "GitHub token exchange request failed");
                GitHubError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "GitHub token exchange failed");
            return Err(GitHubError::Status { status, body });
        }

        let token = parse_token_response(&body);
        if token.is_none() {
            let reason = form_field(&body, "error").unwrap_or_else(|| "missing access_token".into());
            tracing::warn!(error = %reason, "GitHub issued no access token");
        }
        Ok(token)
    }
}

/// Pull `access_token` out of the URL-encoded token endpoint response.
fn parse_token_response(body: &str) -> Option<String> {
    form_field(body, "access_token").filter(|token| !token.is_empty())
}

fn form_field(body: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

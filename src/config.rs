// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and carried in `AppState`; nothing reads the
//! environment after that.

use std::env;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_OAUTH_URL: &str = "https://github.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub OAuth app client ID (public)
    pub github_client_id: String,
    /// GitHub OAuth app client secret
    pub github_client_secret: String,
    /// Callback URL registered with the OAuth app, if it should be sent explicitly
    pub github_redirect_uri: Option<String>,
    /// Frontend origin: the only CORS origin and the post-login redirect target
    pub frontend_url: String,
    /// Base URL of the GitHub REST API
    pub github_api_url: String,
    /// Base URL of GitHub's OAuth endpoints
    pub github_oauth_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            github_client_id: env::var("GITHUB_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_ID"))?,
            github_client_secret: env::var("GITHUB_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_SECRET"))?,
            github_redirect_uri: env::var("GITHUB_REDIRECT_URI")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            frontend_url: trim_base(
                env::var("FRONTEND_URL").unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            ),
            github_api_url: trim_base(
                env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string()),
            ),
            github_oauth_url: trim_base(
                env::var("GITHUB_OAUTH_URL")
                    .unwrap_or_else(|_| DEFAULT_GITHUB_OAUTH_URL.to_string()),
            ),
            port: parse_port(env::var("PORT").ok().as_deref())?,
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            github_client_id: "test_client_id".to_string(),
            github_client_secret: "test_client_secret".to_string(),
            github_redirect_uri: None,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_oauth_url: DEFAULT_GITHUB_OAUTH_URL.to_string(),
            port: 8080,
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Strip a trailing slash so paths can be appended with `format!`.
fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(8080),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT", value.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub REST API client.
//!
//! `GitHubClientFactory` holds the shared connection pool; every request
//! gets its own `GitHubClient` bound to the caller's bearer token.

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};

const USER_AGENT: &str = concat!("zettel-sync/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Classified failure of a GitHub API call.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub rejected the access token")]
    Unauthorized,

    #[error("GitHub resource not found")]
    NotFound,

    #[error("GitHub refused the request: {0}")]
    Unprocessable(String),

    #[error("GitHub returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

impl GitHubError {
    /// Collapse `NotFound` into `Ok(None)` so callers can tell absence from failure.
    pub fn into_absent<T>(result: Result<T, GitHubError>) -> Result<Option<T>, GitHubError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(GitHubError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Builds token-bound GitHub clients over one shared HTTP pool.
#[derive(Clone)]
pub struct GitHubClientFactory {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClientFactory {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    /// Client authenticated with `token`. The token is not validated here.
    pub fn with_token(&self, token: &str) -> GitHubClient {
        self.client(Some(token.to_string()))
    }

    /// `None` builds a client that sends no credentials.
    fn client(&self, token: Option<String>) -> GitHubClient {
        GitHubClient {
            http: self.http.clone(),
            api_url: self.api_url.clone(),
            token,
        }
    }
}

/// GitHub REST client bound to a single bearer token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl GitHubClient {
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Self::check_response_json(response).await
    }

    /// Raw file body from the contents API. Works for files above the 1 MB
    /// limit of the JSON representation.
    pub async fn get_raw(&self, path: &str) -> Result<String, GitHubError> {
        let response = self
            .request_as(reqwest::Method::GET, path, RAW_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, body));
        }
        Ok(response.text().await?)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitHubError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::check_response_json(response).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitHubError> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await?;
        Self::check_response_json(response).await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.request_as(method, path, JSON_MEDIA_TYPE)
    }

    fn request_as(
        &self,
        method: reqwest::Method,
        path: &str,
        accept: &'static str,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check_response_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

fn classify(status: StatusCode, body: String) -> GitHubError {
    match status {
        StatusCode::UNAUTHORIZED => GitHubError::Unauthorized,
        StatusCode::NOT_FOUND => GitHubError::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => GitHubError::Unprocessable(body),
        _ => GitHubError::Status { status, body },
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated user lookup.

use crate::models::GitHubUser;
use crate::services::{GitHubClientFactory, GitHubError};

/// Resolves the GitHub user behind an access token.
#[derive(Clone)]
pub struct UserService {
    github: GitHubClientFactory,
}

impl UserService {
    pub fn new(github: GitHubClientFactory) -> Self {
        Self { github }
    }

    /// Fetch the profile of the token's owner. Never cached.
    pub async fn get_authenticated_user(&self, token: &str) -> Result<GitHubUser, GitHubError> {
        let user: GitHubUser = self
            .github
            .with_token(token)
            .get_json("/user")
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to resolve authenticated GitHub user");
                e
            })?;

        tracing::debug!(login = %user.login, "Resolved GitHub user");
        Ok(user)
    }
}

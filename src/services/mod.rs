// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - GitHub-facing business logic.

pub mod backup;
pub mod github;
pub mod oauth;
pub mod user;

pub use backup::{BackupService, Provisioned};
pub use github::{GitHubClient, GitHubClientFactory, GitHubError};
pub use oauth::OAuthService;
pub use user::UserService;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Zettel-Sync: GitHub-backed notes backup for the Zettel web client
//!
//! This crate provides the backend-for-frontend that signs users in with
//! GitHub OAuth and keeps their notes backup in a private GitHub repository.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{BackupService, GitHubClientFactory, OAuthService, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub oauth_service: OAuthService,
    pub user_service: UserService,
    pub backup_service: BackupService,
}

impl AppState {
    /// Wire up all services over one shared HTTP connection pool.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let github = GitHubClientFactory::new(http.clone(), config.github_api_url.clone());
        let user_service = UserService::new(github.clone());
        let backup_service = BackupService::new(github, user_service.clone());
        let oauth_service = OAuthService::new(http, &config);

        Self {
            config,
            oauth_service,
            user_service,
            backup_service,
        }
    }
}

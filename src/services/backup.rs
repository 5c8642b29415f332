// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backup storage in the user's private `zettel-backup` repository.
//!
//! Handles:
//! - Reading `backup.json` through the contents API
//! - Provisioning the repository and seeding an empty document on first use
//!
//! Provisioning is create-if-absent. Two first requests racing for the same
//! user both try to create the repository; GitHub answers the loser with 422,
//! which counts as "already exists".

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{encode_base64_text, BackupDocument, FileContent, GitHubUser};
use crate::services::{GitHubClient, GitHubClientFactory, GitHubError, UserService};

/// Repository holding each user's backup.
pub const BACKUP_REPO: &str = "zettel-backup";
/// File inside [`BACKUP_REPO`] holding the backup document.
pub const BACKUP_PATH: &str = "backup.json";
/// Content written when a backup is provisioned.
pub const SEED_CONTENT: &str = "[]";

const SEED_COMMIT_MESSAGE: &str = "🚀 first commit";

/// Outcome of [`BackupService::ensure_backup`].
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioned {
    /// Decoded text of `backup.json`
    pub content: String,
    /// Whether the repository had to be created
    pub created_repo: bool,
    /// Whether `backup.json` had to be seeded
    pub seeded_file: bool,
}

#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    private: bool,
}

#[derive(Serialize)]
struct Committer<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<Committer<'a>>,
}

/// Only the fields we check from repository and commit responses.
#[derive(Deserialize)]
struct RepoSummary {
    full_name: String,
}

#[derive(Deserialize)]
struct PutContentResponse {
    content: Option<FileContent>,
}

/// Reads and provisions backup documents.
#[derive(Clone)]
pub struct BackupService {
    github: GitHubClientFactory,
    users: UserService,
}

impl BackupService {
    pub fn new(github: GitHubClientFactory, users: UserService) -> Self {
        Self { github, users }
    }

    /// Fetch the raw `backup.json` contents object.
    ///
    /// `Ok(None)` means the repository or the file does not exist.
    pub async fn fetch_backup_file(&self, token: &str) -> Result<Option<FileContent>, AppError> {
        let user = self.users.get_authenticated_user(token).await?;
        let client = self.github.with_token(token);
        Ok(fetch_file(&client, &user.login).await?)
    }

    /// Decoded `backup.json` text, if a backup exists.
    pub async fn read_backup(&self, token: &str) -> Result<Option<String>, AppError> {
        let user = self.users.get_authenticated_user(token).await?;
        let client = self.github.with_token(token);

        match fetch_file(&client, &user.login).await? {
            Some(file) => Ok(Some(file_text(&client, &user.login, &file).await?)),
            None => Ok(None),
        }
    }

    /// Parsed backup document, if a backup exists.
    pub async fn read_document(&self, token: &str) -> Result<Option<BackupDocument>, AppError> {
        match self.read_backup(token).await? {
            Some(text) => Ok(Some(BackupDocument::parse(&text)?)),
            None => Ok(None),
        }
    }

    /// Make sure the backup repository and `backup.json` exist, then return
    /// the document text.
    ///
    /// Only a 404 leads to creation; any other upstream failure is returned.
    pub async fn ensure_backup(&self, token: &str) -> Result<Provisioned, AppError> {
        let user = self.users.get_authenticated_user(token).await?;
        let client = self.github.with_token(token);

        let created_repo = ensure_repo(&client, &user.login).await?;

        if let Some(file) = fetch_file(&client, &user.login).await? {
            return Ok(Provisioned {
                content: file_text(&client, &user.login, &file).await?,
                created_repo,
                seeded_file: false,
            });
        }

        match seed_file(&client, &user).await {
            Ok(()) => Ok(Provisioned {
                content: SEED_CONTENT.to_string(),
                created_repo,
                seeded_file: true,
            }),
            // Someone else wrote the file between our read and our write
            Err(GitHubError::Unprocessable(body)) => {
                tracing::info!(login = %user.login, body = %body, "Backup file already seeded, re-reading");
                let file = fetch_file(&client, &user.login).await?.ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!(
                        "{} rejected as existing but could not be read back",
                        BACKUP_PATH
                    ))
                })?;
                Ok(Provisioned {
                    content: file_text(&client, &user.login, &file).await?,
                    created_repo,
                    seeded_file: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Text of a fetched file, going through the raw media type for large files.
async fn file_text(
    client: &GitHubClient,
    owner: &str,
    file: &FileContent,
) -> Result<String, AppError> {
    if file.is_truncated() {
        tracing::info!(login = %owner, "Backup file too large for JSON contents, fetching raw");
        return Ok(client.get_raw(&contents_path(owner)).await?);
    }
    Ok(file.decode_text()?)
}

fn repo_path(owner: &str) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(owner),
        BACKUP_REPO
    )
}

fn contents_path(owner: &str) -> String {
    format!("{}/contents/{}", repo_path(owner), BACKUP_PATH)
}

async fn fetch_file(client: &GitHubClient, owner: &str) -> Result<Option<FileContent>, GitHubError> {
    let file = GitHubError::into_absent(client.get_json(&contents_path(owner)).await)?;
    if file.is_none() {
        tracing::info!(login = %owner, "No backup file found");
    }
    Ok(file)
}

/// Returns `true` when this call created the repository.
async fn ensure_repo(client: &GitHubClient, owner: &str) -> Result<bool, GitHubError> {
    let existing: Option<RepoSummary> =
        GitHubError::into_absent(client.get_json(&repo_path(owner)).await)?;
    if existing.is_some() {
        return Ok(false);
    }

    let request = CreateRepoRequest {
        name: BACKUP_REPO,
        private: true,
    };
    match client
        .post_json::<_, RepoSummary>("/user/repos", &request)
        .await
    {
        Ok(repo) => {
            tracing::info!(repo = %repo.full_name, "Created backup repository");
            Ok(true)
        }
        Err(GitHubError::Unprocessable(body)) => {
            tracing::info!(login = %owner, body = %body, "Backup repository already exists");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn seed_file(client: &GitHubClient, user: &GitHubUser) -> Result<(), GitHubError> {
    let request = PutContentRequest {
        message: SEED_COMMIT_MESSAGE,
        content: encode_base64_text(SEED_CONTENT),
        // GitHub requires an email when a committer is given
        committer: user.email.as_deref().map(|email| Committer {
            name: &user.login,
            email,
        }),
    };

    let response: PutContentResponse = client.put_json(&contents_path(&user.login), &request).await?;
    tracing::info!(
        login = %user.login,
        path = response.content.as_ref().map(|c| c.path.as_str()).unwrap_or(BACKUP_PATH),
        "Seeded backup file"
    );
    Ok(())
}

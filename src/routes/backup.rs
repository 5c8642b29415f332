// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backup routes for authenticated users.
//!
//! The session middleware is applied in routes/mod.rs.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::SessionToken;
use crate::models::{Category, Note};
use crate::AppState;

const NO_BACKUP: &str = "No backup data found";
const NO_NOTES: &str = "No notes found for this category";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/check/zettel-repo", get(check_zettel_repo))
        .route("/api/backup", get(get_backup))
        .route("/api/backup/categories", get(get_categories))
        .route("/api/backup/{category_id}", get(get_notes_by_category))
}

/// Decoded `backup.json` text.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackupContentResponse {
    #[serde(rename = "backupContent")]
    pub backup_content: String,
}

/// Ensure the backup repository exists (creating and seeding it on first
/// use) and return the backup.
async fn check_zettel_repo(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<BackupContentResponse>> {
    let provisioned = state.backup_service.ensure_backup(token.as_str()).await?;

    if provisioned.created_repo || provisioned.seeded_file {
        tracing::info!(
            created_repo = provisioned.created_repo,
            seeded_file = provisioned.seeded_file,
            "Backup provisioned"
        );
    }

    Ok(Json(BackupContentResponse {
        backup_content: provisioned.content,
    }))
}

async fn get_backup(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<BackupContentResponse>> {
    let content = state
        .backup_service
        .read_backup(token.as_str())
        .await?
        .ok_or_else(|| AppError::not_found(NO_BACKUP))?;

    Ok(Json(BackupContentResponse {
        backup_content: content,
    }))
}

/// Notes of one category; `all_notes` returns every note.
async fn get_notes_by_category(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Note>>> {
    let document = state
        .backup_service
        .read_document(token.as_str())
        .await?
        .ok_or_else(|| AppError::no_notes(NO_BACKUP))?;

    let notes = document.notes_in(&category_id);
    if notes.is_empty() {
        tracing::debug!(category = %category_id, "No notes in category");
        return Err(AppError::no_notes(NO_NOTES));
    }

    Ok(Json(notes))
}

async fn get_categories(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<Vec<Category>>> {
    let document = state
        .backup_service
        .read_document(token.as_str())
        .await?
        .ok_or_else(|| AppError::not_found(NO_BACKUP))?;

    Ok(Json(document.categories))
}

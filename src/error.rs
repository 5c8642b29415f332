// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{DecodeError, Note};
use crate::services::GitHubError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User is not logged in!")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing backup data; `notes` is set for the notes endpoint so the
    /// client always receives an array.
    #[error("{message}")]
    NotFound {
        message: String,
        notes: Option<Vec<Note>>,
    },

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Backup data is malformed: {0}")]
    MalformedBackup(#[from] DecodeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            notes: None,
        }
    }

    /// 404 carrying an empty `notes` array.
    pub fn no_notes(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            notes: Some(Vec::new()),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<Note>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error, notes) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            AppError::NotFound { notes, .. } => (StatusCode::NOT_FOUND, "not_found", notes),
            AppError::GitHub(GitHubError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", None)
            }
            AppError::GitHub(GitHubError::NotFound) => {
                (StatusCode::NOT_FOUND, "not_found", None)
            }
            AppError::GitHub(err) => {
                tracing::error!(error = %err, "GitHub API error");
                (StatusCode::BAD_GATEWAY, "github_error", None)
            }
            AppError::MalformedBackup(err) => {
                tracing::error!(error = %err, "Stored backup could not be decoded");
                (StatusCode::INTERNAL_SERVER_ERROR, "malformed_backup", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                )
            }
        };

        // Upstream and internal details stay in the logs
        let message = match status {
            StatusCode::BAD_GATEWAY => "GitHub request failed".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR if error == "internal_error" => {
                "Internal server error".to_string()
            }
            _ => message,
        };

        let body = ErrorResponse {
            error,
            message,
            notes,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

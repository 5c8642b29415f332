// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod backup;
pub mod user;

pub use backup::{
    encode_base64_text, BackupDocument, Category, DecodeError, FileContent, Note, ALL_NOTES,
};
pub use user::GitHubUser;

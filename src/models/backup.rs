// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backup document stored as `backup.json` in the user's backup repository.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Category id that selects every note.
pub const ALL_NOTES: &str = "all_notes";

/// A single note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Note {
    pub id: String,
    pub note_heading: String,
    pub content: String,
    /// Id of the owning category
    pub category: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// A note category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Category {
    pub id: String,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "colorCode")]
    pub color_code: String,
}

/// The whole backup: categories plus notes.
///
/// Reading is lenient about shape. `categories` may be a single object
/// instead of an array, and a bare JSON array (including the `[]` written
/// at provisioning time) is read as a list of notes with no categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackupDocument {
    pub categories: Vec<Category>,
    pub notes: Vec<Note>,
}

impl BackupDocument {
    /// Parse the decoded text of `backup.json`.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))
    }

    /// Notes belonging to `category_id`, or every note for [`ALL_NOTES`].
    pub fn notes_in(&self, category_id: &str) -> Vec<Note> {
        if category_id == ALL_NOTES {
            return self.notes.clone();
        }
        self.notes
            .iter()
            .filter(|note| note.category == category_id)
            .cloned()
            .collect()
    }
}

impl<'de> Deserialize<'de> for BackupDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Stored {
            #[serde(default, deserialize_with = "one_or_many")]
            categories: Vec<Category>,
            #[serde(default)]
            notes: Option<Vec<Note>>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Notes(Vec<Note>),
            Document(Stored),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Notes(notes) => Self {
                categories: Vec::new(),
                notes,
            },
            Shape::Document(stored) => Self {
                categories: stored.categories,
                notes: stored.notes.unwrap_or_default(),
            },
        })
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Category>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Category>),
        One(Category),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(categories)) => categories,
        Some(OneOrMany::One(category)) => vec![category],
        None => Vec::new(),
    })
}

/// File object from the GitHub contents API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Base64 payload, wrapped with newlines by GitHub
    #[serde(default)]
    pub content: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

impl FileContent {
    /// GitHub omits the payload of files over 1 MB (`encoding: "none"`);
    /// those must be fetched through the raw media type.
    pub fn is_truncated(&self) -> bool {
        self.encoding == "none"
    }

    /// Decode the payload into UTF-8 text.
    pub fn decode_text(&self) -> Result<String, DecodeError> {
        if self.encoding != "base64" {
            return Err(DecodeError::Encoding(self.encoding.clone()));
        }
        decode_base64_text(&self.content)
    }
}

/// Encode text the way the contents API expects it on upload.
pub fn encode_base64_text(text: &str) -> String {
    BASE64.encode(text.as_bytes())
}

/// Decode base64 text, ignoring the line breaks GitHub inserts.
fn decode_base64_text(payload: &str) -> Result<String, DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DecodeError::Utf8(e.to_string()))
}

/// Stored backup could not be turned into a document.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported content encoding: {0}")]
    Encoding(String),

    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("payload is not UTF-8: {0}")]
    Utf8(String),

    #[error("invalid backup JSON: {0}")]
    Json(String),
}

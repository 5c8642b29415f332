//! GitHub user profile as returned by `GET /user`.

use serde::{Deserialize, Serialize};

/// Read-only projection of GitHub's authenticated user object.
///
/// Fetched fresh per request and relayed to the client unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub gravatar_id: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub repos_url: String,
    #[serde(default, rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub site_admin: bool,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    /// Public email; `None` when the user keeps it private
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub public_gists: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    /// ISO 8601
    pub created_at: Option<String>,
    /// ISO 8601
    pub updated_at: Option<String>,
}

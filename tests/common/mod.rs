// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: an in-process fake of the GitHub endpoints the
//! gateway talks to, and helpers to drive the router.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get as route_get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use zettel_sync::config::Config;
use zettel_sync::routes::create_router;
use zettel_sync::AppState;

/// Recorded `PUT .../contents/...` call.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub owner: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct FakeState {
    /// access token -> user object
    users: HashMap<String, Value>,
    /// OAuth code -> access token
    codes: HashMap<String, String>,
    /// owners with a backup repository
    repos: HashSet<String>,
    /// (owner, path) -> base64 content
    files: HashMap<(String, String), String>,
    pub repo_creations: usize,
    pub file_writes: Vec<FileWrite>,
    /// Status returned by every `GET /repos/...` call when set
    pub repo_read_failure: Option<StatusCode>,
    /// `GET /repos/{owner}/{repo}` answers 404 even for existing repos
    pub stale_repo_reads: bool,
    /// Number of upcoming contents reads that answer 404 regardless of state
    pub stale_file_reads: usize,
    /// Files above the contents API size limit
    large: HashSet<(String, String)>,
}

/// Fake GitHub API + OAuth server bound to a random local port.
#[derive(Clone)]
pub struct FakeGitHub {
    pub url: String,
    pub state: Arc<Mutex<FakeState>>,
}

#[allow(dead_code)]
impl FakeGitHub {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/login/oauth/access_token", post(access_token))
            .route("/user", route_get(user))
            .route("/user/repos", post(create_repo))
            .route("/repos/{owner}/{repo}", route_get(get_repo))
            .route(
                "/repos/{owner}/{repo}/contents/{path}",
                route_get(get_contents).put(put_contents),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake GitHub");
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, state }
    }

    /// Register a user reachable with `token`.
    pub fn add_user(&self, token: &str, login: &str, email: Option<&str>) {
        let user = json!({
            "login": login,
            "id": 4242,
            "node_id": "MDQ6VXNlcjQyNDI=",
            "avatar_url": format!("https://avatars.example.com/{login}"),
            "html_url": format!("https://github.com/{login}"),
            "type": "User",
            "site_admin": false,
            "name": "Test User",
            "email": email,
            "public_repos": 3,
            "created_at": "2020-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        });
        self.state
            .lock()
            .unwrap()
            .users
            .insert(token.to_string(), user);
    }

    /// Make `code` exchangeable for `token`.
    pub fn add_code(&self, code: &str, token: &str) {
        self.state
            .lock()
            .unwrap()
            .codes
            .insert(code.to_string(), token.to_string());
    }

    /// Create the backup repository with `backup.json` holding `text`.
    pub fn put_backup(&self, owner: &str, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.repos.insert(owner.to_string());
        state.files.insert(
            (owner.to_string(), "backup.json".to_string()),
            BASE64.encode(text),
        );
    }

    /// Create the backup repository without any file.
    pub fn put_empty_repo(&self, owner: &str) {
        self.state.lock().unwrap().repos.insert(owner.to_string());
    }

    pub fn has_repo(&self, owner: &str) -> bool {
        self.state.lock().unwrap().repos.contains(owner)
    }

    pub fn repo_creations(&self) -> usize {
        self.state.lock().unwrap().repo_creations
    }

    pub fn file_writes(&self) -> Vec<FileWrite> {
        self.state.lock().unwrap().file_writes.clone()
    }

    pub fn fail_repo_reads(&self, status: StatusCode) {
        self.state.lock().unwrap().repo_read_failure = Some(status);
    }

    /// Like [`put_backup`](Self::put_backup), but the file is served the way
    /// GitHub serves files over 1 MB: no inline content unless fetched raw.
    pub fn put_large_backup(&self, owner: &str, text: &str) {
        self.put_backup(owner, text);
        self.state
            .lock()
            .unwrap()
            .large
            .insert((owner.to_string(), "backup.json".to_string()));
    }

    /// Repository lookups miss, so creation is attempted and conflicts.
    pub fn hide_repo_from_reads(&self) {
        self.state.lock().unwrap().stale_repo_reads = true;
    }

    /// The next `reads` contents lookups miss even when the file exists.
    pub fn hide_file_from_reads(&self, reads: usize) {
        self.state.lock().unwrap().stale_file_reads = reads;
    }
}

type Shared = State<Arc<Mutex<FakeState>>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn login_for(state: &FakeState, headers: &HeaderMap) -> Option<String> {
    let token = bearer(headers)?;
    state
        .users
        .get(&token)
        .and_then(|u| u["login"].as_str())
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Bad credentials"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
}

/// GitHub wraps base64 content at 60 columns.
fn wrap(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| format!("{}\n", String::from_utf8_lossy(chunk)))
        .collect()
}

async fn access_token(State(state): Shared, Form(form): Form<HashMap<String, String>>) -> String {
    let state = state.lock().unwrap();
    let code = form.get("code").cloned().unwrap_or_default();
    let credentials_ok = form.get("client_id").map(String::as_str) == Some("test_client_id")
        && form.get("client_secret").map(String::as_str) == Some("test_client_secret");

    match state.codes.get(&code) {
        Some(token) if credentials_ok => {
            format!("access_token={token}&scope=repo&token_type=bearer")
        }
        _ => "error=bad_verification_code&error_description=The+code+passed+is+incorrect+or+expired."
            .to_string(),
    }
}

async fn user(State(state): Shared, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match bearer(&headers).and_then(|t| state.users.get(&t).cloned()) {
        Some(user) => Json(user).into_response(),
        None => unauthorized(),
    }
}

async fn create_repo(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(login) = login_for(&state, &headers) else {
        return unauthorized();
    };
    assert_eq!(body["name"], "zettel-backup");
    assert_eq!(body["private"], true);

    if state.repos.contains(&login) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Repository creation failed.", "errors": [{"message": "name already exists on this account"}]})),
        )
            .into_response();
    }

    state.repos.insert(login.clone());
    state.repo_creations += 1;
    (
        StatusCode::CREATED,
        Json(json!({"full_name": format!("{login}/zettel-backup"), "private": true})),
    )
        .into_response()
}

async fn get_repo(
    State(state): Shared,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
) -> Response {
    let state = state.lock().unwrap();
    if let Some(status) = state.repo_read_failure {
        return (status, Json(json!({"message": "upstream trouble"}))).into_response();
    }
    if login_for(&state, &headers).is_none() {
        return unauthorized();
    }
    if repo == "zettel-backup" && state.repos.contains(&owner) && !state.stale_repo_reads {
        Json(json!({"full_name": format!("{owner}/{repo}"), "private": true})).into_response()
    } else {
        not_found()
    }
}

async fn get_contents(
    State(state): Shared,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(status) = state.repo_read_failure {
        return (status, Json(json!({"message": "upstream trouble"}))).into_response();
    }
    if login_for(&state, &headers).is_none() {
        return unauthorized();
    }
    if repo != "zettel-backup" || !state.repos.contains(&owner) {
        return not_found();
    }
    if state.stale_file_reads > 0 {
        state.stale_file_reads -= 1;
        return not_found();
    }

    let key = (owner, path.clone());
    let wants_raw = headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        == Some("application/vnd.github.raw");
    match state.files.get(&key) {
        Some(content) if wants_raw => {
            String::from_utf8(BASE64.decode(content).unwrap()).unwrap().into_response()
        }
        Some(_) if state.large.contains(&key) => Json(json!({
            "name": path,
            "path": path,
            "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
            "encoding": "none",
            "content": "",
        }))
        .into_response(),
        Some(content) => Json(json!({
            "name": path,
            "path": path,
            "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
            "encoding": "base64",
            "content": wrap(content),
        }))
        .into_response(),
        None => not_found(),
    }
}

async fn put_contents(
    State(state): Shared,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(login) = login_for(&state, &headers) else {
        return unauthorized();
    };
    if repo != "zettel-backup" || owner != login || !state.repos.contains(&owner) {
        return not_found();
    }

    let key = (owner.clone(), path.clone());
    if state.files.contains_key(&key) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Invalid request.\n\n\"sha\" wasn't supplied."})),
        )
            .into_response();
    }

    let content = body["content"].as_str().unwrap_or_default().to_string();
    state.files.insert(key, content);
    state.file_writes.push(FileWrite {
        owner,
        path: path.clone(),
        body,
    });

    (
        StatusCode::CREATED,
        Json(json!({"content": {"name": path, "path": path, "sha": "95b966ae1c166bd92f8ae7d1c313e738c731dfc3"}})),
    )
        .into_response()
}

/// Router wired to `fake`, plus the shared state.
#[allow(dead_code)]
pub fn create_test_app(fake: &FakeGitHub) -> (Router, Arc<AppState>) {
    create_test_app_with_frontend_url(fake, "http://localhost:3000")
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(
    fake: &FakeGitHub,
    frontend_url: &str,
) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.github_api_url = fake.url.clone();
    config.github_oauth_url = fake.url.clone();
    config.frontend_url = frontend_url.to_string();

    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// GET `uri`, optionally with the session cookie set to `token`.
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header(header::COOKIE, format!("github-access-token={token}"));
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

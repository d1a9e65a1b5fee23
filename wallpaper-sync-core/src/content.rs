//! GitHub contents API client implementing [`ContentFetcher`].
//!
//! `GET {api}/repos/{owner}/{repo}/contents/{path}?ref={branch}` answers with a
//! JSON object carrying base64 `content` for a file, or a JSON array for a
//! directory. Any non-200 answer is treated as [`SyncError::NotFound`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Request};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::RepoConfig;
use crate::contract::{ContentFetcher, EntryKind, RepoEntry};
use crate::error::SyncError;

const USER_AGENT: &str = concat!("wallpaper-sync/", env!("CARGO_PKG_VERSION"));

pub struct GithubFetcher {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
}

impl GithubFetcher {
    pub fn new(config: &RepoConfig) -> Result<Self, SyncError> {
        // GitHub rejects requests without a User-Agent.
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Builds the contents request for `path` at `branch`.
    pub fn contents_request(&self, path: &str, branch: &str) -> Result<Request, SyncError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        );
        Ok(self
            .client
            .get(url)
            .query(&[("ref", branch)])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .build()?)
    }

    async fn get_contents(&self, path: &str, branch: &str) -> Result<Value, SyncError> {
        let request = self.contents_request(path, branch)?;
        let url = request.url().to_string();
        debug!(url = %url, "Requesting repository contents");

        let response = self.client.execute(request).await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to reach content repository");
            SyncError::from(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = %status, url = %url, "Content repository returned error. Response body: {body}");
            return Err(SyncError::NotFound(format!("{path}@{branch}: status {status}")));
        }

        response.json::<Value>().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to parse repository contents JSON");
            SyncError::ParseFailure(e.to_string())
        })
    }

    /// Decoded file text at an explicit branch.
    pub async fn fetch_at(&self, path: &str, branch: &str) -> Result<String, SyncError> {
        let body = self.get_contents(path, branch).await?;
        let text = decode_file_payload(&body).map_err(|e| {
            error!(error = %e, path = path, branch = branch, "Repository answer is not a readable file");
            e
        })?;
        info!(path = path, branch = branch, bytes = text.len(), "Fetched repository file");
        Ok(text)
    }

    /// Directory listing at an explicit branch.
    pub async fn list_dir_at(&self, path: &str, branch: &str) -> Result<Vec<RepoEntry>, SyncError> {
        let body = self.get_contents(path, branch).await?;
        let entries = decode_directory_listing(&body).map_err(|e| {
            error!(error = %e, path = path, branch = branch, "Repository answer is not a directory");
            e
        })?;
        info!(path = path, branch = branch, count = entries.len(), "Listed repository directory");
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl ContentFetcher for GithubFetcher {
    async fn fetch(&self, path: &str) -> Result<String, SyncError> {
        self.fetch_at(path, &self.branch).await
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RepoEntry>, SyncError> {
        self.list_dir_at(path, &self.branch).await
    }
}

/// Extracts and decodes the base64 `content` of a file answer.
pub fn decode_file_payload(body: &Value) -> Result<String, SyncError> {
    if body.is_array() {
        return Err(SyncError::NotFound("path is a directory, not a file".into()));
    }
    let encoded = body
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| SyncError::ParseFailure("missing `content` field".into()))?;

    // The API wraps the base64 payload at 60 columns.
    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| SyncError::ParseFailure(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes).map_err(|e| SyncError::ParseFailure(format!("content is not UTF-8: {e}")))
}

/// Converts a directory answer into entries.
pub fn decode_directory_listing(body: &Value) -> Result<Vec<RepoEntry>, SyncError> {
    let items = body
        .as_array()
        .ok_or_else(|| SyncError::NotFound("path is not a directory".into()))?;

    items
        .iter()
        .map(|item| {
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| SyncError::ParseFailure("directory entry without `name`".into()))?;
            let kind = match item.get("type").and_then(Value::as_str) {
                Some("file") => EntryKind::File,
                Some("dir") => EntryKind::Dir,
                _ => EntryKind::Other,
            };
            Ok(RepoEntry {
                name: name.to_string(),
                path: item
                    .get("path")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string(),
                kind,
                size: item.get("size").and_then(Value::as_u64).unwrap_or(0),
                download_url: item
                    .get("download_url")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

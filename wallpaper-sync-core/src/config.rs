use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::month::MonthKey;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_url() -> String {
    DEFAULT_GITHUB_API.to_string()
}

/// Content-repository coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub owner: String,
    pub repo: String,
    /// Path of the overview document.
    pub path: String,
    /// Directory holding the `YYYY-MM` month directories.
    pub base_path: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl RepoConfig {
    pub fn trace_loaded(&self) {
        info!(
            owner = %self.owner,
            repo = %self.repo,
            branch = %self.branch,
            base_path = %self.base_path,
            "Loaded repository config"
        );
        debug!(?self, "Repository config loaded (full debug)");
    }
}

/// Page-service coordinates plus the mutable rollover fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct SyncState {
    pub base_url: String,
    pub api_token: String,
    #[serde(default)]
    pub main_page_id: Option<i64>,
    #[serde(default)]
    pub archive_page_id: Option<i64>,
    #[serde(default)]
    pub current_year_month: Option<String>,
    /// Local mirror of the month directories, used only for seeding.
    #[serde(default)]
    pub picture_dir: Option<PathBuf>,
}

// Hand-written so the token never reaches the logs.
impl std::fmt::Debug for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncState")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("main_page_id", &self.main_page_id)
            .field("archive_page_id", &self.archive_page_id)
            .field("current_year_month", &self.current_year_month)
            .field("picture_dir", &self.picture_dir)
            .finish()
    }
}

/// The two fields the month roller reads and, on rollover, replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveState {
    pub archive_page_id: i64,
    pub current_year_month: String,
}

impl SyncState {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            main_page_id = ?self.main_page_id,
            archive_page_id = ?self.archive_page_id,
            current_year_month = ?self.current_year_month,
            "Loaded page-service config"
        );
    }

    pub fn main_page_id(&self) -> Result<i64, SyncError> {
        self.main_page_id
            .ok_or_else(|| SyncError::Config("missing required field `main_page_id`".into()))
    }

    pub fn archive(&self) -> Result<ArchiveState, SyncError> {
        match (self.archive_page_id, self.current_year_month.as_ref()) {
            (Some(archive_page_id), Some(month)) => Ok(ArchiveState {
                archive_page_id,
                current_year_month: month.clone(),
            }),
            (None, _) => Err(SyncError::Config(
                "missing required field `archive_page_id`".into(),
            )),
            (_, None) => Err(SyncError::Config(
                "missing required field `current_year_month`".into(),
            )),
        }
    }
}

impl ArchiveState {
    /// The persisted month, if it has the `YYYY-MM` shape.
    pub fn month(&self) -> Option<MonthKey> {
        MonthKey::parse(&self.current_year_month)
    }
}

/// `load_config` module: reads the two YAML configuration documents and writes the
/// month rollover back into the page-service document.
///
/// # Responsibilities
/// - Parse `github_config.yaml` into [`RepoConfig`] and `flarum_config.yaml`
///   into [`SyncState`], with clear diagnostics for unreadable or malformed files
/// - Persist `archive_page_id` and `current_year_month` together on rollover
///   ([`YamlStateFile`]), keeping every other key of the document intact
///
/// # Errors
/// Loading uses `anyhow::Error` for context-rich diagnostics surfaced at the CLI
/// boundary. Persisting implements the core [`StateStore`] trait and so reports
/// [`SyncError`].
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use wallpaper_sync_core::config::{RepoConfig, SyncState};
use wallpaper_sync_core::contract::{MonthRollover, StateStore};
use wallpaper_sync_core::SyncError;

pub const GITHUB_CONFIG_FILE: &str = "github_config.yaml";
pub const FLARUM_CONFIG_FILE: &str = "flarum_config.yaml";

/// Locations of the two configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub github: PathBuf,
    pub flarum: PathBuf,
}

impl ConfigPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            github: dir.join(GITHUB_CONFIG_FILE),
            flarum: dir.join(FLARUM_CONFIG_FILE),
        }
    }
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(parsed) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(parsed)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path))
        }
    }
}

/// Loads the content-repository coordinates.
pub fn load_repo_config<P: AsRef<Path>>(path: P) -> Result<RepoConfig> {
    let config: RepoConfig = load_yaml(path.as_ref())?;
    config.trace_loaded();
    Ok(config)
}

/// Loads the page-service coordinates and the persisted sync state.
pub fn load_sync_state<P: AsRef<Path>>(path: P) -> Result<SyncState> {
    let state: SyncState = load_yaml(path.as_ref())?;
    state.trace_loaded();
    Ok(state)
}

/// Writes rollovers back into `flarum_config.yaml`.
pub struct YamlStateFile {
    path: PathBuf,
}

impl YamlStateFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for YamlStateFile {
    fn persist(&self, rollover: &MonthRollover) -> Result<(), SyncError> {
        let raw = fs::read_to_string(&self.path)?;
        let mut document: Mapping = serde_yaml::from_str(&raw)
            .map_err(|e| SyncError::ParseFailure(format!("{}: {e}", self.path.display())))?;

        document.insert(
            Value::from("archive_page_id"),
            Value::from(rollover.archive_page_id),
        );
        document.insert(
            Value::from("current_year_month"),
            Value::from(rollover.current_year_month.to_string()),
        );
        let serialized = serde_yaml::to_string(&document)
            .map_err(|e| SyncError::ParseFailure(e.to_string()))?;

        // Write beside the target, then rename over it so readers never see half a document.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(serialized.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            error!(error = ?e.error, path = %self.path.display(), "Failed to replace config file");
            SyncError::from(e.error)
        })?;

        info!(
            path = %self.path.display(),
            archive_page_id = rollover.archive_page_id,
            current_year_month = %rollover.current_year_month,
            "Persisted sync state"
        );
        Ok(())
    }
}

//! One-time bulk seeding: one page per `YYYY-MM` month directory.
//!
//! Month directories come either from a local mirror of the content repository
//! ([`scan_local_mirror`]) or from the repository itself ([`scan_remote`]).
//! [`sync_all`] then walks them in ascending order and creates a page for each
//! month that has a document. Every per-directory failure is logged and
//! recorded in the [`SeedReport`]; none of them stops the batch.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use crate::contract::{ContentFetcher, EntryKind, NewPage, PageStore};
use crate::error::SyncError;
use crate::month::{MonthKey, MONTH_DOCUMENT};

/// A directory entry that may hold a month's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDirectory {
    pub name: String,
    /// Full text of the directory's `README.md`: `Ok(None)` when it has none,
    /// `Err` when it exists but could not be read.
    pub document: Result<Option<String>, SyncError>,
}

impl MonthDirectory {
    pub fn new(name: impl Into<String>, document: Option<String>) -> Self {
        Self {
            name: name.into(),
            document: Ok(document),
        }
    }

    pub fn unreadable(name: impl Into<String>, error: SyncError) -> Self {
        Self {
            name: name.into(),
            document: Err(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Look the slug up before creating and skip months that already have a page.
    /// When false every month is created unconditionally and duplicates surface
    /// as per-directory conflicts from the page service.
    pub skip_existing: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidName,
    MissingDocument,
    AlreadySeeded { page_id: i64 },
}

#[derive(Debug)]
pub struct SkippedDirectory {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct CreatedPage {
    pub month: MonthKey,
    pub page_id: i64,
}

#[derive(Debug)]
pub struct FailedMonth {
    pub month: MonthKey,
    pub error: SyncError,
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: Vec<CreatedPage>,
    pub skipped: Vec<SkippedDirectory>,
    pub failed: Vec<FailedMonth>,
}

impl SeedReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// A seed run counts as successful only if it created at least one page.
    pub fn any_created(&self) -> bool {
        !self.created.is_empty()
    }
}

/// Creates a page for every valid month directory, oldest first.
pub async fn sync_all<S>(store: &S, mut directories: Vec<MonthDirectory>, options: &SeedOptions) -> SeedReport
where
    S: PageStore + Sync,
{
    info!(directories = directories.len(), skip_existing = options.skip_existing, "[SEED] Starting bulk seed");
    directories.sort_by(|a, b| a.name.cmp(&b.name));

    let mut report = SeedReport::default();
    for dir in directories {
        let Some(month) = MonthKey::parse(&dir.name) else {
            warn!(directory = %dir.name, "[SEED] Skipping directory: name is not YYYY-MM");
            report.skipped.push(SkippedDirectory {
                name: dir.name,
                reason: SkipReason::InvalidName,
            });
            continue;
        };
        let content = match dir.document {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!(directory = %dir.name, document = MONTH_DOCUMENT, "[SEED] Skipping directory: document not found");
                report.skipped.push(SkippedDirectory {
                    name: dir.name,
                    reason: SkipReason::MissingDocument,
                });
                continue;
            }
            Err(e) => {
                error!(month = %month, error = %e, "[SEED][ERROR] Month document could not be read");
                report.failed.push(FailedMonth { month, error: e });
                continue;
            }
        };

        let slug = month.slug();
        if options.skip_existing {
            match store.get_by_slug(&slug).await {
                Ok(Some(existing)) => {
                    warn!(month = %month, slug = %slug, page_id = existing.id, "[SEED] Skipping month: page already exists");
                    report.skipped.push(SkippedDirectory {
                        name: dir.name,
                        reason: SkipReason::AlreadySeeded { page_id: existing.id },
                    });
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    error!(month = %month, slug = %slug, error = %e, "[SEED][ERROR] Existence check failed");
                    report.failed.push(FailedMonth { month, error: e });
                    continue;
                }
            }
        }

        let page = NewPage::for_month(&month, content);
        info!(title = %page.title, slug = %slug, "[SEED] Creating page");
        match store.create(page).await {
            Ok(created) => {
                info!(month = %month, page_id = created.id, "[SEED] Page created");
                report.created.push(CreatedPage {
                    month,
                    page_id: created.id,
                });
            }
            Err(e) => {
                error!(month = %month, slug = %slug, error = %e, "[SEED][ERROR] Page creation failed");
                report.failed.push(FailedMonth { month, error: e });
            }
        }
    }

    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "[SEED] Bulk seed finished: created {} pages",
        report.created.len()
    );
    report
}

/// Reads the entries of a local mirror. Month-shaped entries get their
/// document loaded when present; other entries are kept so the seeder can
/// report them as skipped.
pub fn scan_local_mirror(root: &Path) -> Result<Vec<MonthDirectory>, SyncError> {
    let entries = fs::read_dir(root).map_err(|e| {
        error!(error = ?e, path = %root.display(), "Failed to read picture directory");
        SyncError::from(e)
    })?;

    let mut directories = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!(error = ?e, path = %root.display(), "Failed to read picture directory entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let document = if MonthKey::parse(&name).is_some() {
            read_document(&entry.path().join(MONTH_DOCUMENT))
        } else {
            Ok(None)
        };
        directories.push(MonthDirectory { name, document });
    }
    info!(path = %root.display(), entries = directories.len(), "Scanned local mirror");
    Ok(directories)
}

fn read_document(path: &Path) -> Result<Option<String>, SyncError> {
    if !path.is_file() {
        return Ok(None);
    }
    fs::read_to_string(path).map(Some).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read month document");
        SyncError::from(e)
    })
}

/// Lists the month directories below `base_path` in the content repository
/// and fetches each one's document. A missing document is recorded as
/// `Ok(None)`; any other fetch failure is kept for the seeder to report.
pub async fn scan_remote<F>(fetcher: &F, base_path: &str) -> Result<Vec<MonthDirectory>, SyncError>
where
    F: ContentFetcher + Sync,
{
    let entries = fetcher.list_dir(base_path).await?;

    let mut directories = Vec::new();
    for entry in entries.into_iter().filter(|e| e.kind == EntryKind::Dir) {
        let document = match MonthKey::parse(&entry.name) {
            Some(month) => match fetcher.fetch(&month.document_path(base_path)).await {
                Ok(text) => Ok(Some(text)),
                Err(SyncError::NotFound(_)) => Ok(None),
                Err(e) => {
                    error!(directory = %entry.name, error = %e, "Failed to fetch month document");
                    Err(e)
                }
            },
            None => Ok(None),
        };
        directories.push(MonthDirectory {
            name: entry.name,
            document,
        });
    }
    info!(base_path = base_path, entries = directories.len(), "Scanned repository month directories");
    Ok(directories)
}

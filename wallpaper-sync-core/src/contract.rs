//! # contract: interfaces to the two remote services and to persisted state
//!
//! This module defines the capability traits the synchronisation steps are
//! written against, plus the plain data types that flow through them:
//!
//! - [`PageStore`]: CRUD over the forum's page-management API.
//! - [`ContentFetcher`]: read-only access to files and directories in the
//!   content repository.
//! - [`StateStore`]: writes the month rollover back to persisted configuration.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so the archive seeder, the overview
//!   step and the month roller can be driven by deterministic mocks instead of
//!   the network. Mocks are exported behind the default `test-export-mocks`
//!   feature so the CLI crate's tests can use them too.
//!
//! ## Error Handling
//! - All methods return [`SyncError`]; implementors convert transport and
//!   status failures at the point of the call and log them with context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use mockall::automock;

use crate::error::SyncError;
use crate::month::MonthKey;

/// A page as held by the remote page service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Identifier assigned by the page service.
    pub id: i64,
    pub title: String,
    /// URL-safe, unique within the page service.
    pub slug: String,
    pub content: String,
    pub is_hidden: bool,
    /// When true the content is rendered as raw HTML instead of markdown.
    pub is_html: bool,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub title: String,
    pub content: String,
    /// Optional; when present it must be unique or creation fails with a conflict.
    pub slug: Option<String>,
    pub is_hidden: bool,
    pub is_html: bool,
}

impl NewPage {
    /// A visible markdown page for one archive month.
    pub fn for_month(month: &MonthKey, content: String) -> Self {
        Self {
            title: month.title(),
            content,
            slug: Some(month.slug()),
            is_hidden: false,
            is_html: false,
        }
    }
}

/// Partial update: unset fields are left unchanged by the page service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_html: Option<bool>,
}

impl PageUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Kind of an entry in a content-repository directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// One entry of a content-repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub download_url: Option<String>,
}

/// The pair of SyncState fields written together on a month rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRollover {
    pub archive_page_id: i64,
    pub current_year_month: MonthKey,
}

/// CRUD against the remote page-management API.
///
/// Each method maps to exactly one remote call. Listing returns a single page
/// of results; there is no pagination traversal.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Create a page. Fails with [`SyncError::Conflict`] on a duplicate slug.
    async fn create(&self, page: NewPage) -> Result<Page, SyncError>;

    /// Fetch a page by id. Fails with [`SyncError::NotFound`] if absent.
    async fn get_by_id(&self, id: i64) -> Result<Page, SyncError>;

    /// First page whose slug matches, if any.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>, SyncError>;

    /// Apply a partial update and return the page as stored afterwards.
    async fn update(&self, id: i64, fields: PageUpdate) -> Result<Page, SyncError>;

    /// Delete a page; true only if the service confirmed the deletion.
    async fn delete(&self, id: i64) -> bool;

    /// List pages, optionally including hidden ones.
    async fn list(&self, include_hidden: bool) -> Result<Vec<Page>, SyncError>;
}

/// Read access to one repository (owner, name and branch fixed by the implementor).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Decoded text of the file at `path`. Any non-success answer, including
    /// `path` naming a directory, is [`SyncError::NotFound`].
    async fn fetch(&self, path: &str) -> Result<String, SyncError>;

    /// Entries of the directory at `path`. A file path yields [`SyncError::NotFound`].
    async fn list_dir(&self, path: &str) -> Result<Vec<RepoEntry>, SyncError>;
}

/// Persists the SyncState fields that change on rollover.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait StateStore: Send + Sync {
    /// Write both fields of `rollover` in one operation: either both land or neither does.
    fn persist(&self, rollover: &MonthRollover) -> Result<(), SyncError>;
}

//! Overview document: rewrite its archive links to forum pages and push it to
//! the overview page.
//!
//! Only the part of the document from [`ARCHIVE_SECTION_MARKER`] onwards is
//! touched. In it, every relative link `[YYYY-MM](/<base_path>/YYYY-MM/)` is
//! replaced by `[YYYY-MM](<site>/p/bing-wallpaper-<yyyy-mm>)`.

use regex::{Captures, Regex};
use tracing::{error, info, warn};

use crate::contract::{ContentFetcher, Page, PageStore, PageUpdate};
use crate::error::SyncError;
use crate::month::slug_for;

/// Heading that opens the historical-archive section.
pub const ARCHIVE_SECTION_MARKER: &str = "### 历史归档：";

/// Directory the upstream overview links into.
pub const DEFAULT_ARCHIVE_BASE: &str = "zh-cn/picture";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRewrite {
    pub content: String,
    /// False when the marker was absent and `content` is the input unchanged.
    pub rewritten: bool,
}

pub struct LinkRewriter {
    pattern: Regex,
}

impl LinkRewriter {
    /// Rewriter for links into `archive_base` (e.g. `zh-cn/picture`).
    pub fn new(archive_base: &str) -> Result<Self, SyncError> {
        let base = archive_base.trim_matches('/');
        let prefix = if base.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", regex::escape(base))
        };
        let pattern = Regex::new(&format!(
            r"\[([0-9]{{4}}-[0-9]{{2}})\]\({prefix}[0-9]{{4}}-[0-9]{{2}}/\)"
        ))
        .map_err(|e| SyncError::Config(format!("invalid archive base path: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn rewrite(&self, content: &str, site_base_url: &str) -> OverviewRewrite {
        let Some(start) = content.find(ARCHIVE_SECTION_MARKER) else {
            return OverviewRewrite {
                content: content.to_string(),
                rewritten: false,
            };
        };

        let (before, archive) = content.split_at(start);
        let site = site_base_url.trim_end_matches('/');
        let archive = self.pattern.replace_all(archive, |caps: &Captures| {
            let month = &caps[1];
            format!("[{month}]({site}/p/{})", slug_for(month))
        });

        OverviewRewrite {
            content: format!("{}\n\n{}", before.trim(), archive),
            rewritten: true,
        }
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_BASE).expect("default archive base is a valid pattern")
    }
}

/// Rewrites links into the default archive directory.
pub fn rewrite_overview(content: &str, site_base_url: &str) -> OverviewRewrite {
    LinkRewriter::default().rewrite(content, site_base_url)
}

/// Where the overview comes from and where it goes.
#[derive(Debug, Clone)]
pub struct OverviewJob<'a> {
    pub page_id: i64,
    pub document_path: &'a str,
    pub site_base_url: &'a str,
}

/// Fetches the overview page and document, rewrites the archive links and
/// updates the page content in place.
pub async fn update_overview<S, F>(
    store: &S,
    fetcher: &F,
    rewriter: &LinkRewriter,
    job: &OverviewJob<'_>,
) -> Result<Page, SyncError>
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
{
    let page = store.get_by_id(job.page_id).await.map_err(|e| {
        error!(page_id = job.page_id, error = %e, "[OVERVIEW][ERROR] Overview page not found");
        e
    })?;

    let document = fetcher.fetch(job.document_path).await.map_err(|e| {
        error!(path = job.document_path, error = %e, "[OVERVIEW][ERROR] Failed to fetch overview document");
        e
    })?;

    let rewrite = rewriter.rewrite(&document, job.site_base_url);
    if rewrite.rewritten {
        info!("[OVERVIEW] Rewrote archive links");
    } else {
        warn!(marker = ARCHIVE_SECTION_MARKER, "[OVERVIEW] Archive section not found; links left unchanged");
    }

    let updated = store
        .update(page.id, PageUpdate::content(rewrite.content))
        .await
        .map_err(|e| {
            error!(page_id = page.id, error = %e, "[OVERVIEW][ERROR] Overview page update failed");
            e
        })?;
    info!(page_id = updated.id, "[OVERVIEW] Overview page updated");
    Ok(updated)
}

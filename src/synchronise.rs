//! Driver: runs the sync steps in order and aggregates their outcome.
//!
//! - [`synchronise`] updates the overview page, then rolls the current-month
//!   page. Both steps are always attempted; the run succeeds only if both do.
//! - [`seed`] is the separate one-time bulk creation of month pages.
//!
//! Each step logs its own failures; here they are reduced to booleans for the
//! process exit status.

use tracing::{error, info};

use wallpaper_sync_core::archive::{self, MonthDirectory, SeedOptions, SeedReport};
use wallpaper_sync_core::config::{RepoConfig, SyncState};
use wallpaper_sync_core::contract::{ContentFetcher, PageStore, StateStore};
use wallpaper_sync_core::month::MonthKey;
use wallpaper_sync_core::overview::{self, LinkRewriter, OverviewJob};
use wallpaper_sync_core::roller::{CurrentMonthRoller, RollOutcome};
use wallpaper_sync_core::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub overview_updated: bool,
    pub current_month_synced: bool,
}

impl SyncReport {
    pub fn succeeded(&self) -> bool {
        self.overview_updated && self.current_month_synced
    }
}

/// Runs the overview step then the current-month step.
///
/// `state` is updated in memory when a rollover has been persisted.
pub async fn synchronise<S, F, T>(
    store: &S,
    fetcher: &F,
    state_store: &T,
    repo: &RepoConfig,
    state: &mut SyncState,
    today: &MonthKey,
) -> SyncReport
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
    T: StateStore,
{
    info!("[SYNC] Updating overview page");
    let overview_updated = match run_overview(store, fetcher, repo, state).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Overview step failed");
            false
        }
    };

    info!("[SYNC] Updating current month page");
    let current_month_synced = match run_roller(store, fetcher, state_store, repo, state, today).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Current month step failed");
            false
        }
    };

    let report = SyncReport {
        overview_updated,
        current_month_synced,
    };
    info!(?report, "[SYNC] Finished");
    report
}

async fn run_overview<S, F>(store: &S, fetcher: &F, repo: &RepoConfig, state: &SyncState) -> Result<(), SyncError>
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
{
    let page_id = state.main_page_id()?;
    let rewriter = LinkRewriter::new(&repo.base_path)?;
    let job = OverviewJob {
        page_id,
        document_path: &repo.path,
        site_base_url: &state.base_url,
    };
    overview::update_overview(store, fetcher, &rewriter, &job).await?;
    Ok(())
}

async fn run_roller<S, F, T>(
    store: &S,
    fetcher: &F,
    state_store: &T,
    repo: &RepoConfig,
    state: &mut SyncState,
    today: &MonthKey,
) -> Result<(), SyncError>
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
    T: StateStore,
{
    let mut archive = state.archive()?;
    let roller = CurrentMonthRoller::new(store, fetcher, state_store, &repo.base_path);
    match roller.roll(today, &mut archive).await? {
        RollOutcome::RolledOver { page, month } => {
            state.archive_page_id = Some(archive.archive_page_id);
            state.current_year_month = Some(archive.current_year_month);
            info!(page_id = page.id, month = %month, "[SYNC] Rolled over to new month page");
        }
        RollOutcome::UpdatedInPlace { page } => {
            info!(page_id = page.id, "[SYNC] Refreshed current month page");
        }
    }
    Ok(())
}

/// Where the bulk seed reads month directories from.
pub enum SeedSource<'a, F> {
    Local(&'a std::path::Path),
    Remote { fetcher: &'a F, base_path: &'a str },
}

/// Bulk-creates month pages. Fails only if the source cannot be read at all.
pub async fn seed<S, F>(store: &S, source: SeedSource<'_, F>, options: &SeedOptions) -> Result<SeedReport, SyncError>
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
{
    let directories: Vec<MonthDirectory> = match source {
        SeedSource::Local(root) => {
            info!(path = %root.display(), "[SEED] Reading local mirror");
            archive::scan_local_mirror(root)?
        }
        SeedSource::Remote { fetcher, base_path } => {
            info!(base_path, "[SEED] Reading repository month directories");
            archive::scan_remote(fetcher, base_path).await?
        }
    };
    Ok(archive::sync_all(store, directories, options).await)
}

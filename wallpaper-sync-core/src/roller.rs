//! Current-month page: create a fresh page when the month changes, otherwise
//! refresh the existing one.
//!
//! The decision is [`plan`], a pure function of today's key and the persisted
//! [`ArchiveState`]. [`CurrentMonthRoller::roll`] carries it out:
//!
//! - [`RollPlan::Rollover`]: fetch the new month's document, create its page,
//!   then persist `archive_page_id` and `current_year_month` together.
//! - [`RollPlan::InPlace`]: fetch the existing page and the document, then
//!   update the page's content and title.
//!
//! The caller's `ArchiveState` is replaced only after the rollover has been
//! persisted, so every failure path leaves it exactly as it was.

use tracing::{error, info};

use crate::config::ArchiveState;
use crate::contract::{ContentFetcher, MonthRollover, NewPage, Page, PageStore, PageUpdate, StateStore};
use crate::error::SyncError;
use crate::month::MonthKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollPlan {
    Rollover { from: String, to: MonthKey },
    InPlace { month: MonthKey, page_id: i64 },
}

/// Chooses between rollover and in-place update.
///
/// Refuses to move the persisted month backwards: a `today` older than a valid
/// persisted key is a configuration error.
pub fn plan(today: &MonthKey, state: &ArchiveState) -> Result<RollPlan, SyncError> {
    if today.as_str() == state.current_year_month {
        return Ok(RollPlan::InPlace {
            month: today.clone(),
            page_id: state.archive_page_id,
        });
    }
    if let Some(persisted) = state.month() {
        if today < &persisted {
            return Err(SyncError::Config(format!(
                "current month {today} is older than recorded month {persisted}"
            )));
        }
    }
    Ok(RollPlan::Rollover {
        from: state.current_year_month.clone(),
        to: today.clone(),
    })
}

#[derive(Debug)]
pub enum RollOutcome {
    RolledOver { page: Page, month: MonthKey },
    UpdatedInPlace { page: Page },
}

pub struct CurrentMonthRoller<'a, S, F, T> {
    store: &'a S,
    fetcher: &'a F,
    state_store: &'a T,
    base_path: &'a str,
}

impl<'a, S, F, T> CurrentMonthRoller<'a, S, F, T>
where
    S: PageStore + Sync,
    F: ContentFetcher + Sync,
    T: StateStore,
{
    pub fn new(store: &'a S, fetcher: &'a F, state_store: &'a T, base_path: &'a str) -> Self {
        Self {
            store,
            fetcher,
            state_store,
            base_path,
        }
    }

    pub async fn roll(&self, today: &MonthKey, state: &mut ArchiveState) -> Result<RollOutcome, SyncError> {
        info!(today = %today, recorded = %state.current_year_month, "[ROLL] Evaluating current month");

        match plan(today, state).map_err(|e| {
            error!(error = %e, "[ROLL][ERROR] Refusing to roll back recorded month");
            e
        })? {
            RollPlan::Rollover { from, to } => {
                info!(from = %from, to = %to, "[ROLL] New month detected, creating page");
                let (page, rollover) = self.rollover(&to).await?;
                *state = ArchiveState {
                    archive_page_id: rollover.archive_page_id,
                    current_year_month: rollover.current_year_month.to_string(),
                };
                Ok(RollOutcome::RolledOver { page, month: to })
            }
            RollPlan::InPlace { month, page_id } => {
                info!(month = %month, page_id, "[ROLL] Updating existing month page");
                let page = self.update_in_place(&month, page_id).await?;
                Ok(RollOutcome::UpdatedInPlace { page })
            }
        }
    }

    async fn fetch_document(&self, month: &MonthKey) -> Result<String, SyncError> {
        let path = month.document_path(self.base_path);
        self.fetcher.fetch(&path).await.map_err(|e| {
            error!(month = %month, path = %path, error = %e, "[ROLL][ERROR] Failed to fetch month document");
            e
        })
    }

    async fn rollover(&self, month: &MonthKey) -> Result<(Page, MonthRollover), SyncError> {
        let content = self.fetch_document(month).await?;

        let page = self
            .store
            .create(NewPage::for_month(month, content))
            .await
            .map_err(|e| {
                error!(month = %month, error = %e, "[ROLL][ERROR] Failed to create month page");
                e
            })?;
        info!(page_id = page.id, title = %page.title, "[ROLL] Month page created");

        let rollover = MonthRollover {
            archive_page_id: page.id,
            current_year_month: month.clone(),
        };
        self.state_store.persist(&rollover).map_err(|e| {
            error!(page_id = page.id, month = %month, error = %e, "[ROLL][ERROR] Page created but state not persisted");
            e
        })?;
        info!(archive_page_id = page.id, current_year_month = %month, "[ROLL] Sync state persisted");
        Ok((page, rollover))
    }

    async fn update_in_place(&self, month: &MonthKey, page_id: i64) -> Result<Page, SyncError> {
        let existing = self.store.get_by_id(page_id).await.map_err(|e| {
            error!(page_id, error = %e, "[ROLL][ERROR] Existing month page not found");
            e
        })?;

        let content = self.fetch_document(month).await?;

        let page = self
            .store
            .update(existing.id, PageUpdate::content(content).with_title(month.title()))
            .await
            .map_err(|e| {
                error!(page_id = existing.id, error = %e, "[ROLL][ERROR] Month page update failed");
                e
            })?;
        info!(page_id = page.id, title = %page.title, "[ROLL] Month page updated");
        Ok(page)
    }
}

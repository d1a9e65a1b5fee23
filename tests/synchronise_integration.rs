use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use std::fs;
use tempfile::tempdir;

use wallpaper_sync::synchronise::{seed, synchronise, SeedSource};
use wallpaper_sync_core::archive::SeedOptions;
use wallpaper_sync_core::config::{RepoConfig, SyncState};
use wallpaper_sync_core::contract::{
    MockContentFetcher, MockPageStore, MockStateStore, MonthRollover, NewPage, Page,
};
use wallpaper_sync_core::month::MonthKey;
use wallpaper_sync_core::overview::ARCHIVE_SECTION_MARKER;
use wallpaper_sync_core::SyncError;

fn page(id: i64, title: &str, content: &str) -> Page {
    Page {
        id,
        title: title.to_string(),
        slug: String::new(),
        content: content.to_string(),
        is_hidden: false,
        is_html: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        edited_at: None,
    }
}

fn repo() -> RepoConfig {
    RepoConfig {
        owner: "octo".into(),
        repo: "bing-wallpaper".into(),
        path: "README.md".into(),
        base_path: "zh-cn/picture".into(),
        branch: "main".into(),
        api_url: "https://api.github.com".into(),
    }
}

fn sync_state(month: &str) -> SyncState {
    SyncState {
        base_url: "https://forum.example.com".into(),
        api_token: "token".into(),
        main_page_id: Some(1),
        archive_page_id: Some(7),
        current_year_month: Some(month.into()),
        picture_dir: None,
    }
}

fn overview_document() -> String {
    format!("# Overview\n{ARCHIVE_SECTION_MARKER}\n[2025-05](/zh-cn/picture/2025-05/)\n")
}

fn today() -> MonthKey {
    MonthKey::parse("2025-06").unwrap()
}

#[tokio::test]
async fn test_sync_rollover_updates_overview_and_persists_new_month() {
    let mut store = MockPageStore::new();
    let mut fetcher = MockContentFetcher::new();
    let mut state_store = MockStateStore::new();

    store
        .expect_get_by_id()
        .with(eq(1))
        .times(1)
        .returning(|id| Ok(page(id, "Overview", "old")));
    fetcher.expect_fetch().returning(|path: &str| match path {
        "README.md" => Ok(overview_document()),
        "zh-cn/picture/2025-06/README.md" => Ok("# June".to_string()),
        other => Err(SyncError::NotFound(other.to_string())),
    });
    store
        .expect_update()
        .withf(|id, fields| {
            *id == 1
                && fields
                    .content
                    .as_deref()
                    .is_some_and(|c| c.contains("https://forum.example.com/p/bing-wallpaper-2025-05"))
        })
        .times(1)
        .returning(|id, _| Ok(page(id, "Overview", "new")));
    store
        .expect_create()
        .times(1)
        .returning(|new: NewPage| Ok(page(42, &new.title, &new.content)));
    state_store
        .expect_persist()
        .with(eq(MonthRollover {
            archive_page_id: 42,
            current_year_month: today(),
        }))
        .times(1)
        .returning(|_| Ok(()));

    let mut state = sync_state("2025-05");
    let report = synchronise(&store, &fetcher, &state_store, &repo(), &mut state, &today()).await;

    assert!(report.succeeded());
    assert_eq!(state.archive_page_id, Some(42));
    assert_eq!(state.current_year_month.as_deref(), Some("2025-06"));
    assert_eq!(state.main_page_id, Some(1));
}

#[tokio::test]
async fn test_sync_attempts_current_month_even_if_overview_fails() {
    let mut store = MockPageStore::new();
    let mut fetcher = MockContentFetcher::new();
    let mut state_store = MockStateStore::new();

    store.expect_get_by_id().returning(|id| {
        if id == 1 {
            Err(SyncError::NotFound("overview page".into()))
        } else {
            Ok(page(id, "Bing Wallpaper (2025-06)", "old"))
        }
    });
    fetcher
        .expect_fetch()
        .withf(|path: &str| path == "zh-cn/picture/2025-06/README.md")
        .times(1)
        .returning(|_| Ok("# June".to_string()));
    store
        .expect_update()
        .withf(|id, _| *id == 7)
        .times(1)
        .returning(|id, _| Ok(page(id, "Bing Wallpaper (2025-06)", "# June")));
    state_store.expect_persist().never();

    let mut state = sync_state("2025-06");
    let report = synchronise(&store, &fetcher, &state_store, &repo(), &mut state, &today()).await;

    assert!(!report.overview_updated);
    assert!(report.current_month_synced);
    assert!(!report.succeeded());
    assert_eq!(state.archive_page_id, Some(7));
    assert_eq!(state.current_year_month.as_deref(), Some("2025-06"));
}

#[tokio::test]
async fn test_sync_missing_config_fields_fail_their_steps_only() {
    let store = MockPageStore::new();
    let fetcher = MockContentFetcher::new();
    let state_store = MockStateStore::new();

    let mut state = sync_state("2025-06");
    state.main_page_id = None;
    state.current_year_month = None;

    let report = synchronise(&store, &fetcher, &state_store, &repo(), &mut state, &today()).await;
    assert!(!report.overview_updated);
    assert!(!report.current_month_synced);
}

#[tokio::test]
async fn test_sync_rollover_fetch_failure_keeps_state() {
    let mut store = MockPageStore::new();
    let mut fetcher = MockContentFetcher::new();
    let mut state_store = MockStateStore::new();

    store
        .expect_get_by_id()
        .returning(|id| Ok(page(id, "Overview", "old")));
    fetcher.expect_fetch().returning(|path: &str| {
        if path == "README.md" {
            Ok(overview_document())
        } else {
            Err(SyncError::NotFound(path.to_string()))
        }
    });
    store
        .expect_update()
        .returning(|id, _| Ok(page(id, "Overview", "new")));
    store.expect_create().never();
    state_store.expect_persist().never();

    let mut state = sync_state("2025-05");
    let report = synchronise(&store, &fetcher, &state_store, &repo(), &mut state, &today()).await;

    assert!(report.overview_updated);
    assert!(!report.current_month_synced);
    assert_eq!(state.archive_page_id, Some(7));
    assert_eq!(state.current_year_month.as_deref(), Some("2025-05"));
}

#[tokio::test]
async fn test_seed_from_local_mirror() {
    let root = tempdir().unwrap();
    for name in ["2024-11", "2024-12", "2025-01", "bad-name"] {
        fs::create_dir(root.path().join(name)).unwrap();
    }
    fs::write(root.path().join("2024-11/README.md"), "# November").unwrap();
    fs::write(root.path().join("2025-01/README.md"), "# January").unwrap();

    let mut store = MockPageStore::new();
    store.expect_get_by_slug().returning(|_| Ok(None));
    store
        .expect_create()
        .times(2)
        .returning(|new: NewPage| Ok(page(10, &new.title, &new.content)));

    let report = seed::<_, MockContentFetcher>(
        &store,
        SeedSource::Local(root.path()),
        &SeedOptions::default(),
    )
    .await
    .expect("local mirror should be readable");

    assert_eq!(report.created_count(), 2);
    assert_eq!(report.skipped.len(), 2);
}

#[tokio::test]
async fn test_seed_fails_when_mirror_is_missing() {
    let root = tempdir().unwrap();
    let store = MockPageStore::new();
    let missing = root.path().join("picture");

    let result = seed::<_, MockContentFetcher>(
        &store,
        SeedSource::Local(&missing),
        &SeedOptions::default(),
    )
    .await;
    assert!(result.is_err());
}

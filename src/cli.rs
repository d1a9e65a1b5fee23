///
/// This module implements the CLI interface for wallpaper-sync: command parsing,
/// configuration loading, client construction and the exit-status contract.
///
/// All decisions about which page operation to run live in the
/// [`wallpaper-sync-core`] crate; this module only wires real clients into them.
///
/// ## Commands
/// - `sync`: update the overview page, then create or refresh the current
///   month's page. Fails unless both steps succeed.
/// - `seed`: one-time bulk creation of a page per month directory. Fails unless
///   at least one page was created.
///
/// [`wallpaper-sync-core`]: ../../wallpaper_sync_core/
use crate::load_config::{load_repo_config, load_sync_state, ConfigPaths, YamlStateFile};
use crate::pages::FlarumClient;
use crate::synchronise::{seed, synchronise, SeedSource};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wallpaper_sync_core::archive::SeedOptions;
use wallpaper_sync_core::content::GithubFetcher;
use wallpaper_sync_core::month::MonthKey;

/// CLI for wallpaper-sync: mirror the monthly Bing wallpaper archive into forum pages.
#[derive(Parser)]
#[clap(
    name = "wallpaper-sync",
    version,
    about = "Synchronise monthly Bing wallpaper archive documents from GitHub into Flarum pages"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update the overview page and the current month's page
    Sync {
        /// Directory holding github_config.yaml and flarum_config.yaml
        #[clap(long, env = "WALLPAPER_SYNC_CONFIG_DIR", default_value = "config")]
        config_dir: PathBuf,
    },
    /// Create one page per YYYY-MM month directory (one-time bulk seed)
    Seed {
        /// Directory holding github_config.yaml and flarum_config.yaml
        #[clap(long, env = "WALLPAPER_SYNC_CONFIG_DIR", default_value = "config")]
        config_dir: PathBuf,
        /// Local mirror of the month directories (defaults to `picture_dir`, then ./picture)
        #[clap(long, conflicts_with = "remote")]
        picture_dir: Option<PathBuf>,
        /// Read month directories from the content repository instead of a local mirror
        #[clap(long)]
        remote: bool,
        /// Create pages even if a page with the month's slug already exists
        #[clap(long)]
        allow_duplicates: bool,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config_dir } => run_sync(config_dir).await,
        Commands::Seed {
            config_dir,
            picture_dir,
            remote,
            allow_duplicates,
        } => run_seed(config_dir, picture_dir, remote, allow_duplicates).await,
    }
}

async fn run_sync(config_dir: PathBuf) -> Result<()> {
    let paths = ConfigPaths::in_dir(&config_dir);
    let repo = load_repo_config(&paths.github)?;
    let mut state = load_sync_state(&paths.flarum)?;
    tracing::info!(command = "sync", "Starting synchronisation");

    let store = FlarumClient::new(&state.base_url, &state.api_token)?;
    let fetcher = GithubFetcher::new(&repo)?;
    let state_file = YamlStateFile::new(&paths.flarum);
    let today = MonthKey::current();
    tracing::info!(today = %today, recorded = ?state.current_year_month, "Resolved current month");

    let report = synchronise(&store, &fetcher, &state_file, &repo, &mut state, &today).await;
    if report.succeeded() {
        tracing::info!(command = "sync", ?report, "Synchronisation complete");
        Ok(())
    } else {
        tracing::error!(command = "sync", ?report, "Synchronisation failed");
        Err(anyhow::anyhow!(
            "synchronisation failed (overview updated: {}, current month synced: {})",
            report.overview_updated,
            report.current_month_synced
        ))
    }
}

async fn run_seed(
    config_dir: PathBuf,
    picture_dir: Option<PathBuf>,
    remote: bool,
    allow_duplicates: bool,
) -> Result<()> {
    let paths = ConfigPaths::in_dir(&config_dir);
    let state = load_sync_state(&paths.flarum)?;
    tracing::info!(command = "seed", remote, allow_duplicates, "Starting bulk seed");

    let store = FlarumClient::new(&state.base_url, &state.api_token)?;
    let options = SeedOptions {
        skip_existing: !allow_duplicates,
    };

    let report = if remote {
        let repo = load_repo_config(&paths.github)?;
        let fetcher = GithubFetcher::new(&repo)?;
        let source = SeedSource::Remote {
            fetcher: &fetcher,
            base_path: &repo.base_path,
        };
        seed(&store, source, &options).await?
    } else {
        let root = picture_dir
            .or_else(|| state.picture_dir.clone())
            .unwrap_or_else(|| PathBuf::from("picture"));
        seed::<_, GithubFetcher>(&store, SeedSource::Local(&root), &options).await?
    };

    if report.any_created() {
        tracing::info!(command = "seed", created = report.created_count(), "Bulk seed complete");
        Ok(())
    } else {
        tracing::error!(
            command = "seed",
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Bulk seed created no pages"
        );
        Err(anyhow::anyhow!("bulk seed created no pages"))
    }
}

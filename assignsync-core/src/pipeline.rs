//! The fetch → filter → sync pipeline.

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::feed::FeedFetcher;
use crate::filter::{filter_assignments, filter_future};
use crate::notion::NotionClient;
use crate::store::RecordStore;
use crate::sync::{ReadFailurePolicy, SyncReport, sync_events};

/// Per-run knobs.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Events starting before this date are dropped
    pub today: NaiveDate,
    pub read_failure: ReadFailurePolicy,
    /// Report what would be created without writing
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            today: Local::now().date_naive(),
            read_failure: ReadFailurePolicy::default(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Events in the feed
    pub fetched: usize,
    /// Upcoming assignments after filtering
    pub candidates: usize,
    /// `None` when there was nothing to sync
    pub report: Option<SyncReport>,
}

/// Run the whole pipeline against the configured feed and Notion database.
pub async fn run(config: &SyncConfig, options: &SyncOptions) -> SyncResult<RunSummary> {
    let fetcher = FeedFetcher::new(&config.feed_url)?;
    let store = NotionClient::new(&config.notion);

    run_with_store(&fetcher, &store, options).await
}

/// Same as `run`, with any record store.
pub async fn run_with_store<S: RecordStore>(
    fetcher: &FeedFetcher,
    store: &S,
    options: &SyncOptions,
) -> SyncResult<RunSummary> {
    let events = fetcher.fetch_events().await?;
    let fetched = events.len();

    let upcoming = filter_future(&events, options.today);
    let candidates = filter_assignments(&upcoming);
    info!(fetched, upcoming = upcoming.len(), candidates = candidates.len(), "Filtered feed");

    if candidates.is_empty() {
        info!("No upcoming assignments found");
        return Ok(RunSummary {
            fetched,
            candidates: 0,
            report: None,
        });
    }

    let report = sync_events(store, &candidates, options.read_failure, options.dry_run).await?;

    Ok(RunSummary {
        fetched,
        candidates: candidates.len(),
        report: Some(report),
    })
}

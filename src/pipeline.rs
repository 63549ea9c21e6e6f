//! Pagination driver
//!
//! [`ReportSync`] walks the bucket listing page by page. Each page is fanned
//! out to a [`WorkerPool`] and fully drained before the next listing call, so
//! listing calls stay sequential and at most one page of work is in flight.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::local_store::LocalStore;
use crate::pool::WorkerPool;
use crate::report::RunSummary;
use crate::store::{HttpObjectStore, ObjectStore};
use crate::types::{Cursor, Event, RunCounters};
use crate::worker::DownloadWorker;

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Mirrors compressed report objects from a bucket into a local directory
///
/// Cloneable; clones share the store and the event channel.
#[derive(Clone)]
pub struct ReportSync {
    config: Arc<Config>,
    store: Arc<dyn ObjectStore>,
    event_tx: broadcast::Sender<Event>,
}

impl ReportSync {
    /// Validate `config` and connect to the configured object store over HTTP
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = HttpObjectStore::new(&config.store)?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Use an already constructed store
    ///
    /// The store settings in `config` are not used to connect; only the
    /// prefix and the download settings apply.
    pub fn with_store(store: Arc<dyn ObjectStore>, config: Config) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            store,
            event_tx,
        }
    }

    /// Subscribe to progress events
    ///
    /// Events are best-effort: a subscriber that falls behind sees
    /// `RecvError::Lagged` instead of slowing the run down.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Run over the configured prefix
    pub async fn run(&self) -> Result<RunSummary> {
        let prefix = self.config.store.prefix.clone();
        self.run_prefix(&prefix).await
    }

    /// List every object under `prefix` and materialize the missing ones
    ///
    /// Per-object failures are counted and logged; only a failed listing call
    /// ends the run early, returning [`Error::List`]. Files written before
    /// that point stay on disk, so a rerun picks up where this one stopped.
    pub async fn run_prefix(&self, prefix: &str) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        let counters = Arc::new(RunCounters::new());
        let worker = DownloadWorker::new(
            Arc::clone(&self.store),
            LocalStore::new(self.config.download.destination_dir.clone()),
        );
        let mut pool = WorkerPool::new(
            worker,
            self.config.download.max_concurrent_downloads,
            Arc::clone(&counters),
            self.event_tx.clone(),
        );

        tracing::info!(
            store = self.store.name(),
            prefix,
            destination = %self.config.download.destination_dir.display(),
            workers = pool.capacity(),
            "starting report sync"
        );

        let mut cursor: Option<Cursor> = None;
        let mut pages: u64 = 0;

        loop {
            let page = match self.store.list_objects(prefix, cursor.as_ref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        prefix,
                        page = pages + 1,
                        cursor = cursor.as_ref().map(Cursor::as_str),
                        error = %e,
                        "listing failed, aborting run"
                    );
                    return Err(Error::List(e));
                }
            };
            pages += 1;

            tracing::info!(
                page = pages,
                objects = page.objects.len(),
                has_more = page.has_more(),
                "listed page"
            );
            self.emit_event(Event::PageListed {
                page: pages,
                objects: page.objects.len(),
                has_more: page.has_more(),
            });

            for descriptor in page.objects {
                pool.submit(descriptor).await;
            }
            // Barrier: the next listing call waits for this page's outcomes
            let outcomes = pool.drain().await;
            tracing::debug!(page = pages, outcomes = outcomes.len(), "page drained");

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let summary = RunSummary::new(counters.snapshot(), pages, start.elapsed(), started_at);
        tracing::info!(
            saved = summary.saved,
            skipped = summary.skipped,
            failed = summary.failed,
            pages = summary.pages,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "report sync finished"
        );
        self.emit_event(Event::Finished {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    fn emit_event(&self, event: Event) {
        // No receivers is fine; the event is dropped
        self.event_tx.send(event).ok();
    }
}

//! # report-sync
//!
//! Incremental mirror for gzip-compressed report objects kept in an
//! object-storage bucket.
//!
//! A run lists the bucket page by page, hands every object on a page to a
//! bounded pool of download workers, and waits for the page to drain before
//! asking for the next one. Each worker decompresses its object into the
//! destination directory unless a file with the same logical name is already
//! there, so reruns only fetch what is missing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use report_sync::{Config, ReportSync};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.store.bucket = "ocid1.tenancy.oc1..example".to_string();
//!
//!     let sync = ReportSync::new(config)?;
//!
//!     let mut events = sync.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = sync.run().await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Gzip codec
pub mod codec;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Local destination directory
pub mod local_store;
/// Pagination driver
pub mod pipeline;
/// Bounded worker pool
pub mod pool;
/// End-of-run summary
pub mod report;
/// Object storage client port and HTTP adapter
pub mod store;
/// Core types and events
pub mod types;
/// Per-object download worker
pub mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, StoreConfig};
pub use error::{Error, ListError, ObjectError, Result};
pub use local_store::LocalStore;
pub use pipeline::ReportSync;
pub use pool::WorkerPool;
pub use report::{RunSummary, summarize};
pub use store::{HttpObjectStore, ObjectStore};
pub use types::{
    CounterSnapshot, Cursor, DownloadOutcome, Event, ListPage, ObjectDescriptor, RunCounters,
};
pub use worker::{DownloadWorker, logical_name};

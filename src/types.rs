//! Core types for report-sync

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ObjectError;
use crate::report::RunSummary;

/// A remote object as returned by a listing call
///
/// The name is the full key, conventionally `<prefix>/<logical-filename>.gz`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Fully qualified object name
    pub name: String,
}

impl ObjectDescriptor {
    /// Create a descriptor for the given object name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Opaque continuation token for a paginated listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    /// Create a cursor from a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, as sent back to the store
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects on this page, in listing order
    pub objects: Vec<ObjectDescriptor>,
    /// Cursor for the next page; `None` means the listing is exhausted
    pub next_cursor: Option<Cursor>,
}

impl ListPage {
    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Terminal status of processing one descriptor
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Object was fetched, decompressed and written
    Saved(String),
    /// A file with the same logical name already existed
    Skipped(String),
    /// Any per-object failure
    Failed(String, ObjectError),
}

impl DownloadOutcome {
    /// Object name this outcome belongs to
    pub fn name(&self) -> &str {
        match self {
            DownloadOutcome::Saved(name)
            | DownloadOutcome::Skipped(name)
            | DownloadOutcome::Failed(name, _) => name,
        }
    }

    /// Whether the object was written during this run
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved(_))
    }
}

/// Outcome counters for one run
///
/// Updated once per recorded outcome from concurrently finishing workers;
/// counts only ever increase.
#[derive(Debug, Default)]
pub struct RunCounters {
    saved: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RunCounters`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Objects written during this run
    pub saved: u64,
    /// Objects already present locally
    pub skipped: u64,
    /// Objects that failed to fetch, decode or write
    pub failed: u64,
}

impl CounterSnapshot {
    /// Total outcomes recorded
    pub fn total(&self) -> u64 {
        self.saved + self.skipped + self.failed
    }
}

impl RunCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome and return the updated value of its counter
    pub fn record(&self, outcome: &DownloadOutcome) -> u64 {
        let counter = match outcome {
            DownloadOutcome::Saved(_) => &self.saved,
            DownloadOutcome::Skipped(_) => &self.skipped,
            DownloadOutcome::Failed(..) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Read all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            saved: self.saved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Progress events published while a run is in flight
#[derive(Clone, Debug)]
pub enum Event {
    /// A listing page was fetched
    PageListed {
        /// 1-based page number
        page: u64,
        /// Objects on the page
        objects: usize,
        /// Whether a further page follows
        has_more: bool,
    },

    /// An object was decompressed and saved
    Saved {
        /// Object name
        name: String,
        /// Saved count so far, including this one
        total_saved: u64,
    },

    /// An object was already present locally
    Skipped {
        /// Object name
        name: String,
    },

    /// An object failed
    Failed {
        /// Object name
        name: String,
        /// Error message
        error: String,
    },

    /// The listing was exhausted and every page drained
    Finished {
        /// Final summary
        summary: RunSummary,
    },
}

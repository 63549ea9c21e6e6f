//! Run reporter

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::types::CounterSnapshot;

/// Final result of one run
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Objects written during this run
    pub saved: u64,
    /// Objects already present locally
    pub skipped: u64,
    /// Objects that failed
    pub failed: u64,
    /// Listing pages fetched
    pub pages: u64,
    /// Wall time from the first listing call to the last drained page
    pub elapsed: Duration,
    /// When the run started
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    /// Build a summary from final counters
    pub fn new(
        counters: CounterSnapshot,
        pages: u64,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            saved: counters.saved,
            skipped: counters.skipped,
            failed: counters.failed,
            pages,
            elapsed,
            started_at,
        }
    }

    /// Counter view of this summary
    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            saved: self.saved,
            skipped: self.skipped,
            failed: self.failed,
        }
    }

    /// Total outcomes recorded, one per listed object
    pub fn total(&self) -> u64 {
        self.counters().total()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summarize(&self.counters(), self.elapsed))
    }
}

/// Format the two-line end-of-run summary
///
/// ```
/// use report_sync::report::summarize;
/// use report_sync::types::CounterSnapshot;
/// use std::time::Duration;
///
/// let counters = CounterSnapshot { saved: 2, skipped: 0, failed: 1 };
/// assert_eq!(
///     summarize(&counters, Duration::from_millis(1500)),
///     "Elapsed: 1.50s\nTotal files downloaded: 2 (failed: 1)"
/// );
/// ```
pub fn summarize(counters: &CounterSnapshot, elapsed: Duration) -> String {
    let mut extra = Vec::new();
    if counters.skipped > 0 {
        extra.push(format!("skipped: {}", counters.skipped));
    }
    if counters.failed > 0 {
        extra.push(format!("failed: {}", counters.failed));
    }

    let mut out = format!(
        "Elapsed: {:.2}s\nTotal files downloaded: {}",
        elapsed.as_secs_f64(),
        counters.saved
    );
    if !extra.is_empty() {
        out.push_str(&format!(" ({})", extra.join(", ")));
    }
    out
}

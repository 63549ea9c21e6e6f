//! Error types for report-sync
//!
//! Errors are split by blast radius:
//! - [`ListError`] - a failed listing call; fatal to the whole run
//! - [`ObjectError`] - a failure scoped to one object; recorded as a
//!   `Failed` outcome and never propagated past the download worker
//! - [`Error`] - crate-level error returned by configuration and the driver

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for report-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for report-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bucket")
        key: Option<String>,
    },

    /// Listing the bucket failed; the run cannot continue
    #[error("listing failed: {0}")]
    List(#[from] ListError),

    /// Network error while building or using the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Errors from a `ListObjects` call
#[derive(Debug, Error)]
pub enum ListError {
    /// The request could not be sent or the response body not read
    #[error("list request for prefix {prefix:?} failed: {reason}")]
    Request {
        /// Prefix that was being listed
        prefix: String,
        /// Transport-level failure description
        reason: String,
    },

    /// The store answered with a non-success status
    #[error("list request for prefix {prefix:?} returned HTTP {status}: {body}")]
    Status {
        /// Prefix that was being listed
        prefix: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated), useful for diagnosing auth problems
        body: String,
    },

    /// The listing body could not be decoded
    #[error("malformed listing response for prefix {prefix:?}: {reason}")]
    Parse {
        /// Prefix that was being listed
        prefix: String,
        /// Decoder error
        reason: String,
    },
}

/// Errors scoped to a single object
///
/// Every variant carries enough context to find the object again; the
/// download worker turns these into `DownloadOutcome::Failed`.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The object name has no usable last path segment or lacks the
    /// compression suffix, so no logical filename can be derived
    #[error("cannot derive a local filename from {name:?}: {reason}")]
    InvalidName {
        /// Offending object name
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// Fetching the object bytes failed
    #[error("failed to fetch {name}: {reason}")]
    Fetch {
        /// Object name
        name: String,
        /// Transport or HTTP status failure description
        reason: String,
    },

    /// The fetched bytes are not a valid compressed stream
    #[error("failed to decompress {name}: {source}")]
    Decode {
        /// Object name
        name: String,
        /// Decoder error
        #[source]
        source: std::io::Error,
    },

    /// Writing the decompressed file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker task ended without producing an outcome (panic)
    #[error("worker for {name} aborted: {reason}")]
    Aborted {
        /// Object name
        name: String,
        /// Panic or cancellation message
        reason: String,
    },
}

impl ObjectError {
    /// Machine-readable error kind, used in log fields and events
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectError::InvalidName { .. } => "invalid_name",
            ObjectError::Fetch { .. } => "fetch",
            ObjectError::Decode { .. } => "decode",
            ObjectError::Write { .. } => "write",
            ObjectError::Aborted { .. } => "aborted",
        }
    }
}

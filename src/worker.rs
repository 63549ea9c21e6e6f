//! Download worker: fetch, decompress and materialize one object.

use std::sync::Arc;

use crate::codec::{self, COMPRESSED_SUFFIX};
use crate::error::ObjectError;
use crate::local_store::LocalStore;
use crate::store::ObjectStore;
use crate::types::{DownloadOutcome, ObjectDescriptor};

/// Derive the local filename for an object name
///
/// Takes the last `/`-separated segment and strips [`COMPRESSED_SUFFIX`].
/// Names that do not end with the suffix, or whose stem would be empty,
/// are rejected rather than silently mis-named.
///
/// # Examples
///
/// ```
/// use report_sync::worker::logical_name;
///
/// assert_eq!(logical_name("reports/cost-csv/0001.csv.gz").unwrap(), "0001.csv");
/// assert!(logical_name("reports/cost-csv/0001.csv").is_err());
/// assert!(logical_name("reports/cost-csv/").is_err());
/// ```
pub fn logical_name(object_name: &str) -> Result<&str, ObjectError> {
    let invalid = |reason: &str| ObjectError::InvalidName {
        name: object_name.to_string(),
        reason: reason.to_string(),
    };

    let segment = object_name.rsplit('/').next().unwrap_or(object_name);
    if segment.is_empty() {
        return Err(invalid("object name ends with a path separator"));
    }

    let stem = segment
        .strip_suffix(COMPRESSED_SUFFIX)
        .ok_or_else(|| invalid("missing compression suffix"))?;
    if stem.is_empty() || stem == "." || stem == ".." || stem.contains('\\') {
        return Err(invalid("no usable file name before the suffix"));
    }

    Ok(stem)
}

/// Processes single objects against a store and a destination directory
#[derive(Clone)]
pub struct DownloadWorker {
    store: Arc<dyn ObjectStore>,
    local: LocalStore,
}

impl DownloadWorker {
    /// Create a worker sharing `store` and writing into `local`
    pub fn new(store: Arc<dyn ObjectStore>, local: LocalStore) -> Self {
        Self { store, local }
    }

    /// Process one descriptor to exactly one outcome
    ///
    /// The local file is checked before any bytes are fetched. Every error is
    /// logged and returned as [`DownloadOutcome::Failed`]; nothing here
    /// aborts the caller.
    pub async fn process(&self, descriptor: &ObjectDescriptor) -> DownloadOutcome {
        let name = descriptor.name.clone();
        match self.try_process(&name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    object = %name,
                    kind = e.kind(),
                    error = %e,
                    "Error downloading/decompressing object"
                );
                DownloadOutcome::Failed(name, e)
            }
        }
    }

    async fn try_process(&self, name: &str) -> Result<DownloadOutcome, ObjectError> {
        let file_name = logical_name(name)?;

        if self.local.exists(file_name).await {
            tracing::debug!(object = %name, file = file_name, "already materialized, skipping");
            return Ok(DownloadOutcome::Skipped(name.to_string()));
        }

        let compressed = self.store.get_object(name).await?;
        let compressed_len = compressed.len();

        // Decompression is CPU-bound; keep it off the async worker threads
        let decoded = tokio::task::spawn_blocking(move || codec::decompress(&compressed))
            .await
            .map_err(|e| ObjectError::Aborted {
                name: name.to_string(),
                reason: format!("decompression task failed: {}", e),
            })?
            .map_err(|source| ObjectError::Decode {
                name: name.to_string(),
                source,
            })?;
        let decoded_len = decoded.len();

        let path = self
            .local
            .write(file_name, decoded)
            .await
            .map_err(|source| ObjectError::Write {
                path: self.local.path_for(file_name),
                source,
            })?;

        tracing::debug!(
            object = %name,
            path = %path.display(),
            compressed_bytes = compressed_len,
            decompressed_bytes = decoded_len,
            "object saved"
        );

        Ok(DownloadOutcome::Saved(name.to_string()))
    }
}

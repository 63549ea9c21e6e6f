//! Configuration types for report-sync

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Object storage connection settings
///
/// Credential resolution is not handled here: the endpoint is expected to be
/// reachable as configured, optionally with a bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the Object Storage REST API
    /// (default: "https://objectstorage.us-ashburn-1.oraclecloud.com")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Object storage namespace (default: "bling")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Bucket holding the reports (required; usually the tenancy OCID)
    #[serde(default)]
    pub bucket: String,

    /// Key prefix to list (default: "reports/cost-csv")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Per-request timeout (default: 300 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Maximum objects per listing page (None = let the store decide)
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Optional bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            namespace: default_namespace(),
            bucket: String::new(),
            prefix: default_prefix(),
            request_timeout: default_request_timeout(),
            page_size: None,
            auth_token: None,
        }
    }
}

/// Local materialization settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory receiving decompressed files (default: "REPORTS")
    #[serde(default = "default_destination_dir")]
    pub destination_dir: PathBuf,

    /// Maximum concurrent object downloads (default: 15)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            destination_dir: default_destination_dir(),
            max_concurrent_downloads: default_max_concurrent(),
        }
    }
}

/// Main configuration for [`ReportSync`](crate::ReportSync)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Object storage settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Destination and concurrency settings
    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration file without validating it
    ///
    /// For callers that layer further overrides on top before validating.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                "config_file",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check the settings the pipeline cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.store.bucket.trim().is_empty() {
            return Err(Error::config("bucket", "bucket must not be empty"));
        }
        if self.store.namespace.trim().is_empty() {
            return Err(Error::config("namespace", "namespace must not be empty"));
        }
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::config(
                "max_concurrent_downloads",
                "worker pool needs at least one slot",
            ));
        }
        if self.store.page_size == Some(0) {
            return Err(Error::config("page_size", "page size must be positive"));
        }

        let endpoint = url::Url::parse(&self.store.endpoint).map_err(|e| {
            Error::config(
                "endpoint",
                format!("invalid endpoint {:?}: {}", self.store.endpoint, e),
            )
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(
                "endpoint",
                format!("unsupported endpoint scheme {:?}", endpoint.scheme()),
            ));
        }

        Ok(())
    }

    /// Destination directory
    pub fn destination_dir(&self) -> &PathBuf {
        &self.download.destination_dir
    }
}

fn default_endpoint() -> String {
    "https://objectstorage.us-ashburn-1.oraclecloud.com".to_string()
}

fn default_namespace() -> String {
    "bling".to_string()
}

fn default_prefix() -> String {
    "reports/cost-csv".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_destination_dir() -> PathBuf {
    PathBuf::from("REPORTS")
}

fn default_max_concurrent() -> usize {
    15
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! Object Storage REST API adapter
//!
//! Speaks the native Object Storage wire format:
//! - `GET /n/{namespace}/b/{bucket}/o?prefix=..&start=..` lists a page as
//!   `{"objects": [{"name": ..}], "nextStartWith": ..}`
//! - `GET /n/{namespace}/b/{bucket}/o/{name}` returns raw object bytes

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;
use urlencoding::encode;

use super::traits::ObjectStore;
use crate::config::StoreConfig;
use crate::error::{Error, ListError, ObjectError, Result};
use crate::types::{Cursor, ListPage, ObjectDescriptor};

/// Maximum number of response body bytes kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Listing response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsResponse {
    #[serde(default)]
    objects: Vec<ObjectSummary>,
    #[serde(default)]
    next_start_with: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectSummary {
    name: String,
}

/// [`ObjectStore`] backed by the Object Storage REST API
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    /// `{endpoint}/n/{namespace}/b/{bucket}/o`
    objects_url: String,
    page_size: Option<u32>,
    auth_token: Option<String>,
    timeout: Duration,
}

impl HttpObjectStore {
    /// Build a store client from configuration
    pub fn new(config: &StoreConfig) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(Error::config("bucket", "bucket must not be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let objects_url = format!(
            "{}/n/{}/b/{}/o",
            config.endpoint.trim_end_matches('/'),
            encode(&config.namespace),
            encode(&config.bucket),
        );

        Ok(Self {
            client,
            objects_url,
            page_size: config.page_size,
            auth_token: config.auth_token.clone(),
            timeout: config.request_timeout,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn describe_send_error(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("timed out after {} seconds", self.timeout.as_secs())
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        }
    }
}

/// Keep error bodies short enough for a single log line
fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn list_objects(
        &self,
        prefix: &str,
        cursor: Option<&Cursor>,
    ) -> std::result::Result<ListPage, ListError> {
        let mut query: Vec<(&str, String)> = vec![("prefix", prefix.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start", cursor.as_str().to_string()));
        }
        if let Some(limit) = self.page_size {
            query.push(("limit", limit.to_string()));
        }

        tracing::debug!(prefix, cursor = ?cursor.map(Cursor::as_str), "listing objects");

        let request = self.authorize(self.client.get(&self.objects_url).query(&query));
        let response = request.send().await.map_err(|e| ListError::Request {
            prefix: prefix.to_string(),
            reason: self.describe_send_error(&e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ListError::Status {
                prefix: prefix.to_string(),
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let body = response.bytes().await.map_err(|e| ListError::Request {
            prefix: prefix.to_string(),
            reason: format!("failed to read listing body: {}", e),
        })?;
        let parsed: ListObjectsResponse =
            serde_json::from_slice(&body).map_err(|e| ListError::Parse {
                prefix: prefix.to_string(),
                reason: e.to_string(),
            })?;

        Ok(ListPage {
            objects: parsed
                .objects
                .into_iter()
                .map(|o| ObjectDescriptor::new(o.name))
                .collect(),
            // An empty token is treated the same as an absent one
            next_cursor: parsed
                .next_start_with
                .filter(|token| !token.is_empty())
                .map(Cursor::new),
        })
    }

    async fn get_object(&self, name: &str) -> std::result::Result<Bytes, ObjectError> {
        let url = format!("{}/{}", self.objects_url, encode(name));
        let request = self.authorize(self.client.get(&url));

        let response = request.send().await.map_err(|e| ObjectError::Fetch {
            name: name.to_string(),
            reason: self.describe_send_error(&e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ObjectError::Fetch {
                name: name.to_string(),
                reason: format!("HTTP {}: {}", status.as_u16(), truncate_body(body)),
            });
        }

        response.bytes().await.map_err(|e| ObjectError::Fetch {
            name: name.to_string(),
            reason: format!("failed to read body: {}", e),
        })
    }

    fn name(&self) -> &str {
        "object-storage-http"
    }
}

//! Shared test helpers: an instrumented in-memory object store and gzip fixtures.

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{ListError, ObjectError};
use crate::store::ObjectStore;
use crate::types::{Cursor, ListPage, ObjectDescriptor};

/// Gzip-compress `data`
pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// In-memory [`ObjectStore`] with call counting
///
/// Pages are served in order using `page-<n>` cursors. `get_object` tracks
/// how many fetches are in flight at once.
#[derive(Default)]
pub(crate) struct MemoryStore {
    objects: HashMap<String, Vec<u8>>,
    pages: Vec<Vec<String>>,
    fail_list_on_call: Option<usize>,
    get_delay: Option<Duration>,
    panic_on_get: Option<String>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cursors_seen: Mutex<Vec<Option<String>>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an object without listing it
    pub(crate) fn with_object(mut self, name: &str, data: Vec<u8>) -> Self {
        self.objects.insert(name.to_string(), data);
        self
    }

    /// Append a listing page of existing object names
    pub(crate) fn with_page(mut self, names: &[&str]) -> Self {
        self.pages.push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Make the n-th (1-based) list call fail
    pub(crate) fn fail_list_on_call(mut self, call: usize) -> Self {
        self.fail_list_on_call = Some(call);
        self
    }

    /// Hold every fetch for `delay` so concurrency can be observed
    pub(crate) fn with_get_delay(mut self, delay: Duration) -> Self {
        self.get_delay = Some(delay);
        self
    }

    /// Panic inside `get_object` for `name`
    pub(crate) fn panic_on_get(mut self, name: &str) -> Self {
        self.panic_on_get = Some(name.to_string());
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        prefix: &str,
        cursor: Option<&Cursor>,
    ) -> Result<ListPage, ListError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.cursors_seen
            .lock()
            .unwrap()
            .push(cursor.map(|c| c.as_str().to_string()));

        if self.fail_list_on_call == Some(call) {
            return Err(ListError::Request {
                prefix: prefix.to_string(),
                reason: "injected listing failure".to_string(),
            });
        }

        let index = match cursor {
            None => 0,
            Some(c) => c
                .as_str()
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ListError::Parse {
                    prefix: prefix.to_string(),
                    reason: format!("unknown cursor {c}"),
                })?,
        };

        let objects = self
            .pages
            .get(index)
            .map(|names| names.iter().map(ObjectDescriptor::new).collect())
            .unwrap_or_default();
        let next_cursor =
            (index + 1 < self.pages.len()).then(|| Cursor::new(format!("page-{}", index + 1)));

        Ok(ListPage {
            objects,
            next_cursor,
        })
    }

    async fn get_object(&self, name: &str) -> Result<Bytes, ObjectError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_get.as_deref() == Some(name) {
            panic!("kaboom: {name}");
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .objects
            .get(name)
            .map(|data| Bytes::from(data.clone()))
            .ok_or_else(|| ObjectError::Fetch {
                name: name.to_string(),
                reason: "HTTP 404: ObjectNotFound".to_string(),
            });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "memory"
    }
}

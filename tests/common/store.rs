//! Scripted, instrumented object store for integration tests

use async_trait::async_trait;
use bytes::Bytes;
use report_sync::{Cursor, ListError, ListPage, ObjectDescriptor, ObjectError, ObjectStore};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::fixtures::{gzip, report_csv, report_object_name};

/// Object store serving a fixed sequence of pages
///
/// Page `k` is reached with cursor `"c{k}"`; the last page carries no cursor.
/// Every call is counted, and `get_object` records the highest number of
/// fetches that were in flight at the same time.
#[derive(Default)]
pub struct ScriptedStore {
    pages: Vec<Vec<String>>,
    objects: HashMap<String, Vec<u8>>,
    fail_list_on_call: Option<usize>,
    get_delay: Option<Duration>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `total` valid reports split into pages of at most `per_page`
    ///
    /// Zero objects still produces one empty, final page.
    pub fn with_reports(total: usize, per_page: usize) -> Self {
        let mut store = Self::new();
        let names: Vec<String> = (0..total).map(report_object_name).collect();
        for (n, name) in names.iter().enumerate() {
            store
                .objects
                .insert(name.clone(), gzip(report_csv(n).as_bytes()));
        }
        if names.is_empty() {
            store.pages.push(Vec::new());
        }
        for chunk in names.chunks(per_page.max(1)) {
            store.pages.push(chunk.to_vec());
        }
        store
    }

    /// Append a page listing `names`
    pub fn page(mut self, names: &[&str]) -> Self {
        self.pages.push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Store raw bytes under `name`
    pub fn object(mut self, name: &str, data: Vec<u8>) -> Self {
        self.objects.insert(name.to_string(), data);
        self
    }

    /// Fail the n-th (1-based) list call
    pub fn fail_list_on_call(mut self, call: usize) -> Self {
        self.fail_list_on_call = Some(call);
        self
    }

    /// Delay every fetch so overlapping workers become visible
    pub fn get_delay(mut self, delay: Duration) -> Self {
        self.get_delay = Some(delay);
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn listed_objects(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Names passed to `get_object`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetch log poisoned").clone()
    }
}

#[async_trait]
impl ObjectStore for ScriptedStore {
    async fn list_objects(
        &self,
        prefix: &str,
        cursor: Option<&Cursor>,
    ) -> Result<ListPage, ListError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_list_on_call == Some(call) {
            return Err(ListError::Status {
                prefix: prefix.to_string(),
                status: 503,
                body: "ServiceUnavailable".to_string(),
            });
        }

        let index = match cursor {
            None => 0,
            Some(c) => c
                .as_str()
                .strip_prefix('c')
                .and_then(|k| k.parse::<usize>().ok())
                .ok_or_else(|| ListError::Parse {
                    prefix: prefix.to_string(),
                    reason: format!("unexpected cursor {c}"),
                })?,
        };

        let objects = self
            .pages
            .get(index)
            .map(|names| names.iter().map(ObjectDescriptor::new).collect())
            .unwrap_or_default();
        let next_cursor = (index + 1 < self.pages.len()).then(|| Cursor::new(format!("c{}", index + 1)));

        Ok(ListPage {
            objects,
            next_cursor,
        })
    }

    async fn get_object(&self, name: &str) -> Result<Bytes, ObjectError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched
            .lock()
            .expect("fetch log poisoned")
            .push(name.to_string());
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
        "scripted"
    }
}

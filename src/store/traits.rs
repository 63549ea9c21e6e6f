//! The object storage port consumed by the pipeline

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ListError, ObjectError};
use crate::types::{Cursor, ListPage};

/// Read-only access to a bucket
///
/// Implementations must be `Send + Sync`; one instance is shared by the
/// pagination driver and every worker.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects under `prefix`
    ///
    /// `cursor` is `None` for the first call and the previous page's
    /// `next_cursor` afterwards. A returned page without `next_cursor` is
    /// the last one.
    ///
    /// # Errors
    ///
    /// Any failure is a [`ListError`]; the pipeline treats it as fatal.
    async fn list_objects(
        &self,
        prefix: &str,
        cursor: Option<&Cursor>,
    ) -> Result<ListPage, ListError>;

    /// Fetch the full contents of one object
    ///
    /// # Errors
    ///
    /// Returns [`ObjectError::Fetch`] on transport or status failures.
    async fn get_object(&self, name: &str) -> Result<Bytes, ObjectError>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

//! Abstract object-store capability.
//!
//! Every store backend implements [`ObjectStore`]. The trait covers
//! exactly what the gateway needs: write an object, read its metadata,
//! delete it, and fetch one raw listing page. Handlers never talk to a
//! backend directly; they receive the store as a shared `Arc<dyn
//! ObjectStore>` so tests can substitute the in-memory implementation.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One raw entry as returned by the store's listing, before any
/// filtering or ordering.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
}

/// One raw listing page. `next_cursor` is an opaque continuation token;
/// `None` means the enumeration is complete.
#[derive(Debug)]
pub struct ListChunk {
    pub entries: Vec<ObjectEntry>,
    pub next_cursor: Option<String>,
}

/// Metadata for a single stored object.
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size: i64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Async object storage contract.
pub trait ObjectStore: Send + Sync + 'static {
    /// Write `data` under `key` with the given content type and
    /// upload-time metadata. Existing keys are overwritten; the gallery
    /// never reuses keys, so this path is only taken by direct callers.
    fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Read the metadata of the object at `key`.
    fn head(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<ObjectHead>> + Send + '_>>;

    /// Delete the object at `key`. Idempotent: deleting an absent key
    /// succeeds.
    fn delete(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Fetch one raw listing page under `prefix`, resuming from `cursor`
    /// when given. Entries arrive in whatever order the backend uses;
    /// callers must not assume any.
    fn list_page(
        &self,
        prefix: &str,
        cursor: Option<String>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<ListChunk>> + Send + '_>>;
}

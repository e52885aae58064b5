//! In-memory object-store backend.
//!
//! Objects live in a `BTreeMap` behind a `tokio::sync::RwLock`. Selected
//! with `--store memory` for credential-free local development, and used
//! throughout the test suite as the substitutable store capability.
//!
//! `list_page` deliberately mirrors a cursor-paginated store: it returns
//! at most `page_size` entries per call plus an opaque base64 token
//! marking where the next call should resume. Constructing the store
//! with a small page size forces multi-round enumerations in tests.

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::RwLock;

use super::object_store::{ListChunk, ObjectEntry, ObjectHead, ObjectStore, StoreError, StoreResult};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Clone)]
struct MemoryRecord {
    data: Bytes,
    last_modified: DateTime<Utc>,
    content_type: Option<String>,
    metadata: HashMap<String, String>,
}

/// Object store held entirely in process memory.
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, MemoryRecord>>,
    /// Raw listing page size; callers see at most this many entries per
    /// `list_page` call.
    page_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a store whose listings truncate after `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Insert an object with an explicit timestamp, bypassing `put`.
    /// Seeding hook for tests and local fixtures.
    pub async fn seed(&self, key: &str, data: Bytes, last_modified: DateTime<Utc>) {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            MemoryRecord {
                data,
                last_modified,
                content_type: None,
                metadata: HashMap::new(),
            },
        );
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let key = key.to_string();
        let content_type = content_type.to_string();
        Box::pin(async move {
            let mut objects = self.objects.write().await;
            objects.insert(
                key,
                MemoryRecord {
                    data,
                    last_modified: Utc::now(),
                    content_type: Some(content_type),
                    metadata,
                },
            );
            Ok(())
        })
    }

    fn head(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<ObjectHead>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let objects = self.objects.read().await;
            let record = objects
                .get(&key)
                .ok_or_else(|| StoreError::NotFound(key.clone()))?;
            Ok(ObjectHead {
                size: record.data.len() as i64,
                last_modified: record.last_modified,
                content_type: record.content_type.clone(),
                metadata: record.metadata.clone(),
            })
        })
    }

    fn delete(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            // Idempotent like S3: removing an absent key succeeds.
            let mut objects = self.objects.write().await;
            objects.remove(&key);
            Ok(())
        })
    }

    fn list_page(
        &self,
        prefix: &str,
        cursor: Option<String>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<ListChunk>> + Send + '_>> {
        let prefix = prefix.to_string();
        Box::pin(async move {
            let resume_after = cursor.as_deref().map(decode_cursor);
            let objects = self.objects.read().await;

            let mut entries: Vec<ObjectEntry> = Vec::new();
            let mut next_cursor = None;
            for (key, record) in objects
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .filter(|(key, _)| {
                    resume_after
                        .as_deref()
                        .is_none_or(|after| key.as_str() > after)
                })
            {
                if entries.len() == self.page_size {
                    // At least one more entry matches, so this page is
                    // truncated at the last key we did include.
                    next_cursor = entries.last().map(|entry| encode_cursor(&entry.key));
                    break;
                }
                entries.push(ObjectEntry {
                    key: key.clone(),
                    size: record.data.len() as i64,
                    last_modified: record.last_modified,
                });
            }

            Ok(ListChunk { entries, next_cursor })
        })
    }
}

fn encode_cursor(key: &str) -> String {
    general_purpose::STANDARD.encode(key)
}

fn decode_cursor(token: &str) -> String {
    general_purpose::STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| token.to_string())
}

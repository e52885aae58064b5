//! src/services/gallery_service.rs
//!
//! GalleryService — gallery operations on top of the object-store
//! capability. Owns the key naming policy (uuid + original extension
//! under the managed prefix) and the listing aggregator that turns the
//! store's unordered, cursor-paginated listing into a stable,
//! recency-sorted, fixed-size page view.

use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    image::{ImageDetails, ImageObject},
    page::ImagePage,
};
use crate::services::object_store::{ObjectEntry, ObjectStore, StoreError, StoreResult};

/// Listing request parameters, all optional; defaults come from config.
#[derive(Debug, Default, Clone)]
pub struct ListImagesParams {
    pub prefix: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Result of a successful upload.
#[derive(Debug)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
    pub file_name: String,
}

/// GalleryService provides the gallery operations:
/// - Store an image (names the key, writes bytes + metadata to the store)
/// - List images (full enumeration, order, slice into pages)
/// - Image metadata (head passthrough)
/// - Remove an image (idempotent delete passthrough)
///
/// The struct is cheap to clone and holds no mutable state; the store is
/// a shared capability and everything else is configuration fixed at
/// startup.
#[derive(Clone)]
pub struct GalleryService {
    /// Shared object-store capability used for all durable state.
    store: Arc<dyn ObjectStore>,

    bucket: String,
    region: String,
    image_prefix: String,
    default_page_size: usize,
    max_upload_bytes: usize,
    /// Raw page fetches allowed per enumeration before giving up.
    max_list_calls: usize,
    /// Wall-clock bound on one enumeration.
    list_timeout: Duration,
}

impl GalleryService {
    /// Create a new GalleryService over `store`, taking its operating
    /// parameters from `cfg`.
    pub fn new(store: Arc<dyn ObjectStore>, cfg: &AppConfig) -> Self {
        Self {
            store,
            bucket: cfg.bucket.clone(),
            region: cfg.region.clone(),
            image_prefix: cfg.image_prefix.clone(),
            default_page_size: cfg.page_size.max(1),
            max_upload_bytes: cfg.max_upload_bytes,
            max_list_calls: cfg.list_max_calls.max(1),
            list_timeout: Duration::from_secs(cfg.list_timeout_secs),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Assign a storage key for an uploaded file.
    ///
    /// The original name contributes only its extension; the body of the
    /// name is a fresh v4 uuid, so two uploads of the same file always
    /// receive distinct keys and nothing is ever overwritten.
    pub fn image_key(&self, original_name: &str) -> String {
        format!(
            "{}{}{}",
            self.image_prefix,
            Uuid::new_v4(),
            file_extension(original_name)
        )
    }

    /// Derive the public retrieval URL for `key` from the configured
    /// bucket and region. Never stored, always recomputed.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }

    /// Write an uploaded image to the store under a fresh key, recording
    /// the original name and upload time as object metadata.
    pub async fn store_image(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StoreResult<StoredImage> {
        let key = self.image_key(original_name);
        let file_name = key
            .strip_prefix(&self.image_prefix)
            .unwrap_or(&key)
            .to_string();

        let mut metadata = HashMap::new();
        metadata.insert("originalname".to_string(), original_name.to_string());
        metadata.insert("uploadedat".to_string(), Utc::now().to_rfc3339());

        self.store.put(&key, data, content_type, metadata).await?;

        Ok(StoredImage {
            url: self.public_url(&key),
            key,
            file_name,
        })
    }

    /// Produce one page of the recency-sorted gallery listing.
    ///
    /// The store can reorder raw pages between continuation calls and
    /// offers no server-side sort by time, so the whole prefix is
    /// enumerated before anything is ordered or sliced. A store failure
    /// anywhere in the enumeration fails the whole listing; partial
    /// results would make page counts inconsistent across retries.
    ///
    /// `page` and `limit` values below 1 are clamped to 1. A `page`
    /// beyond the last page yields an empty item list, not an error.
    pub async fn list_images(&self, params: ListImagesParams) -> StoreResult<ImagePage> {
        let prefix = params
            .prefix
            .unwrap_or_else(|| self.image_prefix.clone());
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(self.default_page_size).max(1);

        let mut entries = timeout(self.list_timeout, self.collect_entries(&prefix))
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!(
                    "listing `{}` timed out after {}s",
                    prefix,
                    self.list_timeout.as_secs()
                ))
            })??;

        retain_images(&mut entries, &prefix);
        order_newest_first(&mut entries);

        let total_count = entries.len();
        let total_pages = total_count.div_ceil(limit);
        let images = page_slice(&entries, page, limit)
            .iter()
            .map(|entry| ImageObject {
                key: entry.key.clone(),
                url: self.public_url(&entry.key),
                last_modified: entry.last_modified,
                size: entry.size,
            })
            .collect();

        Ok(ImagePage {
            images,
            total_count,
            total_pages,
            current_page: page,
            has_more: page < total_pages,
        })
    }

    /// Fetch metadata for a single image, exactly as stored.
    pub async fn image_details(&self, key: &str) -> StoreResult<ImageDetails> {
        let head = self.store.head(key).await?;
        Ok(ImageDetails {
            key: key.to_string(),
            size: head.size,
            last_modified: head.last_modified,
            content_type: head.content_type,
            metadata: head.metadata,
        })
    }

    /// Remove an image. Inherits the store's idempotent delete: removing
    /// an already-absent key succeeds.
    pub async fn remove_image(&self, key: &str) -> StoreResult<()> {
        self.store.delete(key).await
    }

    /// One cheap raw listing call; used by the readiness probe.
    pub async fn probe(&self) -> StoreResult<()> {
        self.store.list_page(&self.image_prefix, None).await?;
        Ok(())
    }

    /// Drain the store's cursor-paginated listing for `prefix` into one
    /// sequence. Each call carries forward the exact cursor returned by
    /// the previous call; the loop is strictly sequential and bounded by
    /// `max_list_calls`.
    async fn collect_entries(&self, prefix: &str) -> StoreResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut cursor: Option<String> = None;
        let mut calls = 0usize;
        loop {
            let chunk = self.store.list_page(prefix, cursor).await?;
            entries.extend(chunk.entries);
            calls += 1;
            match chunk.next_cursor {
                Some(_) if calls >= self.max_list_calls => {
                    return Err(StoreError::Unavailable(format!(
                        "listing `{}` did not finish within {} page fetches",
                        prefix, self.max_list_calls
                    )));
                }
                Some(next) => cursor = Some(next),
                None => return Ok(entries),
            }
        }
    }
}

/// Drop the pseudo-directory marker and zero-size entries; neither is a
/// gallery image.
fn retain_images(entries: &mut Vec<ObjectEntry>, prefix: &str) {
    entries.retain(|entry| entry.key != prefix && entry.size > 0);
}

/// Most recent first; ties broken by key so the order is total and page
/// slices stay stable under duplicate timestamps.
fn order_newest_first(entries: &mut [ObjectEntry]) {
    entries.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// The 1-based `page` of size `limit`; empty past the end.
fn page_slice(entries: &[ObjectEntry], page: usize, limit: usize) -> &[ObjectEntry] {
    let start = (page - 1).saturating_mul(limit).min(entries.len());
    let end = start.saturating_add(limit).min(entries.len());
    &entries[start..end]
}

/// Extension of `name` including the dot, or empty when there is none.
fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

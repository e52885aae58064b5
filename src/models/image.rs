//! Per-image response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One image as it appears in a listing page.
///
/// `url` is derived from `(bucket, region, key)` and never stored; the
/// browser fetches image bytes directly from it.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    pub key: String,
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub size: i64,
}

/// Full metadata for a single image, as held by the store.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    pub key: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    /// Upload-time metadata (original name, upload timestamp), opaque here.
    pub metadata: HashMap<String, String>,
}

/// Body returned after a successful upload.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub success: bool,
    pub url: String,
    pub key: String,
    pub file_name: String,
}

/// Body returned after a successful delete.
#[derive(Serialize, Debug)]
pub struct DeleteReceipt {
    pub success: bool,
    pub message: String,
}

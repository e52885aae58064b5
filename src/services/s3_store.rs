//! AWS S3 object-store backend.
//!
//! Credentials are resolved via the standard AWS credential chain
//! (env vars, `~/.aws/credentials`, IAM role, etc.). A custom endpoint
//! plus path-style addressing makes the same backend work against
//! S3-compatible stores such as MinIO or LocalStack.

use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use super::object_store::{ListChunk, ObjectEntry, ObjectHead, ObjectStore, StoreError, StoreResult};

/// Object store backed by a real S3 bucket.
pub struct S3ObjectStore {
    /// AWS S3 SDK client, shared across all requests.
    client: Client,
    /// The bucket holding the gallery.
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 store for `bucket`.
    ///
    /// Loads AWS credentials from the default credential chain and
    /// initializes the S3 client for the given region. `endpoint_url`
    /// and `force_path_style` exist for S3-compatible stores.
    pub async fn connect(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region));

        if let Some(ref endpoint) = endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint);
        }

        let sdk_config = config_loader.load().await;

        let s3_config_builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(force_path_style);

        let client = Client::from_conf(s3_config_builder.build());

        Self { client, bucket }
    }

    /// Map an AWS SDK error to a StoreError with context.
    fn unavailable(context: &str, err: impl fmt::Display) -> StoreError {
        StoreError::Unavailable(format!("S3 {}: {}", context, err))
    }
}

impl ObjectStore for S3ObjectStore {
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
            debug!("s3 put_object: bucket={} key={}", self.bucket, key);

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .content_type(&content_type)
                .set_metadata(Some(metadata))
                .body(aws_sdk_s3::primitives::ByteStream::from(data))
                .send()
                .await
                .map_err(|e| Self::unavailable("put_object", e))?;

            Ok(())
        })
    }

    fn head(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<ObjectHead>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            debug!("s3 head_object: bucket={} key={}", self.bucket, key);

            let resp = self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
                .map_err(|e| {
                    let service_err = e.into_service_error();
                    if service_err.is_not_found() {
                        StoreError::NotFound(key.clone())
                    } else {
                        Self::unavailable("head_object", service_err)
                    }
                })?;

            Ok(ObjectHead {
                size: resp.content_length().unwrap_or(0),
                last_modified: resp
                    .last_modified()
                    .map(timestamp)
                    .unwrap_or(DateTime::UNIX_EPOCH),
                content_type: resp.content_type().map(str::to_string),
                metadata: resp.metadata().cloned().unwrap_or_default(),
            })
        })
    }

    fn delete(&self, key: &str) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            debug!("s3 delete_object: bucket={} key={}", self.bucket, key);

            // S3 delete_object is idempotent -- no error for missing keys.
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
                .map_err(|e| Self::unavailable("delete_object", e))?;

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
            debug!(
                "s3 list_objects_v2: bucket={} prefix={} cursor={:?}",
                self.bucket, prefix, cursor
            );

            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix);

            if let Some(ref token) = cursor {
                req = req.continuation_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| Self::unavailable("list_objects_v2", e))?;

            let entries = resp
                .contents()
                .iter()
                .filter_map(|obj| {
                    obj.key().map(|k| ObjectEntry {
                        key: k.to_string(),
                        size: obj.size().unwrap_or(0),
                        last_modified: obj
                            .last_modified()
                            .map(timestamp)
                            .unwrap_or(DateTime::UNIX_EPOCH),
                    })
                })
                .collect();

            let next_cursor = if resp.is_truncated() == Some(true) {
                resp.next_continuation_token().map(str::to_string)
            } else {
                None
            };

            Ok(ListChunk { entries, next_cursor })
        })
    }
}

/// Convert an SDK timestamp to chrono, defaulting to the epoch on the
/// (out-of-range) failure path.
fn timestamp(dt: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or(DateTime::UNIX_EPOCH)
}

//! HTTP handlers for the image endpoints.
//! Validates the transport-level concerns (multipart shape, MIME type,
//! size cap) and delegates everything else to `GalleryService`.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;

use crate::{
    errors::ApiError,
    models::{
        image::{DeleteReceipt, ImageDetails, UploadReceipt},
        page::ImagePage,
    },
    services::gallery_service::{GalleryService, ListImagesParams},
};

/// Query params accepted by the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub prefix: Option<String>,
}

/// POST `/api/upload` — multipart form with an `image` field.
pub async fn upload_image(
    State(gallery): State<GalleryService>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let field = loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::validation(format!("Invalid multipart body: {}", err)))?;
        match next {
            Some(field) if field.name() == Some("image") => break field,
            Some(_) => continue,
            None => return Err(ApiError::validation("No file provided")),
        }
    };

    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::validation("Only image files are allowed"));
    }

    let data = field
        .bytes()
        .await
        .map_err(|err| ApiError::validation(format!("Failed to read upload: {}", err)))?;
    let max_bytes = gallery.max_upload_bytes();
    if data.len() > max_bytes {
        return Err(ApiError::validation(format!(
            "File too large. Max size is {}MB.",
            max_bytes / (1024 * 1024)
        )));
    }

    let stored = gallery
        .store_image(&original_name, &content_type, data)
        .await
        .map_err(|err| ApiError::storage("Failed to upload image", err))?;

    Ok(Json(UploadReceipt {
        success: true,
        url: stored.url,
        key: stored.key,
        file_name: stored.file_name,
    }))
}

/// GET `/api/images` — paginated, recency-sorted listing.
pub async fn list_images(
    State(gallery): State<GalleryService>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ImagePage>, ApiError> {
    let page = gallery
        .list_images(ListImagesParams {
            prefix: query.prefix,
            page: query.page,
            limit: query.limit,
        })
        .await
        .map_err(|err| ApiError::storage("Failed to fetch images", err))?;

    Ok(Json(page))
}

/// DELETE `/api/images/{*key}` — remove one image. The wildcard keeps
/// keys with path separators routable whether or not they are
/// percent-encoded. Deleting an absent key succeeds.
pub async fn delete_image(
    State(gallery): State<GalleryService>,
    Path(key): Path<String>,
) -> Result<Json<DeleteReceipt>, ApiError> {
    gallery
        .remove_image(&key)
        .await
        .map_err(|err| ApiError::storage("Failed to delete image", err))?;

    Ok(Json(DeleteReceipt {
        success: true,
        message: "Image deleted successfully".into(),
    }))
}

/// GET `/api/images/{*key}/metadata` — stored metadata for one image.
///
/// Axum wildcards are terminal-only, so the route captures
/// `<key>/metadata` in one segment and the suffix is stripped here.
/// Generated keys end in a uuid plus extension, never in `/metadata`.
pub async fn image_metadata(
    State(gallery): State<GalleryService>,
    Path(path): Path<String>,
) -> Result<Json<ImageDetails>, ApiError> {
    let key = path
        .strip_suffix("/metadata")
        .ok_or_else(|| ApiError::not_found("Not found"))?;

    let details = gallery
        .image_details(key)
        .await
        .map_err(|err| ApiError::storage("Failed to get image metadata", err))?;

    Ok(Json(details))
}

//! Defines routes for the gallery API.
//!
//! ## Structure
//! - `GET    /api/health`                 — liveness
//! - `GET    /readyz`                     — readiness (checks the store)
//! - `POST   /api/upload`                 — multipart image upload
//! - `GET    /api/images`                 — paginated listing (?page=&limit=&prefix=)
//! - `DELETE /api/images/{*key}`          — delete one image
//! - `GET    /api/images/{*key}/metadata` — metadata for one image
//!
//! The wildcard `*key` allows nested keys like `images/uuid.jpg` whether
//! or not the client percent-encodes the separators.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::AppConfig,
    handlers::{
        health_handlers::{health, readyz},
        image_handlers::{delete_image, image_metadata, list_images, upload_image},
    },
    services::gallery_service::GalleryService,
};

/// Slack for multipart framing on top of the configured upload cap.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build and return the router for all gallery routes.
///
/// The router carries shared state (`GalleryService`) to all handlers.
pub fn routes() -> Router<GalleryService> {
    Router::new()
        .route("/api/health", get(health))
        .route("/readyz", get(readyz))
        .route("/api/upload", post(upload_image))
        .route("/api/images", get(list_images))
        .route(
            "/api/images/{*key}",
            get(image_metadata).delete(delete_image),
        )
}

/// Assemble the production router: routes, state, and the shared layers.
/// Integration tests call this too, so they exercise the same stack the
/// binary serves.
pub fn app(service: GalleryService, cfg: &AppConfig) -> Result<Router> {
    let cors = match &cfg.allowed_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed origin `{}`", origin))?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE])
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Ok(routes()
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(
            cfg.max_upload_bytes + UPLOAD_OVERHEAD_BYTES,
        )))
}

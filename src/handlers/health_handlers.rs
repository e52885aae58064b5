//! Health & readiness handlers.
//!
//! - GET /api/health -> simple liveness with a timestamp
//! - GET /readyz     -> readiness that checks the object store

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

use crate::services::gallery_service::GalleryService;

/// `GET /api/health`
///
/// Very small liveness probe — always returns 200 OK. This endpoint
/// should be cheap and never perform I/O.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that performs one raw listing call against the
/// object store. HTTP 200 when the store answers, 503 otherwise.
pub async fn readyz(State(gallery): State<GalleryService>) -> impl IntoResponse {
    let store_check = match gallery.probe().await {
        Ok(()) => CheckStatus { ok: true, error: None },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(err.to_string()),
        },
    };

    let status = if store_check.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = ReadyResponse {
        status: if store_check.ok { "ok".into() } else { "error".into() },
        store: store_check,
    };

    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    store: CheckStatus,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

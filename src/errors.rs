use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{fmt, sync::OnceLock};

use crate::services::object_store::StoreError;

/// Whether error responses include the `details` field. Set once at
/// startup from configuration; defaults to hidden.
static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

pub fn set_detail_exposure(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    *EXPOSE_DETAILS.get().unwrap_or(&false)
}

/// A lightweight wrapper for request failures that keeps the public
/// message separate from the diagnostic detail.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    /// Create a new ApiError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            detail: None,
        }
    }

    /// 400 for user-correctable upload problems.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// 404 Not Found.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Map a store failure to its HTTP shape. A missing key is 404;
    /// everything else is a 500 whose public body carries only the
    /// endpoint-level `public` message. Full detail is logged here.
    pub fn storage(public: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => {
                tracing::debug!("{}: no object at `{}`", public, key);
                Self {
                    status: StatusCode::NOT_FOUND,
                    message: "Image not found".into(),
                    detail: Some(format!("no object at key `{}`", key)),
                }
            }
            StoreError::Unavailable(reason) => {
                tracing::error!("{}: {}", public, reason);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: public.to_string(),
                    detail: Some(reason),
                }
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.detail.filter(|_| details_exposed()) {
            Some(detail) => Json(json!({ "error": self.message, "details": detail })),
            None => Json(json!({ "error": self.message })),
        };

        (self.status, body).into_response()
    }
}

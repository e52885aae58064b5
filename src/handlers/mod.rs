//! HTTP handlers for the gallery API.

pub mod health_handlers;
pub mod image_handlers;

//! Gallery gateway library — a thin HTTP backend for a cloud image gallery.
//!
//! The gateway proxies uploads, listings, deletions, and metadata lookups
//! to an object-storage bucket. The interesting part is the listing layer:
//! the store only exposes unordered, cursor-paginated pages, while the UI
//! needs a stable, recency-sorted, fixed-size view. `GalleryService`
//! reconciles the two by draining the full enumeration, ordering it in
//! memory, and slicing pages from the result.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

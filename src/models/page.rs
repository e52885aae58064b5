//! Pagination view over a listing.

use serde::Serialize;

use super::image::ImageObject;

/// One bounded, ordered slice of the full listing.
///
/// Computed fresh per request from a complete enumeration of the bucket
/// prefix; two pages of the same request share one snapshot, but separate
/// requests may observe different snapshots.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImagePage {
    pub images: Vec<ImageObject>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub has_more: bool,
}

//! Request handlers for the Reelstream API.

pub mod library;
pub mod progress;
pub mod streaming;

use axum::http::HeaderMap;
pub use library::api_library;
pub use progress::{update_progress, watch_progress};
use reelstream_core::streaming::ViewerId;
pub use streaming::stream_resource;

/// Extracts the viewer identity injected by the fronting auth layer.
///
/// Returns None when the header is absent or empty; the handlers answer
/// 401 in that case, so the core only ever sees authenticated requests.
pub(crate) fn viewer_from_headers(headers: &HeaderMap) -> Option<ViewerId> {
    headers
        .get("x-viewer-id")
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(ViewerId::new)
}

//! The streaming endpoint.
//!
//! Thin translation layer: identity and range come out of the headers, the
//! resource id out of the path, and the core responder does the rest. All
//! streaming status codes (206/200/403/404/416/500) originate in the core.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use reelstream_core::ResourceId;
use tracing::debug;

use super::viewer_from_headers;
use crate::server::AppState;

/// `GET /stream/{resource_id}` with optional `Range: bytes=start-[end]`.
pub async fn stream_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(viewer) = viewer_from_headers(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Missing viewer identity").into_response();
    };

    let resource_id = match resource_id.parse::<ResourceId>() {
        Ok(id) => id,
        Err(e) => {
            debug!("Rejected stream request: {e}");
            return (StatusCode::BAD_REQUEST, "Invalid resource id").into_response();
        }
    };

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    state.responder.respond(viewer, resource_id, range).await
}

//! Watch-progress endpoints.
//!
//! Playback-time progress is reported by the player, not derived from byte
//! delivery; these endpoints forward it to the session tracker, which owns
//! the durable watch history.

use std::time::UNIX_EPOCH;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use reelstream_core::ResourceId;
use serde::Deserialize;

use super::viewer_from_headers;
use crate::server::AppState;

/// Body of `POST /stream/{resource_id}/progress`.
#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    /// Percent of the title watched, 0 to 100
    pub progress: f64,
    /// Total playback duration in seconds, if the player knows it
    pub duration: Option<u64>,
}

/// Records how far the viewer has watched.
pub async fn update_progress(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<ProgressUpdate>,
) -> Response {
    let Some(viewer) = viewer_from_headers(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Missing viewer identity").into_response();
    };
    let Ok(resource_id) = resource_id.parse::<ResourceId>() else {
        return (StatusCode::BAD_REQUEST, "Invalid resource id").into_response();
    };

    if !update.progress.is_finite() || !(0.0..=100.0).contains(&update.progress) {
        return (StatusCode::BAD_REQUEST, "Invalid progress value").into_response();
    }

    state
        .tracker
        .record_progress(&viewer, resource_id, update.progress, update.duration)
        .await;

    Json(serde_json::json!({ "success": true })).into_response()
}

/// Returns the last recorded progress for this viewer and resource.
pub async fn watch_progress(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(viewer) = viewer_from_headers(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Missing viewer identity").into_response();
    };
    let Ok(resource_id) = resource_id.parse::<ResourceId>() else {
        return (StatusCode::BAD_REQUEST, "Invalid resource id").into_response();
    };

    match state.tracker.progress(&viewer, resource_id).await {
        Some(progress) => {
            let updated_secs = progress
                .updated_at
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            Json(serde_json::json!({
                "progress": progress.percent,
                "duration": progress.total_duration_secs,
                "last_watched_epoch_secs": updated_secs,
            }))
            .into_response()
        }
        None => Json(serde_json::json!({
            "progress": 0.0,
            "duration": null,
            "last_watched_epoch_secs": null,
        }))
        .into_response(),
    }
}

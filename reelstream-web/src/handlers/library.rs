//! Catalog listing endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::server::AppState;

/// One catalog entry as exposed to clients.
#[derive(Debug, Serialize)]
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// `GET /api/library` - lists the streamable catalog.
pub async fn api_library(State(state): State<AppState>) -> Json<Vec<LibraryEntry>> {
    let mut entries: Vec<LibraryEntry> = state
        .library
        .all_resources()
        .into_iter()
        .map(|resource| LibraryEntry {
            id: resource.id.to_string(),
            title: resource.title.clone(),
            mime_type: resource.mime_type.clone(),
            size_bytes: resource.total_size_bytes,
        })
        .collect();

    entries.sort_by(|a, b| a.title.cmp(&b.title));
    Json(entries)
}

//! HTTP server wiring for Reelstream.
//!
//! Builds the router, shares one `StreamResponder` across all connections,
//! and runs the axum accept loop. Each connection gets its own task; the
//! only state shared between requests is the read-only catalog and the
//! collaborator handles.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use reelstream_core::catalog::{MediaCatalog, MediaLibrary};
use reelstream_core::config::ReelstreamConfig;
use reelstream_core::streaming::{
    AccessGate, FsMediaSource, MediaSource, SessionTracker, StreamResponder,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers::{api_library, stream_resource, update_progress, watch_progress};
use crate::session_store::{InMemorySessionTracker, OpenAccessGate};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<StreamResponder>,
    pub library: Arc<MediaLibrary>,
    pub tracker: Arc<dyn SessionTracker>,
}

impl AppState {
    /// Builds state with the default standalone collaborators.
    pub fn new(library: MediaLibrary, config: &ReelstreamConfig) -> Self {
        Self::with_collaborators(
            library,
            Arc::new(OpenAccessGate),
            Arc::new(InMemorySessionTracker::new()),
            config,
        )
    }

    /// Builds state with injected gate and tracker implementations.
    pub fn with_collaborators(
        library: MediaLibrary,
        gate: Arc<dyn AccessGate>,
        tracker: Arc<dyn SessionTracker>,
        config: &ReelstreamConfig,
    ) -> Self {
        let library = Arc::new(library);
        let source = Arc::new(FsMediaSource::new(config.library.media_root.clone()));
        let responder = Arc::new(StreamResponder::new(
            Arc::clone(&library) as Arc<dyn MediaCatalog>,
            source as Arc<dyn MediaSource>,
            gate,
            Arc::clone(&tracker),
            &config.streaming,
        ));

        Self {
            responder,
            library,
            tracker,
        }
    }
}

/// Assembles the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/stream/{resource_id}", get(stream_resource))
        .route(
            "/stream/{resource_id}/progress",
            get(watch_progress).post(update_progress),
        )
        .route("/api/library", get(api_library))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Scans the media root, then serves the API until the process exits.
///
/// # Errors
/// Fails when the media root cannot be scanned or the listen address
/// cannot be bound.
pub async fn run_server(config: ReelstreamConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut library = MediaLibrary::new();
    let count = library.scan_directory(&config.library.media_root).await?;
    info!(
        "Catalogued {} media files from {}",
        count,
        config.library.media_root.display()
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(library, &config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Reelstream media server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

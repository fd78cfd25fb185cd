//! End-to-end tests for the streaming HTTP API.
//!
//! Each test scans a throwaway media directory, builds the full router, and
//! drives it with in-process requests. No listener is bound.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use reelstream_core::ResourceId;
use reelstream_core::catalog::MediaLibrary;
use reelstream_core::config::{LibraryConfig, ReelstreamConfig, StreamingConfig};
use reelstream_core::streaming::{AccessDecision, AccessGate, SessionTracker, ViewerId};
use reelstream_web::server::{AppState, build_router};
use reelstream_web::session_store::{InMemorySessionTracker, OpenAccessGate};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    resource_id: String,
    tracker: Arc<InMemorySessionTracker>,
    _media_dir: TempDir,
}

async fn app_with_gate(data: &[u8], max_chunk_size: u64, gate: Arc<dyn AccessGate>) -> TestApp {
    let media_dir = TempDir::new().unwrap();
    tokio::fs::write(media_dir.path().join("feature.mp4"), data)
        .await
        .unwrap();

    let mut library = MediaLibrary::new();
    library.scan_directory(media_dir.path()).await.unwrap();
    let resource_id = library.all_resources()[0].id.to_string();

    let config = ReelstreamConfig {
        streaming: StreamingConfig {
            max_chunk_size,
            read_buffer_size: 4096,
        },
        library: LibraryConfig {
            media_root: media_dir.path().to_path_buf(),
        },
        ..Default::default()
    };

    let tracker = Arc::new(InMemorySessionTracker::new());
    let state = AppState::with_collaborators(
        library,
        gate,
        Arc::clone(&tracker) as Arc<dyn SessionTracker>,
        &config,
    );

    TestApp {
        router: build_router(state),
        resource_id,
        tracker,
        _media_dir: media_dir,
    }
}

async fn app(data: &[u8], max_chunk_size: u64) -> TestApp {
    app_with_gate(data, max_chunk_size, Arc::new(OpenAccessGate)).await
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-viewer-id", "viewer-1")
        .body(Body::empty())
        .unwrap()
}

fn get_range(uri: &str, range: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-viewer-id", "viewer-1")
        .header(header::RANGE, range)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Let fire-and-forget tracker tasks run on the test runtime.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

struct DenyingGate;

#[async_trait]
impl AccessGate for DenyingGate {
    async fn may_stream(&self, _viewer: &ViewerId, _resource_id: ResourceId) -> AccessDecision {
        AccessDecision::Deny {
            reason: "subscription expired".to_string(),
        }
    }
}

#[tokio::test]
async fn test_playback_advances_in_bounded_chunks() {
    let data = patterned(2_000_000);
    let app = app(&data, 1_000_000).await;
    let uri = format!("/stream/{}", app.resource_id);

    let response = app
        .router
        .clone()
        .oneshot(get_range(&uri, "bytes=0-"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 0-999999/2000000"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "1000000"
    );
    let first = body_bytes(response).await;
    assert_eq!(first.len(), 1_000_000);

    let response = app
        .router
        .clone()
        .oneshot(get_range(&uri, "bytes=1000000-"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 1000000-1999999/2000000"
    );
    let second = body_bytes(response).await;

    let mut reassembled = first;
    reassembled.extend_from_slice(&second);
    assert_eq!(reassembled, data);
}

#[tokio::test]
async fn test_sequential_chunks_reconstruct_resource() {
    let data = patterned(1000);
    let app = app(&data, 256).await;
    let uri = format!("/stream/{}", app.resource_id);

    let mut reassembled = Vec::new();
    while reassembled.len() < data.len() {
        let range = format!("bytes={}-", reassembled.len());
        let response = app
            .router
            .clone()
            .oneshot(get_range(&uri, &range))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let chunk = body_bytes(response).await;
        assert!(chunk.len() <= 256);
        reassembled.extend_from_slice(&chunk);
    }

    assert_eq!(reassembled, data);
}

#[tokio::test]
async fn test_request_without_range_streams_whole_resource() {
    let data = patterned(5000);
    let app = app(&data, 1_000_000).await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/stream/{}", app.resource_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(
        response.headers().get(header::ACCEPT_RANGES).unwrap(),
        "bytes"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );
    assert_eq!(body_bytes(response).await, data);
}

#[tokio::test]
async fn test_range_past_end_is_416_with_total_size() {
    let app = app(&patterned(500), 1_000_000).await;

    let response = app
        .router
        .clone()
        .oneshot(get_range(
            &format!("/stream/{}", app.resource_id),
            "bytes=600-",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes */500"
    );
}

#[tokio::test]
async fn test_denied_viewer_gets_403() {
    let app = app_with_gate(&patterned(100), 1_000_000, Arc::new(DenyingGate)).await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/stream/{}", app.resource_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_viewer_identity_is_401() {
    let app = app(&patterned(100), 1_000_000).await;

    let request = Request::builder()
        .uri(format!("/stream/{}", app.resource_id))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_resource_is_404() {
    let app = app(&patterned(100), 1_000_000).await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/stream/{}", "0".repeat(32))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_resource_id_is_400() {
    let app = app(&patterned(100), 1_000_000).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/stream/not-a-resource-id"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_round_trip() {
    let app = app(&patterned(100), 1_000_000).await;
    let uri = format!("/stream/{}/progress", app.resource_id);

    // Nothing recorded yet
    let response = app.router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let empty: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(empty["progress"], 0.0);
    assert!(empty["duration"].is_null());

    let request = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("x-viewer-id", "viewer-1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"progress": 42.5, "duration": 7200}"#))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.clone().oneshot(get(&uri)).await.unwrap();
    let recorded: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(recorded["progress"], 42.5);
    assert_eq!(recorded["duration"], 7200);
    assert!(recorded["last_watched_epoch_secs"].is_number());
}

#[tokio::test]
async fn test_out_of_bounds_progress_is_rejected() {
    let app = app(&patterned(100), 1_000_000).await;

    for body in [
        r#"{"progress": 150.0}"#,
        r#"{"progress": -1.0}"#,
        r#"{"progress": null}"#,
    ] {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/stream/{}/progress", app.resource_id))
            .header("x-viewer-id", "viewer-1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_ne!(response.status(), StatusCode::OK, "accepted {body}");
    }
}

#[tokio::test]
async fn test_completed_stream_records_one_view() {
    let app = app(&patterned(100), 1_000_000).await;
    let resource_id: ResourceId = app.resource_id.parse().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get_range(
            &format!("/stream/{}", app.resource_id),
            "bytes=0-",
        ))
        .await
        .unwrap();
    let body = body_bytes(response).await;
    assert_eq!(body.len(), 100);
    settle().await;

    assert_eq!(app.tracker.view_count(resource_id).await, 1);
    let progress = app
        .tracker
        .progress(&ViewerId::new("viewer-1"), resource_id)
        .await
        .unwrap();
    assert_eq!(progress.percent, 100.0);
}

#[tokio::test]
async fn test_library_listing() {
    let app = app(&patterned(2048), 1_000_000).await;

    let request = Request::builder()
        .uri("/api/library")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], app.resource_id);
    assert_eq!(entries[0]["title"], "feature");
    assert_eq!(entries[0]["mime_type"], "video/mp4");
    assert_eq!(entries[0]["size_bytes"], 2048);
}

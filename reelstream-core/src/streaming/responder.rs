//! End-to-end orchestration of one streaming request.
//!
//! The responder consults the access gate, resolves the resource, parses
//! and plans the range, opens a bounded read over the media source, and
//! hands the transport a flow-controlled byte stream. The planned interval
//! is never buffered whole: bytes move through a fixed-capacity reader as
//! the client consumes them, so a slow client suspends storage reads.
//!
//! Client disconnects drop the body stream, which releases the storage
//! handle immediately and marks the session `Aborted` - cancellation is
//! signalled by the transport, no separate token exists. Failures after
//! headers are sent cannot become error responses; the connection is
//! terminated and the client recovers with a fresh range request.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use super::chunk::{ChunkPlanner, ServePlan};
use super::range::parse_range_header;
use super::session::{AccessDecision, AccessGate, SessionState, SessionTracker, StreamSession};
use super::source::MediaSource;
use super::{StreamError, ViewerId};
use crate::catalog::{MediaCatalog, ResourceId};
use crate::config::StreamingConfig;

/// Serves streaming requests end-to-end.
///
/// One responder is shared by all connections; each request runs in its own
/// task and owns its own session and read handle.
pub struct StreamResponder {
    catalog: Arc<dyn MediaCatalog>,
    source: Arc<dyn MediaSource>,
    gate: Arc<dyn AccessGate>,
    tracker: Arc<dyn SessionTracker>,
    planner: ChunkPlanner,
    read_buffer_size: usize,
}

impl StreamResponder {
    /// Creates a responder wired to its collaborators.
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        source: Arc<dyn MediaSource>,
        gate: Arc<dyn AccessGate>,
        tracker: Arc<dyn SessionTracker>,
        config: &StreamingConfig,
    ) -> Self {
        Self {
            catalog,
            source,
            gate,
            tracker,
            planner: ChunkPlanner::new(config.max_chunk_size),
            read_buffer_size: config.read_buffer_size,
        }
    }

    /// Handles one streaming request and produces the HTTP response.
    ///
    /// All failures resolve here; the returned response is 206/200 on
    /// success or 403/404/416/500 as described by the error taxonomy.
    pub async fn respond(
        &self,
        viewer: ViewerId,
        resource_id: ResourceId,
        range_header: Option<&str>,
    ) -> Response {
        match self.try_respond(viewer, resource_id, range_header).await {
            Ok(response) => response,
            Err(err) => Self::error_response(err),
        }
    }

    async fn try_respond(
        &self,
        viewer: ViewerId,
        resource_id: ResourceId,
        range_header: Option<&str>,
    ) -> Result<Response, StreamError> {
        // The gate runs before the source is touched, so denial leaks
        // nothing about whether the resource exists.
        if let AccessDecision::Deny { reason } =
            self.gate.may_stream(&viewer, resource_id).await
        {
            return Err(StreamError::AccessDenied { reason });
        }

        let resource = self.catalog.resolve(resource_id).await?;
        let total_size = self.source.size(&resource).await?;
        let requested = parse_range_header(range_header, total_size)?;
        let plan = self.planner.plan(requested, total_size);

        info!(
            "Streaming {} for viewer {}: range={:?}, plan={:?}",
            resource_id, viewer, range_header, plan
        );

        let (status, interval_start, planned_len) = match plan {
            ServePlan::Whole { total_size: 0 } => {
                // Empty resource: nothing to read, nothing to report
                return Ok(Self::empty_response(&resource.mime_type));
            }
            ServePlan::Whole { total_size } => (StatusCode::OK, 0, total_size),
            ServePlan::Partial(interval) => {
                (StatusCode::PARTIAL_CONTENT, interval.start, interval.len())
            }
        };

        let handle = self
            .source
            .open_read(&resource, interval_start, interval_start + planned_len - 1)
            .await?;

        let session = StreamSession::new(
            resource_id,
            viewer,
            interval_start,
            planned_len,
            total_size,
        );
        let stream = MeteredStream::new(
            ReaderStream::with_capacity(handle, self.read_buffer_size),
            session,
            Arc::clone(&self.tracker),
        );

        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, Self::header_value(&resource.mime_type))
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CONTENT_LENGTH, planned_len.to_string())
            .header(header::CACHE_CONTROL, "no-cache");

        if let ServePlan::Partial(interval) = plan {
            builder = builder.header(
                header::CONTENT_RANGE,
                Self::header_value(&interval.content_range()),
            );
        }

        Ok(builder
            .body(Body::from_stream(stream))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
    }

    /// 200 response for a zero-byte resource.
    fn empty_response(mime_type: &str) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, Self::header_value(mime_type))
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CONTENT_LENGTH, "0")
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }

    fn header_value(value: &str) -> HeaderValue {
        HeaderValue::from_str(value)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
    }

    /// Maps the error taxonomy to terminal HTTP responses.
    fn error_response(err: StreamError) -> Response {
        match err {
            StreamError::AccessDenied { reason } => {
                warn!("Stream request denied: {reason}");
                (StatusCode::FORBIDDEN, "Access denied").into_response()
            }
            StreamError::ResourceNotFound { resource_id } => {
                info!("Stream request for unknown resource {resource_id}");
                (StatusCode::NOT_FOUND, "Resource not found").into_response()
            }
            StreamError::RangeNotSatisfiable { total_size } => {
                info!("Unsatisfiable range request against {total_size}-byte resource");
                Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(
                        header::CONTENT_RANGE,
                        Self::header_value(&format!("bytes */{total_size}")),
                    )
                    .body(Body::empty())
                    .unwrap_or_else(|_| StatusCode::RANGE_NOT_SATISFIABLE.into_response())
            }
            StreamError::Io(e) => {
                error!("Storage failure while streaming: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure").into_response()
            }
        }
    }
}

/// Byte stream that carries the session state machine through the transfer.
///
/// Wraps the bounded storage read, counts delivered bytes, emits the view
/// event when the first byte goes out, and resolves the terminal session
/// state when the stream ends or is dropped. Dropping this stream drops the
/// inner reader and with it the OS file handle.
struct MeteredStream<S> {
    inner: S,
    session: StreamSession,
    tracker: Arc<dyn SessionTracker>,
}

impl<S> MeteredStream<S> {
    fn new(inner: S, session: StreamSession, tracker: Arc<dyn SessionTracker>) -> Self {
        Self {
            inner,
            session,
            tracker,
        }
    }

    /// Fire-and-forget event emission; stream polling never waits on the
    /// tracker.
    fn emit_viewed(&self) {
        let tracker = Arc::clone(&self.tracker);
        let viewer = self.session.viewer_id.clone();
        let resource_id = self.session.resource_id;
        tokio::spawn(async move {
            tracker.record_viewed(&viewer, resource_id).await;
        });
    }
}

impl<S> Stream for MeteredStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if this.session.state == SessionState::Opened && !chunk.is_empty() {
                    this.session.state = SessionState::Streaming;
                    this.emit_viewed();
                }
                this.session.bytes_transferred += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.session.state = SessionState::Failed;
                error!(
                    "Storage read failed after {} of {} bytes for {}: {e}",
                    this.session.bytes_transferred, this.session.planned_len,
                    this.session.resource_id
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if this.session.bytes_transferred == this.session.planned_len {
                    this.session.state = SessionState::Completed;
                } else {
                    // Backing store ended early; the client sees a short read
                    this.session.state = SessionState::Failed;
                    error!(
                        "Short read: {} of {} bytes for {}",
                        this.session.bytes_transferred, this.session.planned_len,
                        this.session.resource_id
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S> Drop for MeteredStream<S> {
    fn drop(&mut self) {
        if matches!(
            self.session.state,
            SessionState::Opened | SessionState::Streaming
        ) {
            // Dropped before the interval finished: client went away
            self.session.state = SessionState::Aborted;
            debug!(
                "Client disconnected after {} of {} bytes for {}",
                self.session.bytes_transferred, self.session.planned_len,
                self.session.resource_id
            );
        }

        if matches!(
            self.session.state,
            SessionState::Completed | SessionState::Aborted
        ) && self.session.bytes_transferred > 0
        {
            let tracker = Arc::clone(&self.tracker);
            let viewer = self.session.viewer_id.clone();
            let resource_id = self.session.resource_id;
            let percent = self.session.percent_complete();
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    tracker
                        .record_progress(&viewer, resource_id, percent, None)
                        .await;
                });
            }
        }
    }
}

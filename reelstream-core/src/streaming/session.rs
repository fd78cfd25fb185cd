//! Stream session state and boundary collaborator traits.
//!
//! The streaming core owns a `StreamSession` for the duration of one HTTP
//! exchange and reports what happened through `SessionTracker`; it consults
//! `AccessGate` before serving a single byte. Durable storage of watch
//! history and view counters belongs to the collaborators, never to the
//! core - the core's obligation is to emit one event per logical viewing
//! action, not to serialize any counter itself.

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::ResourceId;

/// Identity of the viewer issuing a request.
///
/// Produced by the external authentication layer; opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerId(String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Access granted and interval planned; no bytes sent yet
    Opened,
    /// At least one byte handed to the transport
    Streaming,
    /// Every planned byte was transferred
    Completed,
    /// Client disconnected or cancelled mid-transfer; not a failure
    Aborted,
    /// Storage reported an error before or during the transfer
    Failed,
}

/// One in-flight transfer, owned exclusively by the responder.
///
/// Destroyed when the HTTP exchange ends; never persisted. Progress is
/// derived from it and forwarded to the `SessionTracker`, which owns
/// durable watch history.
#[derive(Debug, Clone)]
pub struct StreamSession {
    pub resource_id: ResourceId,
    pub viewer_id: ViewerId,
    /// First byte offset of the planned transfer
    pub interval_start: u64,
    /// Bytes this response is expected to carry
    pub planned_len: u64,
    /// Total resource size, for deriving percent complete
    pub total_size: u64,
    pub bytes_transferred: u64,
    pub state: SessionState,
}

impl StreamSession {
    pub fn new(
        resource_id: ResourceId,
        viewer_id: ViewerId,
        interval_start: u64,
        planned_len: u64,
        total_size: u64,
    ) -> Self {
        Self {
            resource_id,
            viewer_id,
            interval_start,
            planned_len,
            total_size,
            bytes_transferred: 0,
            state: SessionState::Opened,
        }
    }

    /// Percent of the whole resource delivered up to and including this
    /// transfer, derived from byte positions only.
    pub fn percent_complete(&self) -> f64 {
        if self.total_size == 0 {
            return 100.0;
        }
        let position = self.interval_start + self.bytes_transferred;
        (position as f64 / self.total_size as f64) * 100.0
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny {
        /// Why the gate vetoed; logged but never leaked to the client
        reason: String,
    },
}

/// External authorization check consulted before serving bytes.
///
/// Subscription tiers, account state, and regional availability all live
/// behind this boundary.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Answers "may this viewer stream this resource right now?".
    async fn may_stream(&self, viewer: &ViewerId, resource_id: ResourceId) -> AccessDecision;
}

/// Durable watch progress as reported back to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProgress {
    /// Percent complete, 0 to 100
    pub percent: f64,
    /// Total playback duration in seconds, when the client reported one
    pub total_duration_secs: Option<u64>,
    /// When this entry was last updated
    pub updated_at: SystemTime,
}

/// External collaborator owning view counts and watch history.
///
/// Implementations apply their own updates atomically; the core only emits
/// events, exactly one view event per top-level request.
#[async_trait]
pub trait SessionTracker: Send + Sync {
    /// Records that this request delivered at least one byte of the
    /// resource. Idempotent per request: called at most once per HTTP
    /// exchange regardless of how many chunks playback requires overall.
    async fn record_viewed(&self, viewer: &ViewerId, resource_id: ResourceId);

    /// Records how far through the resource the viewer has been served.
    async fn record_progress(
        &self,
        viewer: &ViewerId,
        resource_id: ResourceId,
        percent: f64,
        total_duration_secs: Option<u64>,
    );

    /// Returns the last recorded progress for this viewer and resource.
    async fn progress(&self, viewer: &ViewerId, resource_id: ResourceId) -> Option<WatchProgress>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(interval_start: u64, planned_len: u64, total_size: u64) -> StreamSession {
        StreamSession::new(
            ResourceId::new([0u8; 16]),
            ViewerId::new("viewer-1"),
            interval_start,
            planned_len,
            total_size,
        )
    }

    #[test]
    fn test_new_session_is_opened() {
        let session = session(0, 100, 1000);
        assert_eq!(session.state, SessionState::Opened);
        assert_eq!(session.bytes_transferred, 0);
    }

    #[test]
    fn test_percent_complete_derived_from_byte_position() {
        let mut session = session(500, 500, 1000);
        assert_eq!(session.percent_complete(), 50.0);

        session.bytes_transferred = 500;
        assert_eq!(session.percent_complete(), 100.0);
    }

    #[test]
    fn test_percent_complete_empty_resource() {
        let session = session(0, 0, 0);
        assert_eq!(session.percent_complete(), 100.0);
    }
}

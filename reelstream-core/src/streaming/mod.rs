//! Range-based media delivery pipeline.
//!
//! This module implements partial-content streaming for large pre-encoded
//! files: `range` parses and validates the HTTP Range header, `chunk` bounds
//! how much a single response may carry, `source` abstracts the seekable
//! backing store, and `responder` orchestrates one request end-to-end while
//! reporting view and progress events through the `session` boundary traits.

pub mod chunk;
pub mod range;
pub mod responder;
pub mod session;
pub mod source;

pub use chunk::{ChunkPlanner, ServePlan, ServedInterval};
pub use range::{RequestedRange, parse_range_header};
pub use responder::StreamResponder;
pub use session::{
    AccessDecision, AccessGate, SessionState, SessionTracker, StreamSession, ViewerId,
    WatchProgress,
};
pub use source::{BoundedRead, FsMediaSource, MediaSource};

use crate::catalog::ResourceId;

/// Errors that can occur while serving a streaming request.
///
/// Every variant resolves at the single request boundary; none propagate
/// past the responder. A mid-stream failure after headers are sent cannot
/// be converted to an error response and instead terminates the connection,
/// leaving the client to detect the short read and retry with a fresh range.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Locator does not resolve to an existing, readable object
    #[error("Resource {resource_id} not found")]
    ResourceNotFound {
        /// Id of the resource that could not be resolved
        resource_id: ResourceId,
    },

    /// Requested range starts beyond the end of the resource, or the Range
    /// header is present but malformed beyond what clamping can repair
    #[error("Range not satisfiable for resource of {total_size} bytes")]
    RangeNotSatisfiable {
        /// Total resource size advertised back to the client
        total_size: u64,
    },

    /// The access gate vetoed the request
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// Reason reported by the gate; never sent to the client
        reason: String,
    },

    /// Storage failure while opening or reading the resource
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

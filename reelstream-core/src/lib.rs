//! Reelstream Core - Range-based media delivery
//!
//! This crate provides the fundamental building blocks for serving large
//! pre-encoded media files over HTTP byte ranges: range-request parsing,
//! chunk planning, file-backed media sources, the streaming responder, and
//! configuration management. Account handling, subscription gating, and
//! watch-history persistence are external collaborators consumed through
//! the `AccessGate` and `SessionTracker` traits.

pub mod catalog;
pub mod config;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use catalog::{MediaCatalog, MediaLibrary, MediaResource, ResourceId};
pub use config::ReelstreamConfig;
pub use streaming::{StreamError, StreamResponder};

/// Core errors that can bubble up from any Reelstream subsystem.
///
/// High-level error types representing failures in core functionality.
#[derive(Debug, thiserror::Error)]
pub enum ReelstreamError {
    #[error("Streaming error: {0}")]
    Stream(#[from] StreamError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelstreamError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ReelstreamError::Stream(e) => match e {
                StreamError::ResourceNotFound { resource_id } => {
                    format!("Resource {resource_id} not found")
                }
                StreamError::RangeNotSatisfiable { total_size } => {
                    format!("Requested range is outside the resource ({total_size} bytes)")
                }
                StreamError::AccessDenied { .. } => "Access denied".to_string(),
                StreamError::Io(_) => "Storage error occurred".to_string(),
            },
            ReelstreamError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
            ReelstreamError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReelstreamError>;

//! Catalog of playable media resources.
//!
//! The streaming core never owns content records; it resolves a resource id
//! to immutable per-request metadata (storage locator, size, MIME type)
//! through the `MediaCatalog` boundary. `MediaLibrary` is the built-in
//! directory-backed implementation for locally published files.

pub mod library;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
pub use library::MediaLibrary;

use crate::streaming::StreamError;

/// Identifies a playable media resource in the catalog.
///
/// Derived deterministically from the resource's storage path so that ids
/// remain stable across server restarts without any persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId([u8; 16]);

impl ResourceId {
    /// Creates ResourceId from a 16-byte identifier.
    pub fn new(id: [u8; 16]) -> Self {
        Self(id)
    }

    /// Parses a ResourceId from its 32-character hex representation.
    ///
    /// # Errors
    ///
    /// Returns an error string if the input is not exactly 32 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let bytes = hex::decode(hex_str).map_err(|e| format!("Invalid resource id: {e}"))?;
        let id: [u8; 16] = bytes
            .try_into()
            .map_err(|_| "Invalid resource id: expected 16 bytes".to_string())?;
        Ok(Self(id))
    }

    /// Returns reference to underlying 16-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ResourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Immutable metadata for a playable asset.
///
/// Created when a title is published; treated as read-only for the lifetime
/// of a streaming request. The size recorded here is informational; the
/// responder reads the authoritative size from the backing store once per
/// request.
#[derive(Debug, Clone)]
pub struct MediaResource {
    /// Catalog identifier for this resource
    pub id: ResourceId,
    /// Opaque locator resolved by the media source (a file path here)
    pub storage_locator: PathBuf,
    /// Size of the backing file when it was catalogued
    pub total_size_bytes: u64,
    /// Declared MIME type served in Content-Type
    pub mime_type: String,
    /// Display title extracted from the filename
    pub title: String,
}

/// Resolves resource ids to playable metadata.
///
/// The catalog collaborator owns content records; the streaming core only
/// reads them. Implementations must be cheap to call per request.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Resolves a resource id to its metadata.
    ///
    /// # Errors
    ///
    /// - `StreamError::ResourceNotFound` - Id does not identify a published resource
    async fn resolve(&self, resource_id: ResourceId) -> Result<MediaResource, StreamError>;
}

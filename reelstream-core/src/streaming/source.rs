//! Seekable byte-addressable media sources.
//!
//! `MediaSource` abstracts the backing store behind a size query and a
//! bounded-read capability. The production implementation reads plain files
//! on durable storage; tests substitute in-memory doubles to observe
//! open/close behavior.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt};
use tracing::debug;

use super::StreamError;
use crate::catalog::MediaResource;

/// Handle yielding exactly the requested interval, in order, then EOF.
///
/// Dropping the handle early closes the underlying OS read handle without
/// consuming the remainder of the interval.
pub type BoundedRead = Box<dyn AsyncRead + Send + Unpin>;

/// Abstracts a seekable byte-addressable resource store.
///
/// Implementations only read; streaming never mutates resources. Each
/// in-flight response owns exactly one read handle, never shared across
/// requests.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Returns the total size of the resource in bytes.
    ///
    /// Read once per request and trusted for the duration of that request.
    ///
    /// # Errors
    ///
    /// - `StreamError::ResourceNotFound` - Locator does not resolve to an existing, readable object
    /// - `StreamError::Io` - Storage unavailable or permission failure
    async fn size(&self, resource: &MediaResource) -> Result<u64, StreamError>;

    /// Opens a bounded read over `[start, end]` (inclusive).
    ///
    /// The returned handle yields exactly `end - start + 1` bytes and
    /// supports early termination by dropping it.
    ///
    /// # Errors
    ///
    /// - `StreamError::ResourceNotFound` - Locator does not resolve to an existing, readable object
    /// - `StreamError::Io` - Open or seek failed
    async fn open_read(
        &self,
        resource: &MediaResource,
        start: u64,
        end: u64,
    ) -> Result<BoundedRead, StreamError>;
}

/// File-backed media source resolving locators under a root directory.
#[derive(Debug, Clone)]
pub struct FsMediaSource {
    root: PathBuf,
}

impl FsMediaSource {
    /// Creates a source serving files under the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a storage locator to a concrete path.
    ///
    /// Absolute locators (as produced by `MediaLibrary`) are used as-is;
    /// relative locators are joined onto the root.
    fn resolve_path(&self, locator: &Path) -> PathBuf {
        if locator.is_absolute() {
            locator.to_path_buf()
        } else {
            self.root.join(locator)
        }
    }

    fn map_open_error(err: std::io::Error, resource: &MediaResource) -> StreamError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StreamError::ResourceNotFound {
                resource_id: resource.id,
            }
        } else {
            StreamError::Io(err)
        }
    }
}

#[async_trait]
impl MediaSource for FsMediaSource {
    async fn size(&self, resource: &MediaResource) -> Result<u64, StreamError> {
        let path = self.resolve_path(&resource.storage_locator);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Self::map_open_error(e, resource))?;

        if !metadata.is_file() {
            return Err(StreamError::ResourceNotFound {
                resource_id: resource.id,
            });
        }

        Ok(metadata.len())
    }

    async fn open_read(
        &self,
        resource: &MediaResource,
        start: u64,
        end: u64,
    ) -> Result<BoundedRead, StreamError> {
        debug_assert!(start <= end);

        let path = self.resolve_path(&resource.storage_locator);
        let mut file = File::open(&path)
            .await
            .map_err(|e| Self::map_open_error(e, resource))?;

        file.seek(SeekFrom::Start(start)).await?;
        let length = end - start + 1;

        debug!(
            "Opened bounded read {}..={} ({} bytes) for {}",
            start, end, length, resource.id
        );

        Ok(Box::new(tokio::io::AsyncReadExt::take(file, length)))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tokio::fs;
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::catalog::ResourceId;

    fn resource_for(path: PathBuf, size: u64) -> MediaResource {
        MediaResource {
            id: ResourceId::new([1u8; 16]),
            storage_locator: path,
            total_size_bytes: size,
            mime_type: "video/mp4".to_string(),
            title: "test".to_string(),
        }
    }

    async fn fixture(content: &[u8]) -> (TempDir, MediaResource) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clip.mp4");
        fs::write(&path, content).await.unwrap();
        let resource = resource_for(path, content.len() as u64);
        (temp_dir, resource)
    }

    #[tokio::test]
    async fn test_size_reads_backing_store() {
        let (temp_dir, resource) = fixture(b"0123456789").await;
        let source = FsMediaSource::new(temp_dir.path());

        assert_eq!(source.size(&resource).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_open_read_yields_exact_interval() {
        let (temp_dir, resource) = fixture(b"0123456789").await;
        let source = FsMediaSource::new(temp_dir.path());

        let mut handle = source.open_read(&resource, 2, 6).await.unwrap();
        let mut buffer = Vec::new();
        handle.read_to_end(&mut buffer).await.unwrap();

        assert_eq!(&buffer, b"23456");
    }

    #[tokio::test]
    async fn test_open_read_full_interval() {
        let (temp_dir, resource) = fixture(b"abcdef").await;
        let source = FsMediaSource::new(temp_dir.path());

        let mut handle = source.open_read(&resource, 0, 5).await.unwrap();
        let mut buffer = Vec::new();
        handle.read_to_end(&mut buffer).await.unwrap();

        assert_eq!(&buffer, b"abcdef");
    }

    #[tokio::test]
    async fn test_missing_file_is_resource_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let source = FsMediaSource::new(temp_dir.path());
        let resource = resource_for(temp_dir.path().join("gone.mp4"), 100);

        let result = source.size(&resource).await;
        assert!(matches!(
            result,
            Err(StreamError::ResourceNotFound { .. })
        ));

        let result = source.open_read(&resource, 0, 10).await;
        assert!(matches!(
            result,
            Err(StreamError::ResourceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_relative_locator_resolves_under_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("clip.mp4"), b"hello world")
            .await
            .unwrap();
        let source = FsMediaSource::new(temp_dir.path());
        let resource = resource_for(PathBuf::from("clip.mp4"), 11);

        assert_eq!(source.size(&resource).await.unwrap(), 11);
    }
}

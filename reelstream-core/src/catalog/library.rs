//! Directory-backed media library.
//!
//! Scans a media root for playable files and builds catalog entries with
//! deterministic ids, so the server can run against a plain directory of
//! pre-encoded videos without any database.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{MediaCatalog, MediaResource, ResourceId};
use crate::streaming::StreamError;

/// File extensions considered playable media.
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "m4v", "webm", "flv"];

/// Catalog of media files discovered under a root directory.
#[derive(Debug, Default)]
pub struct MediaLibrary {
    /// Map from resource id to catalog entry
    resources: HashMap<ResourceId, MediaResource>,
}

impl MediaLibrary {
    /// Create new empty media library
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    /// Scan directory for media files and create catalog entries
    ///
    /// # Errors
    /// - `std::io::Error` - Failed to read directory or file metadata
    pub async fn scan_directory(&mut self, dir: &Path) -> Result<usize, std::io::Error> {
        self.scan_directory_recursive(dir).await
    }

    /// Recursively scan directory for media files
    fn scan_directory_recursive<'a>(
        &'a mut self,
        dir: &'a Path,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<usize, std::io::Error>> + 'a>>
    {
        Box::pin(async move {
            let mut count = 0;
            let mut entries = tokio::fs::read_dir(dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();

                if path.is_dir() {
                    match self.scan_directory_recursive(&path).await {
                        Ok(subcount) => count += subcount,
                        Err(e) => warn!("Failed to scan {}: {}", path.display(), e),
                    }
                } else if path.is_file() {
                    if let Some(extension) = path.extension() {
                        let ext = extension.to_string_lossy().to_lowercase();
                        if MEDIA_EXTENSIONS.contains(&ext.as_str())
                            && let Ok(metadata) = entry.metadata().await
                        {
                            let resource = Self::resource_from_path(path, metadata.len());
                            debug!(
                                "Catalogued {} as {} ({} bytes)",
                                resource.title, resource.id, resource.total_size_bytes
                            );
                            self.resources.insert(resource.id, resource);
                            count += 1;
                        }
                    }
                }
            }

            Ok(count)
        })
    }

    /// Find resource by id
    pub fn resource_by_id(&self, resource_id: ResourceId) -> Option<&MediaResource> {
        self.resources.get(&resource_id)
    }

    /// Get all catalogued resources
    pub fn all_resources(&self) -> Vec<&MediaResource> {
        self.resources.values().collect()
    }

    /// Create catalog entry from file path
    fn resource_from_path(path: PathBuf, size: u64) -> MediaResource {
        // Extract title from filename
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown Title")
            .replace(['.', '_'], " ");

        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let id = Self::generate_resource_id(&path);

        MediaResource {
            id,
            storage_locator: path,
            total_size_bytes: size,
            mime_type,
            title,
        }
    }

    /// Generate deterministic resource id from file path
    fn generate_resource_id(path: &Path) -> ResourceId {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        let hash = hasher.finish();

        // Spread the u64 hash across the 16-byte id
        let mut id_bytes = [0u8; 16];
        id_bytes[0..8].copy_from_slice(&hash.to_be_bytes());
        for (offset, byte) in id_bytes.iter_mut().enumerate().skip(8) {
            *byte = ((hash >> (offset % 8)) & 0xFF) as u8;
        }

        ResourceId::new(id_bytes)
    }
}

#[async_trait]
impl MediaCatalog for MediaLibrary {
    async fn resolve(&self, resource_id: ResourceId) -> Result<MediaResource, StreamError> {
        self.resources
            .get(&resource_id)
            .cloned()
            .ok_or(StreamError::ResourceNotFound { resource_id })
    }
}

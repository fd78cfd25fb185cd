//! Centralized configuration for Reelstream.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;

/// Central configuration for all Reelstream components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ReelstreamConfig {
    pub streaming: StreamingConfig,
    pub library: LibraryConfig,
    pub server: ServerConfig,
}

/// Range-streaming behavior configuration.
///
/// Controls how much data a single partial-content response may carry and
/// how large the per-read buffer is while transferring it.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Maximum number of bytes served by a single response.
    ///
    /// Clients requesting more than this (or issuing open-ended ranges)
    /// receive a bounded chunk and continue with follow-up range requests.
    pub max_chunk_size: u64,
    /// Buffer size for storage reads while streaming
    pub read_buffer_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1_048_576, // 1 MiB per partial response
            read_buffer_size: 65536,   // 64 KiB
        }
    }
}

/// Media library configuration.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Root directory containing published media files
    pub media_root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ReelstreamConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(chunk) = std::env::var("REELSTREAM_MAX_CHUNK_SIZE") {
            if let Ok(bytes) = chunk.parse::<u64>() {
                if bytes > 0 {
                    config.streaming.max_chunk_size = bytes;
                }
            }
        }

        if let Ok(buffer) = std::env::var("REELSTREAM_READ_BUFFER_SIZE") {
            if let Ok(bytes) = buffer.parse::<usize>() {
                if bytes > 0 {
                    config.streaming.read_buffer_size = bytes;
                }
            }
        }

        if let Ok(root) = std::env::var("REELSTREAM_MEDIA_ROOT") {
            config.library.media_root = PathBuf::from(root);
        }

        if let Ok(host) = std::env::var("REELSTREAM_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("REELSTREAM_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Uses a small chunk size so multi-chunk behavior is exercised with
    /// tiny fixture files.
    pub fn for_testing() -> Self {
        Self {
            streaming: StreamingConfig {
                max_chunk_size: 256,
                read_buffer_size: 64,
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ReelstreamConfig::default();

        assert_eq!(config.streaming.max_chunk_size, 1_048_576);
        assert_eq!(config.streaming.read_buffer_size, 65536);
        assert_eq!(config.library.media_root, PathBuf::from("media"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_testing_config_uses_small_chunks() {
        let config = ReelstreamConfig::for_testing();

        assert_eq!(config.streaming.max_chunk_size, 256);
        assert!(config.streaming.read_buffer_size <= config.streaming.max_chunk_size as usize);
    }

    // Single test so the env mutations never race a parallel test thread
    #[test]
    fn test_env_overrides() {
        unsafe {
            std::env::set_var("REELSTREAM_MAX_CHUNK_SIZE", "524288");
            std::env::set_var("REELSTREAM_READ_BUFFER_SIZE", "16384");
            std::env::set_var("REELSTREAM_PORT", "8080");
        }

        let config = ReelstreamConfig::from_env();

        assert_eq!(config.streaming.max_chunk_size, 524_288);
        assert_eq!(config.streaming.read_buffer_size, 16384);
        assert_eq!(config.server.port, 8080);

        // Zero chunk size is rejected, the default stands
        unsafe {
            std::env::set_var("REELSTREAM_MAX_CHUNK_SIZE", "0");
        }
        let config = ReelstreamConfig::from_env();
        assert_eq!(config.streaming.max_chunk_size, 1_048_576);

        unsafe {
            std::env::remove_var("REELSTREAM_MAX_CHUNK_SIZE");
            std::env::remove_var("REELSTREAM_READ_BUFFER_SIZE");
            std::env::remove_var("REELSTREAM_PORT");
        }
    }
}

//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use reelstream_core::catalog::MediaLibrary;
use reelstream_core::config::ReelstreamConfig;
use reelstream_web::server::run_server;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory containing published media files
        #[arg(long)]
        media_dir: Option<PathBuf>,
    },
    /// Scan a media directory and print the resulting catalog
    Scan {
        /// Directory to scan (defaults to the configured media root)
        media_dir: Option<PathBuf>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            media_dir,
        } => serve(host, port, media_dir).await,
        Commands::Scan { media_dir } => scan(media_dir).await,
    }
}

/// Start the streaming server
///
/// Configuration comes from the environment; command-line flags override it.
///
/// # Errors
/// - Media root cannot be scanned
/// - Listen address cannot be bound
pub async fn serve(
    host: Option<String>,
    port: Option<u16>,
    media_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ReelstreamConfig::from_env();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(media_dir) = media_dir {
        config.library.media_root = media_dir;
    }

    println!("Starting Reelstream media server...");
    println!("Media root: {}", config.library.media_root.display());
    println!(
        "Library: http://{}:{}/api/library",
        config.server.host, config.server.port
    );
    println!(
        "Streams: http://{}:{}/stream/<resource-id>",
        config.server.host, config.server.port
    );
    println!();
    println!("Press Ctrl+C to stop the server");

    run_server(config)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {e}"))
}

/// Scan a media directory and print the catalog that would be served
///
/// # Errors
/// - Directory cannot be read
pub async fn scan(media_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ReelstreamConfig::from_env();
    let root = media_dir.unwrap_or(config.library.media_root);

    let mut library = MediaLibrary::new();
    let count = library
        .scan_directory(&root)
        .await
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    println!("Catalogued {count} media files under {}", root.display());
    println!("{:-<72}", "");

    let mut resources = library.all_resources();
    resources.sort_by(|a, b| a.title.cmp(&b.title));
    for resource in resources {
        println!(
            "{}  {:>12} bytes  {:<24}  {}",
            resource.id, resource.total_size_bytes, resource.mime_type, resource.title
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_scan_lists_media_files() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join("movie.mp4"), b"data")
            .await
            .unwrap();

        let result = scan(Some(temp_dir.path().to_path_buf())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_scan_missing_directory_fails() {
        let result = scan(Some(PathBuf::from("/nonexistent/media/root"))).await;
        assert!(result.is_err());
    }
}

//! Reelstream CLI - Command-line interface
//!
//! Provides command-line access to the Reelstream media server.

mod commands;

use clap::Parser;
use reelstream_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "reelstream")]
#[command(about = "A range-streaming media server")]
struct Cli {
    /// Console log level (the full debug log always goes to logs/)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    commands::handle_command(cli.command).await
}

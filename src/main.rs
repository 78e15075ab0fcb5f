use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{Overrides, init_tracing, load_settings};

/// The main entry point for the FitTrack API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(overrides) => handle_serve(overrides).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backend-for-frontend for the FitTrack workout journal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve(Overrides),
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

async fn handle_serve(overrides: Overrides) -> anyhow::Result<()> {
    let settings = load_settings()
        .context("failed to load settings")?
        .with_overrides(&overrides);

    // Must outlive the server so buffered log lines are flushed.
    let _guard = init_tracing(&settings.server);
    tracing::info!(port = settings.server.port, "Starting FitTrack API.");

    web_server::run_server(&settings).await
}

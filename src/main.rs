//! # Brand Directory Main Entry Point
//!
//! `serve` (the default) applies pending migrations and starts the HTTP server;
//! `migrate` only applies migrations.

use anyhow::Context;
use brand_directory::{
    config::ConfigLoader,
    db::{init_pool, run_migrations},
    server::run_server,
    telemetry::init_tracing,
};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "brand-directory", version, about = "Brand and offer directory service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations, then serve the API and pages
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    init_tracing(&config).context("Failed to initialize tracing")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;
    run_migrations(&db).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => Ok(()),
        Command::Serve => run_server(config, db).await,
    }
}

mod auth;
mod cli;
mod config;
mod error;
mod http;
mod model;
mod pattern;
mod pipeline;
mod providers;
mod tracker;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --debug
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if cli.debug => EnvFilter::new("cardsync=debug"),
        Err(_) => EnvFilter::new("cardsync=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Enabled debug logs");

    cli::run(cli).await
}

//! Relic update server binary entry point.
//!
//! This is a thin wrapper around the relic-update library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Loads configuration and the content store
//! 4. Starts the server
//!
//! For library usage, see the relic-update crate documentation.

use anyhow::Result;
use relic_update::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Relic update server starting...");

    // Parse configuration from CLI args
    let config = ServerConfig::from_args();

    tracing::info!(
        "Configuration loaded: bind={}, store={:?}, client version {}",
        config.tcp_bind,
        config.store,
        config.client_version
    );

    // Validate configuration
    config.validate()?;

    // Create and run server
    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}

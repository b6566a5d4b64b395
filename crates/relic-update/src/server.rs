//! Server state management and orchestration.
//!
//! Startup is deliberately blocking and ordered: load the content store,
//! build the summary tables, then — and only then — start accepting
//! connections. No client traffic is served during the load, so nothing
//! here needs synchronization beyond `Arc` sharing of the finished,
//! immutable state.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::summary::SummaryTables;
use relic_store::{ContentStore, DiskStore};
use std::sync::Arc;

/// Shared application state handed to every connection task.
#[derive(Clone)]
pub struct AppState {
    /// Loaded content store (immutable while serving)
    store: Arc<dyn ContentStore>,
    /// Startup-built summary tables
    tables: Arc<SummaryTables>,
    /// Client version accepted at handshake
    supported_version: i32,
}

impl AppState {
    /// Create application state from configuration: load the disk store and
    /// build the summary tables.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store cannot be loaded.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Loading content store from {:?}", config.store);
        let store = DiskStore::load(&config.store)?;
        Ok(Self::from_store(Arc::new(store), config.client_version))
    }

    /// Create application state around an already-loaded store.
    ///
    /// Used by tests and embedders that build a [`relic_store::MemoryStore`]
    /// programmatically.
    #[must_use]
    pub fn from_store(store: Arc<dyn ContentStore>, supported_version: i32) -> Self {
        let tables = Arc::new(SummaryTables::build(store.as_ref()));
        Self {
            store,
            tables,
            supported_version,
        }
    }

    /// Get the shared content store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Get the shared summary tables.
    #[must_use]
    pub fn tables(&self) -> &Arc<SummaryTables> {
        &self.tables
    }

    /// Client version accepted at handshake.
    #[must_use]
    pub const fn supported_version(&self) -> i32 {
        self.supported_version
    }
}

/// Server orchestration.
pub struct Server {
    /// Shared application state
    state: Arc<AppState>,
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create a new server with configuration.
    ///
    /// Loads the content store and builds the summary tables before
    /// returning, so a successfully constructed server is ready to accept.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the store cannot be loaded.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;

        tracing::info!(
            "Server initialized: {} archives, accepting client version {}",
            state.tables().archive_count(),
            state.supported_version()
        );

        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    /// Run the server until interrupted.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the shutdown signal cannot
    /// be installed.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting update server on {}", self.config.tcp_bind);

        let state = self.state.clone();
        let bind = self.config.tcp_bind;

        let tcp_server = tokio::spawn(async move {
            if let Err(e) = crate::tcp::start_server(bind, state).await {
                tracing::error!("TCP server failed: {e}");
            }
        });

        // Wait for shutdown signal
        tokio::signal::ctrl_c().await.map_err(|e| {
            ServerError::Shutdown(format!("Failed to listen for shutdown signal: {e}"))
        })?;

        tracing::info!("Shutdown signal received, stopping server");
        tcp_server.abort();

        Ok(())
    }

    /// Get shared application state (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

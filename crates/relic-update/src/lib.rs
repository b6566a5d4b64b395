//! TCP asset-update server for legacy game clients.
//!
//! Clients connect, perform a one-shot version handshake, then stream small
//! binary file requests; the server answers each with a chunk of the
//! versioned content store, framed in the legacy block format (a 3-byte
//! header plus a `0xFF` marker byte every 512 bytes of cumulative output).
//!
//! # Architecture
//!
//! The server uses a library-first design with the following components:
//! - `server`: orchestration — load store, build tables, accept connections
//! - `config`: configuration loading and validation
//! - `session`: per-connection protocol state machine (handshake + commands)
//! - `codec`: the wire chunk codec (block framing and its inverse)
//! - `queue`: per-connection FIFO of pending file requests
//! - `summary`: startup-built master CRC table and descriptor records
//! - `tcp`: TCP listener and per-connection tasks
//!
//! The content store itself lives in the `relic-store` crate behind the
//! [`relic_store::ContentStore`] trait; this crate never depends on store
//! internals.
//!
//! # Example
//!
//! ```no_run
//! use relic_update::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Initialize logging
//!     tracing_subscriber::fmt::init();
//!
//!     // Load configuration from CLI args and environment
//!     let config = ServerConfig::from_args();
//!     config.validate()?;
//!
//!     // Create and run server
//!     let server = Server::new(config)?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Module declarations
pub mod codec;
pub mod config;
pub mod error;
pub mod queue;
pub mod server;
pub mod session;
pub mod summary;
pub mod tcp;

// Re-exports for public API
pub use codec::{decode_file, encode_file, DecodedFile};
pub use config::ServerConfig;
pub use error::{ConfigError, ProtocolError, ServerError};
pub use queue::{FileRequest, RequestQueue};
pub use server::{AppState, Server};
pub use session::{SessionOutput, UpdateSession, CONNECTION_ACCEPTED, UNSUPPORTED_CLIENT_VERSION};
pub use summary::{SummaryTables, CRC_TABLE_FILE};

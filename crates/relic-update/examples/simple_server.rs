//! Simple update server example.
//!
//! Serves a small in-memory content store, no store directory needed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simple_server
//! ```
//!
//! Then drive it with any client that speaks the protocol: connect to
//! localhost:43594, send the big-endian version 435, read the one-byte
//! acceptance, then send 4-byte requests such as `01 FF 00 FF` (immediate
//! request for the master CRC table).

#![allow(clippy::expect_used)]

use anyhow::Result;
use relic_store::record::wrap_uncompressed;
use relic_store::MemoryStore;
use relic_update::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    // Build a tiny two-archive store in memory
    let mut store = MemoryStore::new();
    store.set_name(0, "config");
    store.set_name(1, "models");
    store.set_descriptor(0, vec![0, 0, 0, 1]);
    store.set_descriptor(1, vec![0, 0, 0, 2]);
    store.insert_record(0, 0, wrap_uncompressed(b"example config entry"));
    store.insert_record(1, 0, wrap_uncompressed(&[0x2A; 2000]));

    let state = Arc::new(AppState::from_store(Arc::new(store), 435));

    let bind = "127.0.0.1:43594".parse().expect("valid bind address");
    relic_update::tcp::start_server(bind, state).await?;

    Ok(())
}

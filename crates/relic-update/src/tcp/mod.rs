//! TCP listener and per-connection driver.
//!
//! One spawned task per accepted socket; the task owns its
//! [`UpdateSession`] and simply shuttles bytes: read a chunk, feed the
//! session, write whatever packets come back. Packets are always
//! constructed in full before any byte hits the socket, so a connection
//! dying mid-drain never leaves a partial packet on the wire — the
//! remaining responses are dropped silently.
//!
//! There is no server-initiated timeout: a client that never completes the
//! handshake holds its connection open until it goes away. That matches the
//! historical protocol; the cost is one idle task.

use crate::error::{ProtocolError, ServerError};
use crate::server::AppState;
use crate::session::UpdateSession;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Inbound read buffer size. Commands are 4 bytes; this is plenty for any
/// realistic burst.
const READ_BUF_LEN: usize = 1024;

/// Start the update server's TCP listener.
///
/// Accepts connections until the task is aborted, spawning one handler task
/// per socket.
///
/// # Errors
///
/// Returns `ServerError` if the listener fails to bind or accepting fails.
pub async fn start_server(bind_addr: SocketAddr, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::BindFailed {
            addr: bind_addr,
            source,
        })?;

    tracing::info!("Update server listening on {bind_addr}");

    loop {
        let (socket, addr) = listener.accept().await.map_err(ServerError::Accept)?;

        let state = state.clone();

        // Spawn a task for each connection
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, state).await {
                tracing::warn!("Connection from {addr} failed: {e}");
            }
        });
    }
}

/// Handle a single client connection until it closes.
///
/// # Errors
///
/// Returns `ProtocolError::Io` only for unexpected socket failures while
/// reading; writes to a vanished peer are treated as a normal close.
async fn handle_connection(
    mut socket: TcpStream,
    state: Arc<AppState>,
) -> Result<(), ProtocolError> {
    let addr = socket.peer_addr()?;
    tracing::debug!("Accepted connection from {addr}");

    let mut session = UpdateSession::new(
        state.store().clone(),
        state.tables().clone(),
        state.supported_version(),
    );
    let mut chunk = [0u8; READ_BUF_LEN];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            tracing::debug!("Connection closed by client: {addr}");
            return Ok(());
        }

        let output = session.receive(&chunk[..n]);

        for packet in &output.packets {
            if socket.write_all(packet).await.is_err() {
                // Peer went away mid-drain: skip the rest, not an error.
                tracing::debug!("Connection {addr} gone, dropping remaining responses");
                return Ok(());
            }
        }

        if output.close {
            tracing::debug!("Closing connection to {addr}");
            socket.shutdown().await?;
            return Ok(());
        }
    }
}

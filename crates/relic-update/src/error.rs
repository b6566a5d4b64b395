//! Error types for the update server.
//!
//! All errors use thiserror for consistent error handling across the codebase.
//!
//! Nothing here is fatal to the process: protocol errors are scoped to one
//! request (the request is dropped, the connection continues) and server
//! errors are scoped to startup or one connection. A rejected handshake and
//! an invalid command kind are protocol *outcomes*, not errors — they are
//! expressed as a response byte and a truncated parse respectively.

use relic_store::{RecordError, StoreError};
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Store directory missing or not a directory
    #[error("Store directory not found: {0}")]
    StoreNotFound(String),
}

/// Server runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind TCP listener
    #[error("Failed to bind TCP server to {addr}: {source}")]
    BindFailed {
        /// Address that failed to bind
        addr: std::net::SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failed to accept a connection
    #[error("Failed to accept TCP connection: {0}")]
    Accept(#[source] std::io::Error),

    /// Content store failed to load
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server shutdown error
    #[error("Server shutdown error: {0}")]
    Shutdown(String),
}

/// Protocol-level errors, scoped to a single file request.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Requested file does not exist in the store
    #[error("File {file} not found in archive {archive}")]
    RecordAbsent {
        /// Archive index of the missing file
        archive: u8,
        /// File index of the missing file
        file: u16,
    },

    /// Stored record failed framing validation
    #[error("Corrupt record for file {file} in archive {archive}: {source}")]
    RecordCorrupt {
        /// Archive index of the corrupt record
        archive: u8,
        /// File index of the corrupt record
        file: u16,
        /// Underlying framing error
        #[source]
        source: RecordError,
    },

    /// Wire packet too short to carry its own header (decode side)
    #[error("Wire packet is {len} bytes, need at least 3 for the header")]
    TruncatedPacket {
        /// Actual packet length
        len: usize,
    },

    /// Expected a 0xFF block marker, found something else (decode side)
    #[error("Bad block marker {found:#04x} at packet offset {offset}")]
    BadMarker {
        /// Byte found where a marker was expected
        found: u8,
        /// Offset of the bad byte within the packet
        offset: usize,
    },

    /// I/O error during protocol handling
    #[error("Protocol I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_messages() {
        let err = ProtocolError::RecordAbsent {
            archive: 4,
            file: 12,
        };
        assert_eq!(err.to_string(), "File 12 not found in archive 4");

        let err = ProtocolError::BadMarker {
            found: 0xAB,
            offset: 512,
        };
        assert_eq!(err.to_string(), "Bad block marker 0xab at packet offset 512");
    }

    #[test]
    fn test_server_error_conversion() {
        let store_err = StoreError::EmptyStore;
        let server_err: ServerError = store_err.into();
        assert!(server_err.to_string().contains("Store is empty"));
    }
}

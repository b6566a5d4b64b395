//! Per-connection protocol state machine.
//!
//! Each accepted socket gets one [`UpdateSession`], owned by that
//! connection's task alone — the queue and state need no locking because no
//! other task can reach them. The session consumes raw inbound byte chunks
//! and produces whole outbound packets; it never touches the socket itself,
//! which keeps the machine fully testable without I/O.
//!
//! # Protocol
//!
//! A connection starts in the handshake phase: the first four inbound bytes
//! are a big-endian signed client version. A match answers with a single
//! `0x00` byte and activates the connection; a mismatch answers `0x06` and
//! the connection is closed. Active connections then stream 4-byte commands:
//!
//! ```text
//! kind: u8     0 = enqueue, 1 = immediate, 2/3 = clear queue, >= 4 invalid
//! archive: u8
//! file: u16    big-endian
//! ```
//!
//! Queued requests are drained in FIFO order once the currently buffered
//! commands have all been parsed, so immediate responses always precede the
//! flush of the same inbound chunk. An invalid kind abandons the rest of the
//! buffered input but leaves the connection open.

use crate::codec::encode_file;
use crate::error::ProtocolError;
use crate::queue::{FileRequest, RequestQueue};
use crate::summary::SummaryTables;
use bytes::{Buf, Bytes, BytesMut};
use relic_store::{ContentStore, META_ARCHIVE};
use std::sync::Arc;

/// Handshake response byte: client version accepted.
pub const CONNECTION_ACCEPTED: u8 = 0;

/// Handshake response byte: client version not supported.
pub const UNSUPPORTED_CLIENT_VERSION: u8 = 6;

/// Command kind: append the request to the pending queue.
const KIND_ENQUEUE: u8 = 0;

/// Command kind: answer the request immediately, ahead of the queue.
const KIND_IMMEDIATE: u8 = 1;

/// Command kinds 2 and 3 both clear the pending queue.
const KIND_CLEAR_MAX: u8 = 3;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Waiting for the 4-byte client version
    Handshaking,
    /// Handshake accepted, streaming file requests
    Active,
}

/// Everything a session wants done after one inbound chunk: packets to
/// write, in order, and whether the connection should be closed afterwards.
#[derive(Debug, Default)]
pub struct SessionOutput {
    /// Outbound packets in send order
    pub packets: Vec<Bytes>,
    /// Close the connection once the packets are written
    pub close: bool,
}

/// Protocol state machine for one client connection.
pub struct UpdateSession {
    state: SessionState,
    input: BytesMut,
    queue: RequestQueue,
    store: Arc<dyn ContentStore>,
    tables: Arc<SummaryTables>,
    supported_version: i32,
}

impl UpdateSession {
    /// Create a session in the handshake phase.
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        tables: Arc<SummaryTables>,
        supported_version: i32,
    ) -> Self {
        Self {
            state: SessionState::Handshaking,
            input: BytesMut::new(),
            queue: RequestQueue::new(),
            store,
            tables,
            supported_version,
        }
    }

    /// Feed one inbound chunk and collect the session's response.
    ///
    /// Partial trailing commands stay buffered until the next chunk; the
    /// returned packets are always whole.
    pub fn receive(&mut self, data: &[u8]) -> SessionOutput {
        let mut output = SessionOutput::default();

        if data.is_empty() {
            tracing::debug!("Ignoring empty inbound chunk");
            return output;
        }
        self.input.extend_from_slice(data);

        if self.state == SessionState::Handshaking && !self.handshake(&mut output) {
            return output;
        }

        if self.state == SessionState::Active {
            self.parse_commands(&mut output);
            self.drain_queue(&mut output);
        }

        output
    }

    /// Consume the 4-byte client version once it is fully buffered.
    ///
    /// Returns `false` while still waiting for bytes or when the version was
    /// rejected.
    fn handshake(&mut self, output: &mut SessionOutput) -> bool {
        if self.input.len() < 4 {
            return false;
        }
        let client_version = self.input.get_i32();

        if client_version == self.supported_version {
            tracing::debug!("Handshake accepted: client version {client_version}");
            output.packets.push(Bytes::from_static(&[CONNECTION_ACCEPTED]));
            self.state = SessionState::Active;
            true
        } else {
            tracing::warn!(
                "Rejecting client version {client_version}, server supports {}",
                self.supported_version
            );
            output
                .packets
                .push(Bytes::from_static(&[UNSUPPORTED_CLIENT_VERSION]));
            output.close = true;
            false
        }
    }

    /// Parse every complete 4-byte command currently buffered.
    fn parse_commands(&mut self, output: &mut SessionOutput) {
        while self.input.len() >= 4 {
            let kind = self.input.get_u8();
            let request = FileRequest {
                archive: self.input.get_u8(),
                file: self.input.get_u16(),
            };

            match kind {
                KIND_ENQUEUE => self.queue.push(request),
                KIND_IMMEDIATE => {
                    if let Some(packet) = self.resolve(request) {
                        output.packets.push(packet);
                    }
                }
                2..=KIND_CLEAR_MAX => self.queue.clear(),
                _ => {
                    // Unknown command kind: abandon the rest of this input,
                    // keep the connection.
                    tracing::warn!("Invalid request kind {kind}, discarding buffered input");
                    self.input.clear();
                    return;
                }
            }
        }
    }

    /// Answer every queued request in FIFO order.
    fn drain_queue(&mut self, output: &mut SessionOutput) {
        while let Some(request) = self.queue.pop() {
            if let Some(packet) = self.resolve(request) {
                output.packets.push(packet);
            }
        }
    }

    /// Resolve one request to a framed wire packet.
    ///
    /// Misses and corrupt records are logged and dropped: the client gets no
    /// bytes for that request and may re-request it.
    fn resolve(&self, request: FileRequest) -> Option<Bytes> {
        tracing::debug!(
            "File request: archive {} file {}",
            request.archive,
            request.file
        );

        let record = if request.archive == META_ARCHIVE {
            self.tables.resolve(request)
        } else {
            self.store.record(request.archive, request.file)
        };

        let Some(record) = record else {
            let err = ProtocolError::RecordAbsent {
                archive: request.archive,
                file: request.file,
            };
            tracing::warn!(
                "{err} ({})",
                self.archive_label(request.archive)
            );
            return None;
        };

        match encode_file(request.archive, request.file, &record) {
            Ok(packet) => Some(packet),
            Err(err) => {
                tracing::error!("{err} ({})", self.archive_label(request.archive));
                None
            }
        }
    }

    fn archive_label(&self, archive: u8) -> String {
        if archive == META_ARCHIVE {
            "meta".to_string()
        } else {
            self.store.archive_name(archive)
        }
    }
}

//! Wire chunk codec: the legacy block framing for file responses.
//!
//! A file response is a 3-byte header (archive index, big-endian file index)
//! followed by the record's effective bytes, with a literal `0xFF` marker
//! byte spliced in every 512 bytes of *cumulative output* — the header
//! counts toward the first block. Markers are pure framing: they are not
//! part of the record and the client strips them before reassembly.
//!
//! The block boundary math is the most bug-sensitive code in the server.
//! The running counter starts at 3 (the header already occupies three bytes
//! of the first block) and resets to 1 after each marker (the marker itself
//! occupies the first byte of the new block). Starting at 0, or resetting
//! to 0, shifts every block boundary for every file in the store.

use crate::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};
use relic_store::record::wire_length;

/// Cumulative-output block size between markers.
const BLOCK_LEN: usize = 512;

/// Marker byte spliced in at block boundaries.
const BLOCK_MARKER: u8 = 0xFF;

/// Response header size: archive index (1) + file index (2).
const HEADER_LEN: usize = 3;

/// A wire packet decoded back into its parts. Servers never decode; this is
/// the client-side inverse kept for round-trip testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    /// Archive index from the packet header
    pub archive: u8,
    /// File index from the packet header
    pub file: u16,
    /// Record bytes with all block markers stripped
    pub record: Bytes,
}

/// Frame a stored record as a wire packet for `(archive, file)`.
///
/// # Errors
///
/// Returns [`ProtocolError::RecordCorrupt`] if the record cannot describe
/// itself (under 5 bytes) or is shorter than the effective length its header
/// declares. Absent records are the caller's concern; the codec only ever
/// sees a resolved buffer.
pub fn encode_file(archive: u8, file: u16, record: &[u8]) -> Result<Bytes, ProtocolError> {
    let len = wire_length(record).map_err(|source| ProtocolError::RecordCorrupt {
        archive,
        file,
        source,
    })?;

    // Upper bound: content + one marker per 511 content bytes + header slack.
    let mut packet = BytesMut::with_capacity((len - 2) + (len - 2) / 511 + 8);
    packet.put_u8(archive);
    packet.put_u16(file);

    let mut s = HEADER_LEN;
    for &byte in &record[..len] {
        if s == BLOCK_LEN {
            packet.put_u8(BLOCK_MARKER);
            s = 1;
        }
        packet.put_u8(byte);
        s += 1;
    }

    Ok(packet.freeze())
}

/// Strip the framing from a wire packet: the client-side inverse of
/// [`encode_file`].
///
/// Walks the packet body with the same running counter as the encoder and
/// discards the byte at every position where the counter reads a full
/// block, verifying it is the `0xFF` marker.
///
/// # Errors
///
/// Returns [`ProtocolError::TruncatedPacket`] if the packet cannot carry a
/// header, or [`ProtocolError::BadMarker`] if a block boundary holds
/// anything other than `0xFF`.
pub fn decode_file(packet: &[u8]) -> Result<DecodedFile, ProtocolError> {
    if packet.len() < HEADER_LEN {
        return Err(ProtocolError::TruncatedPacket { len: packet.len() });
    }

    let archive = packet[0];
    let file = u16::from_be_bytes([packet[1], packet[2]]);

    let mut record = BytesMut::with_capacity(packet.len() - HEADER_LEN);
    let mut s = HEADER_LEN;
    for (offset, &byte) in packet.iter().enumerate().skip(HEADER_LEN) {
        if s == BLOCK_LEN {
            if byte != BLOCK_MARKER {
                return Err(ProtocolError::BadMarker {
                    found: byte,
                    offset,
                });
            }
            s = 1;
            continue;
        }
        record.put_u8(byte);
        s += 1;
    }

    Ok(DecodedFile {
        archive,
        file,
        record: record.freeze(),
    })
}

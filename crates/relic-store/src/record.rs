//! Stored-record framing rules.
//!
//! Every record handed out by a content store is a self-describing buffer:
//!
//! ```text
//! offset 0      compression method tag (0 = none, nonzero = compressed)
//! offset 1..5   big-endian u32 payload length N
//! offset 5..    payload bytes
//! trailing      4-byte version trailer, present only when the tag is nonzero
//! ```
//!
//! The *effective length* — the number of record bytes that go onto the wire
//! when the record is served — is `N + 5` for uncompressed records and
//! `N + 9` for compressed ones. A buffer under 5 bytes cannot describe
//! itself and is corrupt; so is a buffer shorter than the effective length
//! its own header declares.

use crate::error::RecordError;

/// Minimum stored-record size: tag byte plus length field.
pub const MIN_RECORD_LEN: usize = 5;

/// Compression method tag marking an uncompressed record.
pub const METHOD_NONE: u8 = 0;

/// Parsed stored-record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Compression method tag (0 = none)
    pub method: u8,
    /// Declared payload length in bytes
    pub payload_len: u32,
}

impl RecordHeader {
    /// Parse the header of a stored record and validate the buffer against it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the buffer is under 5 bytes or shorter than
    /// the effective length the header declares.
    pub fn parse(record: &[u8]) -> Result<Self, RecordError> {
        if record.len() < MIN_RECORD_LEN {
            return Err(RecordError::TooShort { len: record.len() });
        }

        let method = record[0];
        let payload_len = u32::from_be_bytes([record[1], record[2], record[3], record[4]]);

        let header = Self { method, payload_len };
        let effective = header.effective_len();
        if record.len() < effective {
            return Err(RecordError::Truncated {
                len: record.len(),
                expected: effective,
            });
        }

        Ok(header)
    }

    /// Effective record length: header + payload, plus the version trailer
    /// for compressed records.
    #[must_use]
    pub fn effective_len(&self) -> usize {
        let base = self.payload_len as usize + MIN_RECORD_LEN;
        if self.method == METHOD_NONE { base } else { base + 4 }
    }
}

/// Compute the number of record bytes that are served on the wire.
///
/// Convenience wrapper around [`RecordHeader::parse`] for callers that only
/// need the length.
///
/// # Errors
///
/// Returns [`RecordError`] if the record fails header validation.
pub fn wire_length(record: &[u8]) -> Result<usize, RecordError> {
    Ok(RecordHeader::parse(record)?.effective_len())
}

/// Wrap raw bytes as an uncompressed stored record: tag 0, big-endian length,
/// payload. Used for synthesized meta artifacts (summary tables, descriptor
/// records) so they frame exactly like stored files.
#[must_use]
pub fn wrap_uncompressed(payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(MIN_RECORD_LEN + payload.len());
    record.push(METHOD_NONE);
    record.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    record.extend_from_slice(payload);
    record
}

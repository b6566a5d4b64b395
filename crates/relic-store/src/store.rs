//! Trait-based abstraction over content store backends.
//!
//! The protocol engine never touches store internals: it consumes the four
//! operations below and nothing else, so any backend — the directory-backed
//! [`crate::DiskStore`], the in-memory [`crate::MemoryStore`], or a future
//! format-aware store — can sit behind one connection handler.

use bytes::Bytes;

/// Reserved archive index addressing protocol meta artifacts (summary
/// tables and index descriptors) instead of stored content.
pub const META_ARCHIVE: u8 = 255;

/// Read-only view of a loaded content store.
///
/// Implementations are loaded once at startup and immutable afterwards;
/// all methods take `&self` and the trait requires `Send + Sync` so a
/// single store can be shared across every connection task.
pub trait ContentStore: Send + Sync {
    /// Get the raw stored record for a file, or `None` if the archive or
    /// file does not exist.
    ///
    /// The returned buffer is the store's own encoding of the file
    /// (compression tag, payload length, payload, optional trailer) — see
    /// [`crate::RecordHeader`].
    fn record(&self, archive: u8, file: u16) -> Option<Bytes>;

    /// CRC-32 checksum of the archive's canonical raw bytes.
    ///
    /// Returns `None` for archives the store does not hold.
    fn archive_checksum(&self, archive: u8) -> Option<u32>;

    /// Raw index descriptor bytes for an archive, or `None` if the archive
    /// does not exist.
    fn archive_descriptor(&self, archive: u8) -> Option<Bytes>;

    /// Number of real archives in the store.
    ///
    /// Archive indices are expected to be dense: `0..archive_count()`.
    fn archive_count(&self) -> usize;

    /// Human-readable archive name for log messages.
    ///
    /// The default implementation has no naming information and falls back
    /// to the numeric index.
    fn archive_name(&self, archive: u8) -> String {
        archive.to_string()
    }
}

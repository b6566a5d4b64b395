//! In-memory content store.
//!
//! Builder-style store used by tests, benchmarks, and the runnable example:
//! records and descriptors are inserted programmatically, checksums are
//! computed from descriptors on demand. Production servers load a
//! [`crate::DiskStore`] instead.

use crate::checksum::crc32;
use crate::store::{ContentStore, META_ARCHIVE};
use bytes::Bytes;
use std::collections::HashMap;

/// In-memory [`ContentStore`] implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// (archive, file) -> stored record bytes
    records: HashMap<(u8, u16), Bytes>,
    /// archive -> index descriptor bytes
    descriptors: HashMap<u8, Bytes>,
    /// archive -> display name
    names: HashMap<u8, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stored record for `(archive, file)`.
    ///
    /// The bytes are taken verbatim as the store's encoding of the file;
    /// callers building fixtures usually wrap payloads with
    /// [`crate::record::wrap_uncompressed`].
    ///
    /// # Panics
    ///
    /// Panics if `archive` is the reserved meta index 255.
    pub fn insert_record(&mut self, archive: u8, file: u16, record: impl Into<Bytes>) {
        assert_ne!(archive, META_ARCHIVE, "archive 255 is reserved");
        self.records.insert((archive, file), record.into());
    }

    /// Set the index descriptor for an archive.
    ///
    /// # Panics
    ///
    /// Panics if `archive` is the reserved meta index 255.
    pub fn set_descriptor(&mut self, archive: u8, descriptor: impl Into<Bytes>) {
        assert_ne!(archive, META_ARCHIVE, "archive 255 is reserved");
        self.descriptors.insert(archive, descriptor.into());
    }

    /// Set a display name for an archive, used in log messages.
    pub fn set_name(&mut self, archive: u8, name: impl Into<String>) {
        self.names.insert(archive, name.into());
    }
}

impl ContentStore for MemoryStore {
    fn record(&self, archive: u8, file: u16) -> Option<Bytes> {
        self.records.get(&(archive, file)).cloned()
    }

    fn archive_checksum(&self, archive: u8) -> Option<u32> {
        self.descriptors.get(&archive).map(|d| crc32(d))
    }

    fn archive_descriptor(&self, archive: u8) -> Option<Bytes> {
        self.descriptors.get(&archive).cloned()
    }

    fn archive_count(&self) -> usize {
        self.descriptors.len()
    }

    fn archive_name(&self, archive: u8) -> String {
        self.names
            .get(&archive)
            .cloned()
            .unwrap_or_else(|| archive.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::wrap_uncompressed;
    use pretty_assertions::assert_eq;

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_record(0, 1, wrap_uncompressed(b"title screen"));
        store.insert_record(2, 17, wrap_uncompressed(b"sprite sheet"));
        store.set_descriptor(0, vec![0, 1, 2, 3]);
        store.set_descriptor(2, vec![4, 5, 6, 7]);
        store.set_name(2, "sprites");
        store
    }

    #[test]
    fn test_record_lookup() {
        let store = sample_store();
        assert!(store.record(2, 17).is_some());
        assert!(store.record(2, 18).is_none());
        assert!(store.record(9, 0).is_none());
    }

    #[test]
    fn test_checksum_follows_descriptor() {
        let store = sample_store();
        assert_eq!(store.archive_checksum(0), Some(crc32(&[0, 1, 2, 3])));
        assert_eq!(store.archive_checksum(7), None);
    }

    #[test]
    fn test_archive_count_counts_descriptors() {
        let store = sample_store();
        assert_eq!(store.archive_count(), 2);
    }

    #[test]
    fn test_archive_name_fallback() {
        let store = sample_store();
        assert_eq!(store.archive_name(2), "sprites");
        assert_eq!(store.archive_name(0), "0");
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_meta_archive_rejected() {
        let mut store = MemoryStore::new();
        store.insert_record(255, 0, wrap_uncompressed(b"nope"));
    }
}

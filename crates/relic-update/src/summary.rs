//! Startup-built summary tables for the meta archive.
//!
//! Archive index 255 addresses two kinds of synthesized artifacts instead
//! of stored content:
//! - file 255: the master CRC table — one CRC-32 per real archive, in
//!   ascending archive order, used by clients to detect stale caches
//! - file k (k < archive count): archive k's index descriptor
//!
//! Both are built exactly once, after the content store finishes loading and
//! before any connection is accepted, then shared read-only by every
//! connection. They are stored in ordinary record form (tag byte, big-endian
//! length, payload) so the wire chunk codec frames them exactly like stored
//! files — the historical shortcut of copying the small CRC table verbatim
//! breaks silently once the table outgrows one 512-byte block.

use crate::queue::FileRequest;
use bytes::Bytes;
use relic_store::record::wrap_uncompressed;
use relic_store::{ContentStore, META_ARCHIVE};

/// File index addressing the master CRC table within the meta archive.
pub const CRC_TABLE_FILE: u16 = 255;

/// Immutable meta artifacts, built once at startup.
#[derive(Debug, Clone)]
pub struct SummaryTables {
    /// Master CRC table in stored-record form
    crc_table: Bytes,
    /// Per-archive descriptor records, position = archive index
    descriptors: Vec<Bytes>,
}

impl SummaryTables {
    /// Build the summary tables from a loaded store.
    ///
    /// Iterates real archives in ascending index order, collecting each
    /// archive's checksum into the master table and wrapping each index
    /// descriptor as a servable record.
    #[must_use]
    pub fn build(store: &dyn ContentStore) -> Self {
        let count = store.archive_count();

        let mut crcs = Vec::with_capacity(count * 4);
        let mut descriptors = Vec::with_capacity(count);

        for archive in 0..count as u8 {
            let crc = store.archive_checksum(archive).unwrap_or_default();
            crcs.extend_from_slice(&crc.to_be_bytes());

            let descriptor = store.archive_descriptor(archive).unwrap_or_default();
            descriptors.push(Bytes::from(wrap_uncompressed(&descriptor)));

            tracing::debug!(
                "Archive {} ({}): crc {:08x}, descriptor {} bytes",
                archive,
                store.archive_name(archive),
                crc,
                descriptor.len()
            );
        }

        let crc_table = Bytes::from(wrap_uncompressed(&crcs));

        tracing::info!(
            "Built summary tables: {} archives, {}-byte master CRC table",
            count,
            crc_table.len()
        );

        Self {
            crc_table,
            descriptors,
        }
    }

    /// Resolve a meta-space request to its record, or `None` if the request
    /// does not address this store's meta artifacts.
    ///
    /// `(255, 255)` is the master CRC table; `(255, k)` for `k` below the
    /// archive count is archive `k`'s descriptor record.
    #[must_use]
    pub fn resolve(&self, request: FileRequest) -> Option<Bytes> {
        if request.archive != META_ARCHIVE {
            return None;
        }
        if request.file == CRC_TABLE_FILE {
            return Some(self.crc_table.clone());
        }
        self.descriptors.get(usize::from(request.file)).cloned()
    }

    /// Number of real archives the tables were built over.
    #[must_use]
    pub fn archive_count(&self) -> usize {
        self.descriptors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relic_store::checksum::crc32;
    use relic_store::MemoryStore;

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set_descriptor(0, vec![0, 1, 2, 3]);
        store.set_descriptor(1, vec![4, 5, 6, 7, 8]);
        store.set_descriptor(2, vec![9]);
        store
    }

    fn meta(file: u16) -> FileRequest {
        FileRequest {
            archive: META_ARCHIVE,
            file,
        }
    }

    #[test]
    fn test_crc_table_layout() {
        let store = sample_store();
        let tables = SummaryTables::build(&store);
        let record = tables.resolve(meta(CRC_TABLE_FILE)).unwrap();

        // Stored-record form: tag 0, BE u32 length, then one BE u32 per archive.
        assert_eq!(record[0], 0);
        assert_eq!(&record[1..5], &12u32.to_be_bytes());
        assert_eq!(record.len(), 5 + 12);
        assert_eq!(&record[5..9], &crc32(&[0, 1, 2, 3]).to_be_bytes());
        assert_eq!(&record[9..13], &crc32(&[4, 5, 6, 7, 8]).to_be_bytes());
        assert_eq!(&record[13..17], &crc32(&[9]).to_be_bytes());
    }

    #[test]
    fn test_descriptor_records() {
        let store = sample_store();
        let tables = SummaryTables::build(&store);

        let record = tables.resolve(meta(1)).unwrap();
        assert_eq!(record[0], 0);
        assert_eq!(&record[1..5], &5u32.to_be_bytes());
        assert_eq!(&record[5..], &[4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_unknown_meta_file_is_absent() {
        let store = sample_store();
        let tables = SummaryTables::build(&store);
        assert!(tables.resolve(meta(3)).is_none());
        assert!(tables.resolve(meta(200)).is_none());
    }

    #[test]
    fn test_non_meta_archive_not_resolved() {
        let store = sample_store();
        let tables = SummaryTables::build(&store);
        assert!(tables
            .resolve(FileRequest {
                archive: 0,
                file: 255
            })
            .is_none());
    }
}

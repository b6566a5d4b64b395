//! Error types for the content store.
//!
//! All errors use thiserror for consistent error handling across the codebase.

use std::path::PathBuf;
use thiserror::Error;

/// Stored-record framing errors.
///
/// Raised when a record buffer cannot carry the header it claims to have.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Record too short to carry the 5-byte tag + length header
    #[error("record is {len} bytes, need at least 5 for the header")]
    TooShort {
        /// Actual record length
        len: usize,
    },

    /// Record buffer shorter than the effective length its header declares
    #[error("record is {len} bytes but its header declares {expected}")]
    Truncated {
        /// Actual record length
        len: usize,
        /// Effective length computed from the record header
        expected: usize,
    },
}

/// Content store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored record failed header validation
    #[error("Corrupt record for archive {archive} file {file}: {source}")]
    CorruptRecord {
        /// Archive index of the corrupt record
        archive: u8,
        /// File index of the corrupt record
        file: u16,
        /// Underlying framing error
        #[source]
        source: RecordError,
    },

    /// Failed to read a store file or directory
    #[error("Failed to read store path {path}: {source}")]
    ReadFailed {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON in the store manifest
    #[error("Invalid store manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),

    /// Store directory entry that does not fit the expected layout
    #[error("Invalid store entry {path}: {reason}")]
    InvalidEntry {
        /// Offending path
        path: PathBuf,
        /// Reason the entry was rejected
        reason: String,
    },

    /// Archive index 255 is reserved for protocol meta artifacts
    #[error("Archive index 255 is reserved and cannot be stored")]
    ReservedArchive,

    /// Populated archive directory without an index descriptor
    #[error("Archive {archive} has records but no index descriptor")]
    MissingDescriptor {
        /// Archive missing its descriptor
        archive: u8,
    },

    /// Store contains no archives at all
    #[error("Store is empty: no archives loaded")]
    EmptyStore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::TooShort { len: 3 };
        assert_eq!(err.to_string(), "record is 3 bytes, need at least 5 for the header");

        let err = RecordError::Truncated { len: 8, expected: 12 };
        assert_eq!(err.to_string(), "record is 8 bytes but its header declares 12");
    }

    #[test]
    fn test_store_error_wraps_record_error() {
        let err = StoreError::CorruptRecord {
            archive: 2,
            file: 17,
            source: RecordError::TooShort { len: 3 },
        };
        assert!(err.to_string().contains("archive 2 file 17"));

        let err = StoreError::MissingDescriptor { archive: 4 };
        assert_eq!(
            err.to_string(),
            "Archive 4 has records but no index descriptor"
        );
    }
}

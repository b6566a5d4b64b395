//! Directory-backed content store.
//!
//! Loads a store directory fully into memory, once, before any client is
//! served. The server never reads the directory again: the protocol treats
//! the store as immutable while serving, so startup is the only (and
//! deliberately blocking) I/O phase.
//!
//! # Directory layout
//!
//! ```text
//! store/
//!   manifest.json      optional: [{ "index": 2, "name": "sprites" }, ...]
//!   0.idx              index descriptor for archive 0
//!   0/
//!     0.dat            stored record for archive 0, file 0
//!     1.dat
//!   1.idx
//!   1/
//!     ...
//! ```
//!
//! Record files are raw stored records (tag, length, payload, optional
//! trailer) and are header-validated at load; a record that cannot describe
//! itself fails the whole load rather than surfacing mid-connection later.

use crate::checksum::crc32;
use crate::error::StoreError;
use crate::record::RecordHeader;
use crate::store::{ContentStore, META_ARCHIVE};
use bytes::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One manifest entry naming an archive.
#[derive(Debug, Clone, Deserialize)]
struct ManifestEntry {
    /// Archive index the name applies to
    index: u8,
    /// Display name used in log messages
    name: String,
}

/// Directory-backed [`ContentStore`], loaded once at startup.
#[derive(Debug)]
pub struct DiskStore {
    /// (archive, file) -> stored record bytes
    records: HashMap<(u8, u16), Bytes>,
    /// Index descriptors, position = archive index
    descriptors: Vec<Bytes>,
    /// CRC-32 per archive, position = archive index
    checksums: Vec<u32>,
    /// archive -> display name from the manifest
    names: HashMap<u8, String>,
}

impl DiskStore {
    /// Load a store directory into memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be read, a record
    /// fails header validation, an archive directory has no matching `.idx`
    /// descriptor, archive indices are not contiguous from zero, the
    /// reserved index 255 appears, or no archives are found at all.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let mut records = HashMap::new();
        let mut descriptors: HashMap<u8, Bytes> = HashMap::new();
        let mut names = HashMap::new();

        for entry in read_dir(root)? {
            let path = dir_entry(root, entry)?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if file_name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                let archive = parse_archive_index(&path, file_name)?;
                load_archive_dir(&path, archive, &mut records)?;
            } else if file_name == "manifest.json" {
                for entry in load_manifest(&path)? {
                    names.insert(entry.index, entry.name);
                }
            } else if let Some(stem) = file_name.strip_suffix(".idx") {
                let archive = parse_archive_index(&path, stem)?;
                descriptors.insert(archive, read_bytes(&path)?);
            } else {
                tracing::warn!("Ignoring unrecognized store entry: {}", path.display());
            }
        }

        let descriptors = into_contiguous(root, descriptors)?;
        if descriptors.is_empty() {
            return Err(StoreError::EmptyStore);
        }

        // Every populated archive needs a descriptor; the reverse (a
        // descriptor with no records yet) is legal.
        for &(archive, _) in records.keys() {
            if usize::from(archive) >= descriptors.len() {
                return Err(StoreError::MissingDescriptor { archive });
            }
        }

        let checksums = descriptors.iter().map(|d| crc32(d)).collect();

        tracing::info!(
            "Loaded content store from {}: {} archives, {} records",
            root.display(),
            descriptors.len(),
            records.len()
        );

        Ok(Self {
            records,
            descriptors,
            checksums,
            names,
        })
    }
}

impl ContentStore for DiskStore {
    fn record(&self, archive: u8, file: u16) -> Option<Bytes> {
        self.records.get(&(archive, file)).cloned()
    }

    fn archive_checksum(&self, archive: u8) -> Option<u32> {
        self.checksums.get(usize::from(archive)).copied()
    }

    fn archive_descriptor(&self, archive: u8) -> Option<Bytes> {
        self.descriptors.get(usize::from(archive)).cloned()
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

fn read_dir(path: &Path) -> Result<fs::ReadDir, StoreError> {
    fs::read_dir(path).map_err(|source| StoreError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn dir_entry(
    dir: &Path,
    entry: std::io::Result<fs::DirEntry>,
) -> Result<fs::DirEntry, StoreError> {
    entry.map_err(|source| StoreError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Bytes, StoreError> {
    fs::read(path)
        .map(Bytes::from)
        .map_err(|source| StoreError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse a directory or file stem as an archive index, rejecting the
/// reserved meta index.
fn parse_archive_index(path: &Path, stem: &str) -> Result<u8, StoreError> {
    let archive: u8 = stem.parse().map_err(|_| StoreError::InvalidEntry {
        path: path.to_path_buf(),
        reason: format!("'{stem}' is not an archive index"),
    })?;
    if archive == META_ARCHIVE {
        return Err(StoreError::ReservedArchive);
    }
    Ok(archive)
}

/// Load every `<file>.dat` record in one archive directory, validating each
/// record header as it comes in.
fn load_archive_dir(
    dir: &Path,
    archive: u8,
    records: &mut HashMap<(u8, u16), Bytes>,
) -> Result<(), StoreError> {
    for entry in read_dir(dir)? {
        let path = dir_entry(dir, entry)?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }

        let Some(stem) = file_name.strip_suffix(".dat") else {
            tracing::warn!("Ignoring unrecognized store entry: {}", path.display());
            continue;
        };

        let file: u16 = stem.parse().map_err(|_| StoreError::InvalidEntry {
            path: path.clone(),
            reason: format!("'{stem}' is not a file index"),
        })?;

        let record = read_bytes(&path)?;
        RecordHeader::parse(&record).map_err(|source| StoreError::CorruptRecord {
            archive,
            file,
            source,
        })?;

        records.insert((archive, file), record);
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>, StoreError> {
    let data = fs::read_to_string(path).map_err(|source| StoreError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

/// Collapse the descriptor map into a dense vector indexed by archive.
fn into_contiguous(
    root: &Path,
    mut descriptors: HashMap<u8, Bytes>,
) -> Result<Vec<Bytes>, StoreError> {
    let count = descriptors.len();
    let mut dense = Vec::with_capacity(count);
    for archive in 0..count {
        let Some(descriptor) = descriptors.remove(&(archive as u8)) else {
            return Err(StoreError::InvalidEntry {
                path: root.to_path_buf(),
                reason: format!("archive indices are not contiguous: missing {archive}"),
            });
        };
        dense.push(descriptor);
    }
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::wrap_uncompressed;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write_store(root: &Path) {
        fs::create_dir(root.join("0")).unwrap();
        fs::create_dir(root.join("1")).unwrap();
        fs::write(root.join("0/0.dat"), wrap_uncompressed(b"config blob")).unwrap();
        fs::write(root.join("1/4.dat"), wrap_uncompressed(b"model data")).unwrap();
        fs::write(root.join("0.idx"), [0, 1, 2, 3]).unwrap();
        fs::write(root.join("1.idx"), [4, 5, 6, 7]).unwrap();
        fs::write(
            root.join("manifest.json"),
            r#"[{ "index": 0, "name": "config" }, { "index": 1, "name": "models" }]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_store() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());

        let store = DiskStore::load(dir.path()).unwrap();
        assert_eq!(store.archive_count(), 2);
        assert_eq!(
            store.record(0, 0).unwrap(),
            Bytes::from(wrap_uncompressed(b"config blob"))
        );
        assert!(store.record(0, 1).is_none());
        assert_eq!(store.archive_descriptor(1).unwrap(), Bytes::from_static(&[4, 5, 6, 7]));
        assert_eq!(store.archive_checksum(1), Some(crc32(&[4, 5, 6, 7])));
        assert_eq!(store.archive_name(1), "models");
    }

    #[test]
    fn test_load_rejects_corrupt_record() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        fs::write(dir.path().join("0/9.dat"), [0, 0]).unwrap();

        let err = DiskStore::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptRecord {
                archive: 0,
                file: 9,
                ..
            }
        ));
    }

    #[test]
    fn test_load_rejects_reserved_archive() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        fs::write(dir.path().join("255.idx"), [0]).unwrap();

        let err = DiskStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::ReservedArchive));
    }

    #[test]
    fn test_load_rejects_missing_descriptor() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        fs::create_dir(dir.path().join("2")).unwrap();
        fs::write(dir.path().join("2/0.dat"), wrap_uncompressed(b"orphan")).unwrap();

        let err = DiskStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::MissingDescriptor { archive: 2 }));
    }

    #[test]
    fn test_load_rejects_gap_in_archive_indices() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        fs::remove_file(dir.path().join("0.idx")).unwrap();
        fs::write(dir.path().join("2.idx"), [9]).unwrap();

        let err = DiskStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEntry { .. }));
    }

    #[test]
    fn test_load_rejects_empty_store() {
        let dir = TempDir::new().unwrap();
        let err = DiskStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyStore));
    }
}

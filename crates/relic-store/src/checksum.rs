//! CRC-32 checksum helper.
//!
//! Archive summary checksums use standard CRC-32 (IEEE), computed over the
//! archive's canonical raw bytes — its index descriptor. Clients compare
//! these against their cached copies to detect stale content.

/// Compute the CRC-32 checksum of a byte buffer.
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_known_vector() {
        // Standard IEEE CRC-32 test vector.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn test_crc32_differs_on_change() {
        let a = crc32(b"archive descriptor v1");
        let b = crc32(b"archive descriptor v2");
        assert_ne!(a, b);
    }
}

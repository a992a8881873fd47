//! Snapshot decoding.
//!
//! [`SnapshotReader`] decodes a snapshot held entirely in memory, usually
//! a memory-mapped file. Blobs are returned as borrowed slices so the
//! caller decides where to copy them.

use kiln_core::PathName;

use crate::codec::{decode_entry, decode_header_fields};
use crate::deps::DependencyPaths;
use crate::error::SnapshotError;
use crate::types::{CacheEntry, Snapshot, SnapshotHeader};
use crate::{ENTRY_RECORD_SIZE, FORMAT_VERSION, HEADER_SIZE, MAGIC};

/// Why a byte sequence was not treated as a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unrecognized {
    /// Shorter than the magic tag, or the tag does not match.
    BadMagic,
    /// The magic matches but the format version does not.
    Version {
        /// The version found in the file.
        found: u32,
    },
}

/// Result of decoding: a snapshot, or bytes that are not one.
///
/// Unrecognized bytes are a cold start, not an error.
#[derive(Debug)]
pub enum Decoded<'a> {
    /// A fully validated snapshot.
    Snapshot(Snapshot<'a>),
    /// Not a snapshot this build can read.
    Unrecognized(Unrecognized),
}

/// Decodes snapshots from byte slices.
pub struct SnapshotReader;

impl SnapshotReader {
    /// Decode and validate `bytes`.
    ///
    /// The exact-size check runs before any record is decoded: a file
    /// whose length differs from what its header implies is
    /// [`SnapshotError::SizeMismatch`]. Every record is then checked
    /// against the blobs it references.
    pub fn decode(bytes: &[u8]) -> Result<Decoded<'_>, SnapshotError> {
        if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
            return Ok(Decoded::Unrecognized(Unrecognized::BadMagic));
        }
        if bytes.len() < HEADER_SIZE {
            // A version field might still be readable; peek it so an old,
            // short header is treated as foreign rather than corrupt.
            if bytes.len() >= MAGIC.len() + 4 {
                let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
                if version != FORMAT_VERSION {
                    return Ok(Decoded::Unrecognized(Unrecognized::Version { found: version }));
                }
            }
            return Err(SnapshotError::SizeMismatch {
                expected: HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let mut cursor = &bytes[MAGIC.len()..HEADER_SIZE];
        let header = decode_header_fields(&mut cursor)?;
        if header.version != FORMAT_VERSION {
            return Ok(Decoded::Unrecognized(Unrecognized::Version {
                found: header.version,
            }));
        }

        let expected = header.expected_len();
        if expected != bytes.len() as u64 {
            return Err(SnapshotError::SizeMismatch {
                expected,
                actual: bytes.len() as u64,
            });
        }

        let entries_end = HEADER_SIZE + header.entry_count as usize * ENTRY_RECORD_SIZE;
        let assets_end = entries_end + header.asset_blob_size as usize;
        let asset_blob = &bytes[entries_end..assets_end];
        let dependency_blob = &bytes[assets_end..];

        let mut records = &bytes[HEADER_SIZE..entries_end];
        let mut entries = Vec::with_capacity(header.entry_count as usize);
        for index in 0..header.entry_count {
            let entry = decode_entry(&mut records)?;
            validate_entry(index, &entry, &header, dependency_blob)?;
            entries.push(entry);
        }

        Ok(Decoded::Snapshot(Snapshot {
            header,
            entries,
            asset_blob,
            dependency_blob,
        }))
    }
}

fn validate_entry(
    index: u32,
    entry: &CacheEntry,
    header: &SnapshotHeader,
    dependency_blob: &[u8],
) -> Result<(), SnapshotError> {
    let asset = entry.asset.range();
    if asset.end() > header.asset_blob_size as u64 {
        return Err(SnapshotError::corrupt(format!(
            "entry {index} ('{}') asset {asset} is outside the {}-byte asset blob",
            entry.name, header.asset_blob_size
        )));
    }
    let deps = DependencyPaths::new(
        dependency_blob,
        entry.dependencies_start,
        entry.dependency_count,
    );
    for path in deps {
        let path = path?;
        if path.len() > PathName::CAPACITY {
            return Err(SnapshotError::corrupt(format!(
                "entry {index} ('{}') has a {}-byte dependency path",
                entry.name,
                path.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotView;
    use crate::writer::SnapshotWriter;
    use kiln_core::{AssetHandle, BlobRange};

    fn entry(name: &str, asset: BlobRange, deps_start: u32, deps: u32) -> CacheEntry {
        CacheEntry {
            name: PathName::new(name).unwrap(),
            timestamp: 7,
            content_length: 11,
            asset: AssetHandle(asset),
            dependencies_start: deps_start,
            dependency_count: deps,
        }
    }

    fn encode(entries: &[CacheEntry], assets: &[u8], deps: &[u8]) -> Vec<u8> {
        let mut writer = SnapshotWriter::new(Vec::new());
        writer
            .write_snapshot(&SnapshotView {
                entries,
                asset_blob: assets,
                dependency_blob: deps,
            })
            .unwrap();
        writer.into_inner()
    }

    #[test]
    fn decode_borrows_blobs() {
        let entries = [
            entry("a.ogex", BlobRange::new(0, 4), 0, 2),
            entry("b.png", BlobRange::new(4, 3), 0, 0),
        ];
        let bytes = encode(&entries, b"AAAABBB", b"b.png\0c.spv\0");
        let Decoded::Snapshot(snapshot) = SnapshotReader::decode(&bytes).unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.entries, entries);
        assert_eq!(snapshot.asset_blob, b"AAAABBB");
        assert_eq!(snapshot.dependency_blob, b"b.png\0c.spv\0");
    }

    #[test]
    fn empty_bytes_are_unrecognized() {
        assert!(matches!(
            SnapshotReader::decode(&[]).unwrap(),
            Decoded::Unrecognized(Unrecognized::BadMagic)
        ));
    }

    #[test]
    fn foreign_magic_is_unrecognized() {
        let mut bytes = encode(&[], b"", b"");
        bytes[0] = b'X';
        assert!(matches!(
            SnapshotReader::decode(&bytes).unwrap(),
            Decoded::Unrecognized(Unrecognized::BadMagic)
        ));
    }

    #[test]
    fn other_version_is_unrecognized() {
        let mut bytes = encode(&[], b"", b"");
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            SnapshotReader::decode(&bytes).unwrap(),
            Decoded::Unrecognized(Unrecognized::Version { found: 99 })
        ));
    }

    #[test]
    fn truncated_file_is_size_mismatch() {
        let entries = [entry("a.png", BlobRange::new(0, 4), 0, 0)];
        let mut bytes = encode(&entries, b"AAAA", b"");
        let full = bytes.len() as u64;
        bytes.pop();
        match SnapshotReader::decode(&bytes) {
            Err(SnapshotError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, full);
                assert_eq!(actual, full - 1);
            }
            other => panic!("expected size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn trailing_garbage_is_size_mismatch() {
        let mut bytes = encode(&[], b"", b"");
        bytes.extend_from_slice(b"junk");
        assert!(matches!(
            SnapshotReader::decode(&bytes),
            Err(SnapshotError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn truncated_header_is_size_mismatch() {
        let bytes = encode(&[], b"", b"");
        assert!(matches!(
            SnapshotReader::decode(&bytes[..12]),
            Err(SnapshotError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn asset_out_of_blob_is_corrupt() {
        let entries = [entry("a.png", BlobRange::new(2, 4), 0, 0)];
        let bytes = encode(&entries, b"AAAA", b"");
        assert!(matches!(
            SnapshotReader::decode(&bytes),
            Err(SnapshotError::Corrupt { .. })
        ));
    }

    #[test]
    fn missing_dependency_string_is_corrupt() {
        let entries = [entry("a.ogex", BlobRange::new(0, 0), 0, 3)];
        let bytes = encode(&entries, b"", b"b.png\0c.spv\0");
        assert!(matches!(
            SnapshotReader::decode(&bytes),
            Err(SnapshotError::Corrupt { .. })
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_bytes_never_panic(tail in prop::collection::vec(any::<u8>(), 0..600)) {
                let mut bytes = MAGIC.to_vec();
                bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
                bytes.extend_from_slice(&tail);
                let _ = SnapshotReader::decode(&bytes);
            }

            #[test]
            fn flipping_a_record_byte_never_panics(at in 0usize..ENTRY_RECORD_SIZE, byte in any::<u8>()) {
                let entries = [entry("a.ogex", BlobRange::new(0, 4), 0, 1)];
                let mut bytes = encode(&entries, b"AAAA", b"b.png\0");
                bytes[HEADER_SIZE + at] = byte;
                let _ = SnapshotReader::decode(&bytes);
            }
        }
    }
}

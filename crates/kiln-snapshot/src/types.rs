//! Data types for snapshot encoding and decoding.

use kiln_core::{AssetHandle, PathName};

/// Validity and reuse record for one converted source path.
///
/// Created when a conversion commits and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Source path, compared byte-for-byte.
    pub name: PathName,
    /// Last-modified timestamp of the source at conversion time.
    pub timestamp: u64,
    /// Size of the source in bytes at conversion time.
    pub content_length: u64,
    /// Converted asset in the asset blob.
    pub asset: AssetHandle,
    /// Offset of the first dependency string in the dependency blob.
    pub dependencies_start: u32,
    /// Number of NUL-terminated dependency strings starting there.
    pub dependency_count: u32,
}

impl CacheEntry {
    /// Whether this entry describes `path` as it currently exists.
    ///
    /// Name, size and timestamp must all match. Content is not hashed, so
    /// a rewrite that preserves both size and timestamp goes unnoticed.
    pub fn is_current(&self, path: &str, content_length: u64, timestamp: u64) -> bool {
        self.name == path && self.content_length == content_length && self.timestamp == timestamp
    }
}

/// Fixed-size snapshot header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Format version (see [`FORMAT_VERSION`](crate::FORMAT_VERSION)).
    pub version: u32,
    /// Number of entry records.
    pub entry_count: u32,
    /// Size of the asset blob in bytes.
    pub asset_blob_size: u32,
    /// Size of the dependency blob in bytes.
    pub dependency_blob_size: u32,
}

impl SnapshotHeader {
    /// Exact file length implied by this header.
    pub fn expected_len(&self) -> u64 {
        crate::HEADER_SIZE as u64
            + self.entry_count as u64 * crate::ENTRY_RECORD_SIZE as u64
            + self.asset_blob_size as u64
            + self.dependency_blob_size as u64
    }
}

/// Borrowed view of the state a snapshot is written from.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotView<'a> {
    /// Cache entries in table order.
    pub entries: &'a [CacheEntry],
    /// Used bytes of the asset arena.
    pub asset_blob: &'a [u8],
    /// Used bytes of the dependency arena.
    pub dependency_blob: &'a [u8],
}

/// A decoded snapshot. Blobs borrow from the decoded bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot<'a> {
    /// The validated header.
    pub header: SnapshotHeader,
    /// Decoded and validated cache entries.
    pub entries: Vec<CacheEntry>,
    /// Asset blob bytes.
    pub asset_blob: &'a [u8],
    /// Dependency blob bytes.
    pub dependency_blob: &'a [u8],
}

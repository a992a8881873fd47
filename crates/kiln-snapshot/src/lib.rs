//! Binary cache snapshot format for the Kiln asset pipeline.
//!
//! Persists the cache-entry table, the converted-asset blob and the
//! dependency-string blob as one file, so unchanged assets are never
//! reconverted across runs.
//!
//! # Architecture
//!
//! - [`SnapshotWriter`] writes a snapshot to any `Write` sink
//! - [`SnapshotReader`] decodes a snapshot from a byte slice (typically a
//!   memory-mapped file), borrowing the blobs without copying
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "KILN"] [VERSION u32] [entry_count u32]
//! [asset_blob_size u32] [dependency_blob_size u32]
//! [Entry 1] ... [Entry N]          fixed 290-byte records
//! [asset blob] [dependency blob]
//! ```
//!
//! The total length must equal the sum of the header, the records and
//! both blobs exactly; anything else is a corrupt snapshot.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod deps;
pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use deps::DependencyPaths;
pub use error::SnapshotError;
pub use reader::{Decoded, SnapshotReader, Unrecognized};
pub use types::{CacheEntry, Snapshot, SnapshotHeader, SnapshotView};
pub use writer::SnapshotWriter;

/// Magic bytes at the start of every snapshot file.
pub const MAGIC: [u8; 4] = *b"KILN";

/// Current binary format version.
///
/// History:
/// - v1: fixed 290-byte entry records, little-endian fields
pub const FORMAT_VERSION: u32 = 1;

/// Size of the snapshot header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Size of one encoded cache-entry record in bytes.
pub const ENTRY_RECORD_SIZE: usize = 290;

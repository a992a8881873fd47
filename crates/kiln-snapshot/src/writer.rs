//! Snapshot writer.
//!
//! [`SnapshotWriter`] encodes a [`SnapshotView`] to any `Write` sink.

use std::io::Write;

use crate::codec::{encode_entry, encode_header};
use crate::error::SnapshotError;
use crate::types::{SnapshotHeader, SnapshotView};
use crate::FORMAT_VERSION;

/// Writes snapshots to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use kiln_snapshot::{Decoded, SnapshotReader, SnapshotView, SnapshotWriter};
///
/// let mut writer = SnapshotWriter::new(Vec::new());
/// let written = writer
///     .write_snapshot(&SnapshotView {
///         entries: &[],
///         asset_blob: b"asset bytes",
///         dependency_blob: b"",
///     })
///     .unwrap();
/// let bytes = writer.into_inner();
/// assert_eq!(written, bytes.len() as u64);
///
/// let Decoded::Snapshot(snapshot) = SnapshotReader::decode(&bytes).unwrap() else {
///     panic!("not a snapshot");
/// };
/// assert_eq!(snapshot.asset_blob, b"asset bytes");
/// ```
pub struct SnapshotWriter<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> SnapshotWriter<W> {
    /// Wrap a sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Encode a complete snapshot and return its size in bytes.
    ///
    /// Writes the header, every entry record in table order, the asset
    /// blob and the dependency blob, in that order.
    pub fn write_snapshot(&mut self, view: &SnapshotView<'_>) -> Result<u64, SnapshotError> {
        let header = SnapshotHeader {
            version: FORMAT_VERSION,
            entry_count: fit_u32("entry count", view.entries.len())?,
            asset_blob_size: fit_u32("asset blob size", view.asset_blob.len())?,
            dependency_blob_size: fit_u32("dependency blob size", view.dependency_blob.len())?,
        };

        encode_header(&mut self.writer, &header)?;
        for entry in view.entries {
            encode_entry(&mut self.writer, entry)?;
        }
        self.writer.write_all(view.asset_blob)?;
        self.writer.write_all(view.dependency_blob)?;

        let len = header.expected_len();
        self.bytes_written += len;
        Ok(len)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), SnapshotError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn fit_u32(what: &'static str, value: usize) -> Result<u32, SnapshotError> {
    u32::try_from(value).map_err(|_| SnapshotError::TooLarge { what, value })
}

//! Binary encode/decode for the snapshot format.
//!
//! All integers are little-endian. Entry records have a fixed size so the
//! total file length can be checked against the header before any record
//! is trusted. The format is intentionally simple: no compression, no
//! alignment padding beyond the one pad byte in each record, no checksum.

use std::io::{Read, Write};

use kiln_core::{AssetHandle, BlobRange, PathName};

use crate::error::SnapshotError;
use crate::types::{CacheEntry, SnapshotHeader};
use crate::{ENTRY_RECORD_SIZE, HEADER_SIZE, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), SnapshotError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u16.
pub fn write_u16_le(w: &mut dyn Write, v: u16) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, SnapshotError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u16.
pub fn read_u16_le(r: &mut dyn Read) -> Result<u16, SnapshotError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, SnapshotError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, SnapshotError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the snapshot header, magic first.
pub fn encode_header(w: &mut dyn Write, header: &SnapshotHeader) -> Result<(), SnapshotError> {
    w.write_all(&MAGIC)?;
    write_u32_le(w, header.version)?;
    write_u32_le(w, header.entry_count)?;
    write_u32_le(w, header.asset_blob_size)?;
    write_u32_le(w, header.dependency_blob_size)?;
    Ok(())
}

/// Decode the header fields that follow the magic bytes.
///
/// The caller checks the magic; this reads exactly
/// `HEADER_SIZE - MAGIC.len()` bytes.
pub fn decode_header_fields(r: &mut dyn Read) -> Result<SnapshotHeader, SnapshotError> {
    Ok(SnapshotHeader {
        version: read_u32_le(r)?,
        entry_count: read_u32_le(r)?,
        asset_blob_size: read_u32_le(r)?,
        dependency_blob_size: read_u32_le(r)?,
    })
}

// ── Entry encode/decode ─────────────────────────────────────────

/// Encode one cache entry as a fixed-size record.
///
/// Layout: `name_len u16 | name [255] | pad u8 | timestamp u64 |
/// content_length u64 | asset_offset u32 | asset_len u32 |
/// dependencies_start u32 | dependency_count u32`.
pub fn encode_entry(w: &mut dyn Write, entry: &CacheEntry) -> Result<(), SnapshotError> {
    write_u16_le(w, entry.name.len() as u16)?;
    w.write_all(entry.name.padded())?;
    write_u8(w, 0)?;
    write_u64_le(w, entry.timestamp)?;
    write_u64_le(w, entry.content_length)?;
    let asset = entry.asset.range();
    write_u32_le(w, asset.offset)?;
    write_u32_le(w, asset.len)?;
    write_u32_le(w, entry.dependencies_start)?;
    write_u32_le(w, entry.dependency_count)?;
    Ok(())
}

/// Decode one fixed-size cache-entry record.
pub fn decode_entry(r: &mut dyn Read) -> Result<CacheEntry, SnapshotError> {
    let name_len = read_u16_le(r)? as usize;
    let mut slot = [0u8; PathName::CAPACITY];
    r.read_exact(&mut slot)?;
    let _pad = read_u8(r)?;
    if name_len > PathName::CAPACITY {
        return Err(SnapshotError::corrupt(format!(
            "entry name length {name_len} exceeds {}",
            PathName::CAPACITY
        )));
    }
    let name = PathName::from_bytes(&slot[..name_len])
        .ok_or_else(|| SnapshotError::corrupt("entry name is not valid UTF-8"))?;

    let timestamp = read_u64_le(r)?;
    let content_length = read_u64_le(r)?;
    let asset = AssetHandle(BlobRange::new(read_u32_le(r)?, read_u32_le(r)?));
    let dependencies_start = read_u32_le(r)?;
    let dependency_count = read_u32_le(r)?;

    Ok(CacheEntry {
        name,
        timestamp,
        content_length,
        asset,
        dependencies_start,
        dependency_count,
    })
}

/// Compile-time check that the record layout matches its declared size.
const _: () = assert!(2 + PathName::CAPACITY + 1 + 8 + 8 + 4 * 4 == ENTRY_RECORD_SIZE);
const _: () = assert!(MAGIC.len() + 4 * 4 == HEADER_SIZE);

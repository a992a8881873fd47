//! Strongly-typed handles and the fixed-capacity [`PathName`].

use std::fmt;

/// A contiguous byte range inside a byte arena.
///
/// Offsets are relative to the arena base, so a range stays meaningful
/// after the arena has been persisted and restored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobRange {
    /// Start offset in bytes.
    pub offset: u32,
    /// Length in bytes.
    pub len: u32,
}

impl BlobRange {
    /// Create a range from an offset and a length.
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// One past the last byte of the range.
    ///
    /// Computed in `u64` so a corrupt range can never wrap.
    pub const fn end(&self) -> u64 {
        self.offset as u64 + self.len as u64
    }

    /// Whether the range covers zero bytes.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The range as a `usize` slice range.
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.offset as usize..self.offset as usize + self.len as usize
    }
}

impl fmt::Display for BlobRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.offset, self.len)
    }
}

/// Opaque handle to converted asset data in the asset arena.
///
/// Produced by a converter, recorded in a cache entry, and copied into
/// a descriptor on every successful load. The handle is the location of
/// the asset's bytes; it carries no type information.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(pub BlobRange);

impl AssetHandle {
    /// Location of the asset bytes inside the asset arena.
    pub const fn range(&self) -> BlobRange {
        self.0
    }

    /// Size of the converted asset in bytes.
    pub const fn len(&self) -> u32 {
        self.0.len
    }

    /// Whether the converted asset is empty.
    pub const fn is_empty(&self) -> bool {
        self.0.len == 0
    }
}

impl From<BlobRange> for AssetHandle {
    fn from(range: BlobRange) -> Self {
        Self(range)
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset@{}", self.0)
    }
}

/// A path did not fit into a [`PathName`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathTooLong {
    /// Length of the rejected path in bytes.
    pub len: usize,
}

impl fmt::Display for PathTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path of {} bytes exceeds the {}-byte name capacity",
            self.len,
            PathName::CAPACITY
        )
    }
}

impl std::error::Error for PathTooLong {}

/// Fixed-capacity, inline UTF-8 path string.
///
/// Cache entries and descriptors store their path inline so both tables
/// are flat arrays of `Copy` records. Comparison is by raw bytes: no
/// separator or case normalisation is applied, so `a/b.png` and
/// `a\b.png` are distinct names.
#[derive(Clone, Copy)]
pub struct PathName {
    len: u8,
    bytes: [u8; PathName::CAPACITY],
}

impl PathName {
    /// Maximum path length in bytes.
    pub const CAPACITY: usize = 255;

    /// Copy `path` into a new name.
    pub fn new(path: &str) -> Result<Self, PathTooLong> {
        Self::from_utf8_bytes(path.as_bytes())
    }

    /// Build a name from raw bytes, which must already be valid UTF-8.
    fn from_utf8_bytes(src: &[u8]) -> Result<Self, PathTooLong> {
        if src.len() > Self::CAPACITY {
            return Err(PathTooLong { len: src.len() });
        }
        let mut bytes = [0u8; Self::CAPACITY];
        bytes[..src.len()].copy_from_slice(src);
        Ok(Self {
            len: src.len() as u8,
            bytes,
        })
    }

    /// Decode a name from untrusted bytes (e.g. a snapshot record).
    ///
    /// Returns `None` if the bytes are too long or not valid UTF-8.
    pub fn from_bytes(src: &[u8]) -> Option<Self> {
        std::str::from_utf8(src).ok()?;
        Self::from_utf8_bytes(src).ok()
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction only ever accepts valid UTF-8.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// The path bytes, without padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The full zero-padded storage slot.
    pub fn padded(&self) -> &[u8; PathName::CAPACITY] {
        &self.bytes
    }

    /// Length of the path in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq for PathName {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for PathName {}

impl std::hash::Hash for PathName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl PartialEq<str> for PathName {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for PathName {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl TryFrom<&str> for PathName {
    type Error = PathTooLong;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl AsRef<str> for PathName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

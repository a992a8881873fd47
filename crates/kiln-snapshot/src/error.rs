//! Error types for snapshot encoding and decoding.

use std::fmt;
use std::io;

/// Errors that can occur while writing or reading a snapshot.
///
/// A snapshot with a foreign magic tag or version is not an error; see
/// [`Decoded::Unrecognized`](crate::Decoded::Unrecognized).
#[derive(Debug)]
pub enum SnapshotError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file length disagrees with the length implied by its header.
    SizeMismatch {
        /// Length implied by the header.
        expected: u64,
        /// Actual length of the file.
        actual: u64,
    },
    /// A record references data that is not in the snapshot.
    Corrupt {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The state to persist does not fit the format's `u32` counters.
    TooLarge {
        /// Which quantity overflowed.
        what: &'static str,
        /// Its value.
        value: usize,
    },
}

impl SnapshotError {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::Corrupt {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "snapshot size mismatch: header implies {expected} bytes, file has {actual}"
                )
            }
            Self::Corrupt { detail } => write!(f, "corrupt snapshot: {detail}"),
            Self::TooLarge { what, value } => {
                write!(f, "{what} of {value} does not fit the snapshot format")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

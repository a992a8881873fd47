//! Error types for the Kiln asset pipeline.
//!
//! [`LoadError`] is the pipeline taxonomy returned by every `Load` call.
//! [`ConvertError`] is what a converter reports back to the pipeline.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from a single `Load` request.
///
/// Recoverable variants affect only the requested path: nothing is
/// recorded for it and the caller may carry on with other paths. Fatal
/// variants (see [`is_fatal`](LoadError::is_fatal)) mean the session can
/// no longer make progress and must be abandoned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The path is already resolved in this session. The load is a no-op.
    DuplicateInSession {
        /// The repeated path.
        path: String,
    },
    /// The recursion ceiling was reached, usually because of a
    /// dependency cycle.
    DepthExceeded {
        /// The path whose load would have exceeded the ceiling.
        path: String,
        /// The configured ceiling.
        max_depth: usize,
    },
    /// The path does not fit the fixed-capacity name slot.
    PathTooLong {
        /// Length of the rejected path in bytes.
        len: usize,
        /// Capacity of the name slot.
        max: usize,
    },
    /// The file-reading collaborator could not open the path.
    OpenFailed {
        /// The path that failed to open.
        path: String,
        /// Kind of the underlying I/O error.
        kind: io::ErrorKind,
        /// Message of the underlying I/O error.
        message: String,
    },
    /// No converter is registered for the path's extension, or the path
    /// has no extension at all.
    NoConverter {
        /// The path that could not be dispatched.
        path: String,
        /// The derived extension, if any.
        extension: Option<String>,
    },
    /// The converter rejected the source.
    ConversionFailed {
        /// The path whose conversion failed.
        path: String,
        /// The converter's error.
        reason: Box<ConvertError>,
    },
    /// A fixed-capacity arena was too small for the asset set.
    AllocationExhausted {
        /// Name of the exhausted arena.
        arena: &'static str,
        /// Number of bytes or records requested.
        requested: usize,
        /// Capacity of the arena.
        capacity: usize,
    },
}

impl LoadError {
    /// Whether the error ends the session rather than a single path.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DepthExceeded { .. } | Self::AllocationExhausted { .. }
        )
    }

    /// Build an [`OpenFailed`](LoadError::OpenFailed) from an I/O error.
    pub fn open_failed(path: &str, err: &io::Error) -> Self {
        Self::OpenFailed {
            path: path.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateInSession { path } => {
                write!(f, "'{path}' is already loaded in this session")
            }
            Self::DepthExceeded { path, max_depth } => {
                write!(
                    f,
                    "loading '{path}' exceeds the maximum dependency depth of {max_depth}"
                )
            }
            Self::PathTooLong { len, max } => {
                write!(f, "path of {len} bytes exceeds the {max}-byte limit")
            }
            Self::OpenFailed { path, message, .. } => {
                write!(f, "failed to open '{path}': {message}")
            }
            Self::NoConverter { path, extension } => match extension {
                Some(ext) => write!(f, "no converter registered for '.{ext}' ('{path}')"),
                None => write!(f, "'{path}' has no extension to dispatch on"),
            },
            Self::ConversionFailed { path, reason } => {
                write!(f, "failed to convert '{path}': {reason}")
            }
            Self::AllocationExhausted {
                arena,
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "{arena} arena exhausted: requested {requested}, capacity {capacity}"
                )
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConversionFailed { reason, .. } => Some(reason.as_ref()),
            _ => None,
        }
    }
}

impl From<crate::id::PathTooLong> for LoadError {
    fn from(e: crate::id::PathTooLong) -> Self {
        Self::PathTooLong {
            len: e.len,
            max: crate::id::PathName::CAPACITY,
        }
    }
}

/// Errors reported by a converter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConvertError {
    /// The source bytes are not a valid instance of the format.
    Malformed {
        /// Human-readable description of the problem.
        detail: String,
    },
    /// The source is valid but uses a feature the converter does not handle.
    Unsupported {
        /// Human-readable description of the feature.
        detail: String,
    },
    /// A nested load or an asset allocation requested by the converter failed.
    Load(LoadError),
}

impl ConvertError {
    /// Shorthand for [`ConvertError::Malformed`].
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { detail } => write!(f, "malformed source: {detail}"),
            Self::Unsupported { detail } => write!(f, "unsupported: {detail}"),
            Self::Load(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for ConvertError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(LoadError::DepthExceeded {
            path: "a".into(),
            max_depth: 4
        }
        .is_fatal());
        assert!(LoadError::AllocationExhausted {
            arena: "asset",
            requested: 8,
            capacity: 4
        }
        .is_fatal());
        assert!(!LoadError::DuplicateInSession { path: "a".into() }.is_fatal());
        assert!(!LoadError::NoConverter {
            path: "a.xyz".into(),
            extension: Some("xyz".into())
        }
        .is_fatal());
    }

    #[test]
    fn conversion_failure_exposes_source() {
        let err = LoadError::ConversionFailed {
            path: "a.png".into(),
            reason: Box::new(ConvertError::malformed("bad header")),
        };
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "failed to convert 'a.png': malformed source: bad header"
        );
    }

    #[test]
    fn no_converter_without_extension() {
        let err = LoadError::NoConverter {
            path: "dir/file".into(),
            extension: None,
        };
        assert_eq!(err.to_string(), "'dir/file' has no extension to dispatch on");
    }
}

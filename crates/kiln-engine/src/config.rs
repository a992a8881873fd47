//! Manager configuration, validation, and error types.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use kiln_arena::ArenaConfig;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ManagerConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_depth` is zero or above [`ManagerConfig::MAX_DEPTH_LIMIT`].
    InvalidMaxDepth {
        /// The configured value.
        configured: usize,
    },
    /// A byte arena capacity does not fit a `u32` offset.
    ArenaTooLarge {
        /// Which arena.
        arena: &'static str,
        /// The configured capacity in bytes.
        bytes: usize,
    },
    /// A record table has zero capacity.
    EmptyTable {
        /// Which table.
        table: &'static str,
    },
    /// The snapshot path cannot be passed to a file source as UTF-8.
    SnapshotPathNotUtf8 {
        /// Lossy rendering of the path.
        path: String,
    },
    /// The snapshot path could not be made absolute.
    SnapshotPathUnresolved {
        /// Lossy rendering of the path.
        path: String,
        /// Why resolution failed.
        detail: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxDepth { configured } => write!(
                f,
                "max_depth {configured} must be in 1..={}",
                ManagerConfig::MAX_DEPTH_LIMIT
            ),
            Self::ArenaTooLarge { arena, bytes } => {
                write!(f, "{arena} arena capacity {bytes} exceeds u32::MAX")
            }
            Self::EmptyTable { table } => write!(f, "{table} table capacity must be at least 1"),
            Self::SnapshotPathNotUtf8 { path } => {
                write!(f, "snapshot path '{path}' is not valid UTF-8")
            }
            Self::SnapshotPathUnresolved { path, detail } => {
                write!(f, "cannot resolve snapshot path '{path}': {detail}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── ManagerConfig ──────────────────────────────────────────────────

/// Complete configuration for an [`AssetManager`](crate::AssetManager).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Fixed capacities of the four arenas.
    pub arena: ArenaConfig,
    /// Recursion ceiling for nested loads. Default: 16.
    ///
    /// A dependency cycle recurses until this ceiling trips; it is the
    /// only cycle guard.
    pub max_depth: usize,
    /// Where the cache snapshot is read at startup and written on flush.
    /// Default: `kiln-cache.bin`.
    pub snapshot_path: PathBuf,
}

impl ManagerConfig {
    /// Default recursion ceiling.
    pub const DEFAULT_MAX_DEPTH: usize = 16;

    /// Largest accepted recursion ceiling.
    pub const MAX_DEPTH_LIMIT: usize = 256;

    /// Default snapshot file name.
    pub const DEFAULT_SNAPSHOT_PATH: &'static str = "kiln-cache.bin";

    /// Default configuration writing its snapshot to `snapshot_path`.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            arena: ArenaConfig::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Set the arena capacities.
    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    /// Set the recursion ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(ConfigError::InvalidMaxDepth {
                configured: self.max_depth,
            });
        }
        let a = &self.arena;
        for (arena, bytes) in [("asset", a.asset_bytes), ("dependency", a.dependency_bytes)] {
            if bytes > ArenaConfig::MAX_BYTE_CAPACITY {
                return Err(ConfigError::ArenaTooLarge { arena, bytes });
            }
        }
        if a.max_entries == 0 {
            return Err(ConfigError::EmptyTable {
                table: "cache entry",
            });
        }
        if a.max_descriptors == 0 {
            return Err(ConfigError::EmptyTable {
                table: "descriptor",
            });
        }
        self.snapshot_path_str()?;
        Ok(())
    }

    /// `snapshot_path` resolved against the working directory.
    ///
    /// The manager reads and writes the snapshot through this form, so a
    /// file source with its own root still opens the file a flush wrote.
    pub fn absolute_snapshot_path(&self) -> Result<PathBuf, ConfigError> {
        std::path::absolute(&self.snapshot_path).map_err(|e| {
            ConfigError::SnapshotPathUnresolved {
                path: self.snapshot_path.to_string_lossy().into_owned(),
                detail: e.to_string(),
            }
        })
    }

    /// The snapshot path as the string handed to a file source.
    pub fn snapshot_path_str(&self) -> Result<&str, ConfigError> {
        self.snapshot_path
            .to_str()
            .ok_or_else(|| ConfigError::SnapshotPathNotUtf8 {
                path: self.snapshot_path.to_string_lossy().into_owned(),
            })
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SNAPSHOT_PATH)
    }
}

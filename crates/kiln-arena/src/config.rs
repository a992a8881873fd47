//! Arena configuration parameters.

/// Capacities of the four arenas owned by an asset manager.
///
/// All values are fixed at creation. Capacity is reserved up front and
/// committed lazily by the OS as the arena fills, so generous defaults
/// cost address space, not memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of the converted-asset arena in bytes.
    ///
    /// Default: 256 MiB. Must fit in a `u32` offset.
    pub asset_bytes: usize,

    /// Capacity of the dependency-string arena in bytes.
    ///
    /// Default: 4 MiB. Must fit in a `u32` offset.
    pub dependency_bytes: usize,

    /// Maximum number of cache entries.
    ///
    /// Default: 65 536.
    pub max_entries: usize,

    /// Maximum number of descriptors resolved in one session.
    ///
    /// Default: 65 536.
    pub max_descriptors: usize,
}

impl ArenaConfig {
    /// Default asset arena capacity: 256 MiB.
    pub const DEFAULT_ASSET_BYTES: usize = 256 * 1024 * 1024;

    /// Default dependency arena capacity: 4 MiB.
    pub const DEFAULT_DEPENDENCY_BYTES: usize = 4 * 1024 * 1024;

    /// Default cache-entry table capacity.
    pub const DEFAULT_MAX_ENTRIES: usize = 65_536;

    /// Default descriptor table capacity.
    pub const DEFAULT_MAX_DESCRIPTORS: usize = 65_536;

    /// Largest byte capacity addressable by a `u32` [`BlobRange`](kiln_core::BlobRange).
    pub const MAX_BYTE_CAPACITY: usize = u32::MAX as usize;

    /// Set the asset arena capacity.
    pub fn with_asset_bytes(mut self, bytes: usize) -> Self {
        self.asset_bytes = bytes;
        self
    }

    /// Set the dependency arena capacity.
    pub fn with_dependency_bytes(mut self, bytes: usize) -> Self {
        self.dependency_bytes = bytes;
        self
    }

    /// Set both table capacities.
    pub fn with_max_records(mut self, entries: usize, descriptors: usize) -> Self {
        self.max_entries = entries;
        self.max_descriptors = descriptors;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            asset_bytes: Self::DEFAULT_ASSET_BYTES,
            dependency_bytes: Self::DEFAULT_DEPENDENCY_BYTES,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            max_descriptors: Self::DEFAULT_MAX_DESCRIPTORS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_asset_arena_is_256mib() {
        let config = ArenaConfig::default();
        assert_eq!(config.asset_bytes, 256 * 1024 * 1024);
    }

    #[test]
    fn builders_override_defaults() {
        let config = ArenaConfig::default()
            .with_asset_bytes(1024)
            .with_dependency_bytes(64)
            .with_max_records(8, 16);
        assert_eq!(config.asset_bytes, 1024);
        assert_eq!(config.dependency_bytes, 64);
        assert_eq!(config.max_entries, 8);
        assert_eq!(config.max_descriptors, 16);
    }
}

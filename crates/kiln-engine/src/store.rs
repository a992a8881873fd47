//! The cache-entry table, descriptor table, and their backing arenas.
//!
//! [`Store`] owns all four arenas of an asset manager. Lookups are
//! linear first-match scans; the tables are append-only.

use kiln_arena::{ArenaConfig, ArenaError, ByteArena, TableArena};
use kiln_core::{AssetHandle, PathName};
use kiln_snapshot::{CacheEntry, DependencyPaths, Snapshot, SnapshotView};
use smallvec::SmallVec;

/// Dependency paths of one load, inline for the common small case.
pub type DependencyList = SmallVec<[PathName; 4]>;

/// "Path P is resolved in this session to asset A."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// The requested path, exactly as spelled by the requester.
    pub name: PathName,
    /// The resolved asset.
    pub asset: AssetHandle,
}

/// Arena-backed tables owned by one asset manager.
pub struct Store {
    assets: ByteArena,
    dependencies: ByteArena,
    entries: TableArena<CacheEntry>,
    descriptors: TableArena<AssetDescriptor>,
    /// Cache entries created this session. Non-zero means a flush must write.
    modifications: u64,
}

impl Store {
    /// Empty tables with the configured capacities.
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            assets: ByteArena::with_capacity("asset", config.asset_bytes),
            dependencies: ByteArena::with_capacity("dependency", config.dependency_bytes),
            entries: TableArena::with_capacity("cache entry", config.max_entries),
            descriptors: TableArena::with_capacity("descriptor", config.max_descriptors),
            modifications: 0,
        }
    }

    /// Tables restored from a decoded snapshot.
    ///
    /// Persisted regions are copied into fresh arenas. Each arena keeps at
    /// least its configured capacity so the session can still convert.
    pub fn from_snapshot(config: &ArenaConfig, snapshot: &Snapshot<'_>) -> Self {
        let entries = TableArena::from_records(
            "cache entry",
            snapshot.entries.iter().copied(),
            config.max_entries,
        );
        Self {
            assets: ByteArena::from_bytes("asset", snapshot.asset_blob, config.asset_bytes),
            dependencies: ByteArena::from_bytes(
                "dependency",
                snapshot.dependency_blob,
                config.dependency_bytes,
            ),
            entries,
            descriptors: TableArena::with_capacity("descriptor", config.max_descriptors),
            modifications: 0,
        }
    }

    // ── Descriptor table ────────────────────────────────────────────

    /// First descriptor whose name equals `path`.
    pub fn descriptor(&self, path: &str) -> Option<&AssetDescriptor> {
        self.descriptors.find(|d| d.name == path)
    }

    /// Record that `name` resolved to `asset` in this session.
    pub fn push_descriptor(&mut self, name: PathName, asset: AssetHandle) -> Result<(), ArenaError> {
        self.descriptors.push(AssetDescriptor { name, asset })?;
        Ok(())
    }

    /// Descriptors resolved this session, in resolution order.
    pub fn descriptors(&self) -> &[AssetDescriptor] {
        self.descriptors.as_slice()
    }

    // ── Cache-entry table ───────────────────────────────────────────

    /// First cache entry whose name equals `path`.
    pub fn entry(&self, path: &str) -> Option<&CacheEntry> {
        self.entries.find(|e| e.name == path)
    }

    /// First cache entry for `path` recorded with exactly this size and
    /// timestamp.
    ///
    /// A reconverted path has several entries; any of them may be current.
    pub fn current_entry(&self, path: &str, len: u64, modified: u64) -> Option<&CacheEntry> {
        self.entries.find(|e| e.is_current(path, len, modified))
    }

    /// All cache entries in creation order.
    pub fn entries(&self) -> &[CacheEntry] {
        self.entries.as_slice()
    }

    /// The recorded dependency paths of `entry`, in recording order.
    ///
    /// Strings were validated when they were written or restored; any that
    /// fail to decode are skipped.
    pub fn dependencies_of(&self, entry: &CacheEntry) -> DependencyList {
        DependencyPaths::new(
            self.dependencies.used_bytes(),
            entry.dependencies_start,
            entry.dependency_count,
        )
        .filter_map(|path| path.ok().and_then(|p| PathName::new(p).ok()))
        .collect()
    }

    /// Append a cache entry and its descriptor for a fresh conversion.
    ///
    /// All-or-nothing: capacity for the dependency strings, the entry and
    /// the descriptor is checked before anything is written.
    pub fn commit(
        &mut self,
        name: PathName,
        timestamp: u64,
        content_length: u64,
        asset: AssetHandle,
        dependencies: &[PathName],
    ) -> Result<(), ArenaError> {
        let dep_bytes: usize = dependencies.iter().map(|d| d.len() + 1).sum();
        if dep_bytes > self.dependencies.remaining() {
            return Err(ArenaError::CapacityExceeded {
                arena: self.dependencies.name(),
                requested: dep_bytes,
                used: self.dependencies.used(),
                capacity: self.dependencies.capacity(),
            });
        }
        check_slot(&self.entries)?;
        check_slot(&self.descriptors)?;

        let dependencies_start = self.dependencies.used() as u32;
        for dep in dependencies {
            self.dependencies.alloc_c_str(dep.as_str())?;
        }
        self.entries.push(CacheEntry {
            name,
            timestamp,
            content_length,
            asset,
            dependencies_start,
            dependency_count: dependencies.len() as u32,
        })?;
        self.descriptors.push(AssetDescriptor { name, asset })?;
        self.modifications += 1;
        Ok(())
    }

    // ── Asset arena ─────────────────────────────────────────────────

    /// Converted bytes of `asset`.
    pub fn asset_bytes(&self, asset: AssetHandle) -> Option<&[u8]> {
        self.assets.get(asset.range())
    }

    /// The converted-asset arena.
    pub fn assets(&self) -> &ByteArena {
        &self.assets
    }

    /// The converted-asset arena, for converters.
    pub fn assets_mut(&mut self) -> &mut ByteArena {
        &mut self.assets
    }

    /// The dependency-string arena.
    pub fn dependency_arena(&self) -> &ByteArena {
        &self.dependencies
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Number of cache entries created since startup or the last flush.
    pub fn modifications(&self) -> u64 {
        self.modifications
    }

    /// Mark the current state as persisted.
    pub fn clear_modifications(&mut self) {
        self.modifications = 0;
    }

    /// Borrowed view of everything a snapshot persists.
    pub fn snapshot_view(&self) -> SnapshotView<'_> {
        SnapshotView {
            entries: self.entries.as_slice(),
            asset_blob: self.assets.used_bytes(),
            dependency_blob: self.dependencies.used_bytes(),
        }
    }
}

fn check_slot<T>(table: &TableArena<T>) -> Result<(), ArenaError> {
    if table.len() >= table.capacity() {
        return Err(ArenaError::CapacityExceeded {
            arena: table.name(),
            requested: 1,
            used: table.len(),
            capacity: table.capacity(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::BlobRange;

    fn name(s: &str) -> PathName {
        PathName::new(s).unwrap()
    }

    fn small() -> ArenaConfig {
        ArenaConfig::default()
            .with_asset_bytes(64)
            .with_dependency_bytes(16)
            .with_max_records(2, 4)
    }

    #[test]
    fn commit_records_entry_descriptor_and_dependencies() {
        let mut store = Store::new(&small());
        let asset = AssetHandle(store.assets_mut().alloc_copy(b"scene").unwrap());
        store
            .commit(name("a.ogex"), 9, 100, asset, &[name("b.png"), name("c.spv")])
            .unwrap();

        let entry = *store.entry("a.ogex").unwrap();
        assert_eq!(entry.asset, asset);
        assert_eq!(entry.dependency_count, 2);
        assert_eq!(store.dependencies_of(&entry).as_slice(), &[name("b.png"), name("c.spv")]);
        assert_eq!(store.descriptor("a.ogex").unwrap().asset, asset);
        assert_eq!(store.modifications(), 1);
    }

    #[test]
    fn current_entry_requires_size_and_timestamp() {
        let mut store = Store::new(&small());
        store
            .commit(name("a.png"), 5, 10, AssetHandle::default(), &[])
            .unwrap();
        assert!(store.current_entry("a.png", 10, 5).is_some());
        assert!(store.current_entry("a.png", 11, 5).is_none());
        assert!(store.current_entry("a.png", 10, 6).is_none());
        assert!(store.current_entry("b.png", 10, 5).is_none());
    }

    #[test]
    fn reconverted_path_matches_its_newer_entry() {
        let mut store = Store::new(&small());
        store.commit(name("a.png"), 5, 10, AssetHandle::default(), &[]).unwrap();
        let newer = AssetHandle(BlobRange::new(0, 0));
        store.commit(name("a.png"), 6, 12, newer, &[]).unwrap();
        assert_eq!(store.current_entry("a.png", 12, 6).unwrap().timestamp, 6);
        assert_eq!(store.entry("a.png").unwrap().timestamp, 5);
    }

    #[test]
    fn commit_is_all_or_nothing_on_dependency_overflow() {
        let mut store = Store::new(&small());
        let deps = [name("0123456789.png"), name("x.png")];
        let err = store
            .commit(name("a.ogex"), 1, 1, AssetHandle::default(), &deps)
            .unwrap_err();
        assert!(matches!(
            err,
            ArenaError::CapacityExceeded {
                arena: "dependency",
                ..
            }
        ));
        assert!(store.entries().is_empty());
        assert!(store.descriptors().is_empty());
        assert_eq!(store.dependency_arena().used(), 0);
        assert_eq!(store.modifications(), 0);
    }

    #[test]
    fn commit_fails_cleanly_when_entry_table_full() {
        let mut store = Store::new(&small());
        store.commit(name("a"), 1, 1, AssetHandle::default(), &[]).unwrap();
        store.commit(name("b"), 1, 1, AssetHandle::default(), &[]).unwrap();
        let err = store
            .commit(name("c"), 1, 1, AssetHandle::default(), &[name("d")])
            .unwrap_err();
        assert!(matches!(
            err,
            ArenaError::CapacityExceeded {
                arena: "cache entry",
                ..
            }
        ));
        assert_eq!(store.dependency_arena().used(), 0);
        assert_eq!(store.descriptors().len(), 2);
    }

    #[test]
    fn lookups_return_first_match() {
        let mut store = Store::new(&small());
        let first = AssetHandle(BlobRange::new(0, 1));
        store.push_descriptor(name("a.png"), first).unwrap();
        store
            .push_descriptor(name("a.png"), AssetHandle(BlobRange::new(1, 1)))
            .unwrap();
        assert_eq!(store.descriptor("a.png").unwrap().asset, first);
    }
}

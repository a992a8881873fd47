//! The asset manager: session state plus the persisted cache.
//!
//! [`AssetManager`] is the user-facing API. Construction restores the
//! cache from the snapshot file (or starts cold), [`load()`] resolves
//! paths into session descriptors, and [`flush_cache()`] writes the cache
//! back when anything new was converted.
//!
//! # Ownership model
//!
//! The manager owns all four arenas, the converter registry and the file
//! source. Asset bytes are borrowed from `&self`, so no view into an arena
//! can be held across a `load()` (which takes `&mut self`).
//!
//! [`load()`]: AssetManager::load
//! [`flush_cache()`]: AssetManager::flush_cache

use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use kiln_core::{AssetHandle, FileSource, LoadError};
use kiln_snapshot::{CacheEntry, Decoded, SnapshotError, SnapshotReader, SnapshotWriter};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ManagerConfig};
use crate::metrics::{Counters, LoadReport, ManagerStats};
use crate::pipeline::{LoadOutcome, Pipeline};
use crate::registry::ConverterRegistry;
use crate::store::{AssetDescriptor, Store};

// ── StartupError ────────────────────────────────────────────────

/// Errors that prevent an [`AssetManager`] from starting.
#[derive(Debug)]
pub enum StartupError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The snapshot file carries the right tag but is truncated or corrupt.
    Snapshot(SnapshotError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Snapshot(e) => write!(f, "cannot restore cache: {e}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Snapshot(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SnapshotError> for StartupError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

// ── FlushOutcome ────────────────────────────────────────────────

/// What [`AssetManager::flush_cache()`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was converted since the last flush; no file was touched.
    Skipped,
    /// A new snapshot replaced the old one.
    Written {
        /// Size of the snapshot file.
        bytes: u64,
    },
}

// ── AssetManager ────────────────────────────────────────────────

/// Owns the cache and the session, and drives the load pipeline.
///
/// # Example
///
/// ```no_run
/// use kiln_engine::{AssetManager, ConverterRegistry, ManagerConfig, MappedFileSource};
/// # use kiln_core::{AssetHandle, ConvertError};
/// # use kiln_engine::{ConvertContext, Converter, SourceData};
/// # struct Raw;
/// # impl Converter for Raw {
/// #     fn name(&self) -> &str { "raw" }
/// #     fn convert(&self, s: &SourceData<'_>, cx: &mut ConvertContext<'_>)
/// #         -> Result<AssetHandle, ConvertError> { Ok(cx.write_asset(s.bytes)?) }
/// # }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = ConverterRegistry::new().with("png", Raw);
/// let config = ManagerConfig::new("build/kiln-cache.bin");
/// let mut manager = AssetManager::new(config, MappedFileSource::with_root("assets"), registry)?;
/// manager.load("textures/wall.png")?;
/// let pixels = manager.asset_data("textures/wall.png");
/// assert!(pixels.is_some());
/// manager.flush_cache()?;
/// # Ok(())
/// # }
/// ```
pub struct AssetManager<S: FileSource> {
    config: ManagerConfig,
    source: S,
    registry: ConverterRegistry,
    store: Store,
    counters: Counters,
}

impl<S: FileSource> AssetManager<S> {
    /// Validate `config` and restore the cache from its snapshot file.
    ///
    /// A relative snapshot path is resolved against the working directory
    /// here, once; [`config()`](Self::config) reports the resolved path.
    /// A missing, unreadable or foreign snapshot file starts the cache
    /// cold. A snapshot with the right tag whose size or contents do not
    /// check out is an error.
    pub fn new(
        mut config: ManagerConfig,
        mut source: S,
        registry: ConverterRegistry,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        config.snapshot_path = config.absolute_snapshot_path()?;
        let store = restore(&config, &mut source)?;
        Ok(Self {
            config,
            source,
            registry,
            store,
            counters: Counters::default(),
        })
    }

    // ── Loading ─────────────────────────────────────────────────

    /// Resolve `path` into this session, converting it if the cache has
    /// no current entry for it.
    ///
    /// # Errors
    ///
    /// Recoverable errors affect only `path`. After a fatal error (see
    /// [`LoadError::is_fatal`]) the session should be abandoned; nothing
    /// already committed is rolled back.
    pub fn load(&mut self, path: &str) -> Result<LoadOutcome, LoadError> {
        Pipeline::new(
            &mut self.source,
            &self.registry,
            &mut self.store,
            &mut self.counters,
            self.config.max_depth,
        )
        .run(path)
    }

    /// Load each path in order, stopping after the first fatal error.
    pub fn load_all<I, P>(&mut self, paths: I) -> LoadReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let replay_failures = self.counters.replay_failures;
        let mut report = LoadReport::default();
        for path in paths {
            let path = path.as_ref();
            let result = self.load(path);
            let fatal = result.as_ref().is_err_and(LoadError::is_fatal);
            report.results.push((path.to_string(), result));
            if fatal {
                break;
            }
        }
        report.replay_failures = self.counters.replay_failures - replay_failures;
        report
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Handle of `path` if it was resolved in this session.
    pub fn get_asset(&self, path: &str) -> Option<AssetHandle> {
        self.store.descriptor(path).map(|d| d.asset)
    }

    /// Converted bytes of `path` if it was resolved in this session.
    pub fn asset_data(&self, path: &str) -> Option<&[u8]> {
        self.get_asset(path)
            .and_then(|asset| self.store.asset_bytes(asset))
    }

    /// Converted bytes behind `asset`.
    pub fn asset_bytes(&self, asset: AssetHandle) -> Option<&[u8]> {
        self.store.asset_bytes(asset)
    }

    /// Descriptors resolved this session, in resolution order.
    pub fn descriptors(&self) -> &[AssetDescriptor] {
        self.store.descriptors()
    }

    /// All cache entries, restored and created.
    pub fn entries(&self) -> &[CacheEntry] {
        self.store.entries()
    }

    /// Recorded dependency paths of `path`'s most recent cache entry.
    pub fn dependencies(&self, path: &str) -> Option<Vec<String>> {
        let latest = self.store.entries().iter().rev().find(|e| e.name == path);
        latest.map(|entry| {
            self.store
                .dependencies_of(entry)
                .iter()
                .map(|d| d.as_str().to_string())
                .collect()
        })
    }

    /// Cache entries created since startup or the last flush.
    pub fn modifications(&self) -> u64 {
        self.store.modifications()
    }

    /// Arena usage and pipeline counters.
    pub fn stats(&self) -> ManagerStats {
        let assets = self.store.assets();
        let deps = self.store.dependency_arena();
        ManagerStats {
            entries: self.store.entries().len(),
            descriptors: self.store.descriptors().len(),
            asset_bytes_used: assets.used(),
            asset_bytes_capacity: assets.capacity(),
            dependency_bytes_used: deps.used(),
            dependency_bytes_capacity: deps.capacity(),
            modifications: self.store.modifications(),
            conversions: self.counters.conversions,
            cache_hits: self.counters.cache_hits,
            replay_failures: self.counters.replay_failures,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The converter registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The file source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The file source, mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the manager, returning its file source.
    ///
    /// Unflushed cache entries are dropped.
    pub fn into_source(self) -> S {
        self.source
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Write the cache to the configured snapshot path if anything was
    /// converted since startup or the last flush.
    ///
    /// The snapshot is written beside the target and renamed over it, so
    /// an interrupted flush leaves the previous snapshot intact.
    pub fn flush_cache(&mut self) -> Result<FlushOutcome, SnapshotError> {
        if self.store.modifications() == 0 {
            debug!("cache unchanged, flush skipped");
            return Ok(FlushOutcome::Skipped);
        }
        let path = &self.config.snapshot_path;
        let tmp = PartialFile::new(temp_path(path));
        let bytes = {
            let mut writer = SnapshotWriter::new(BufWriter::new(File::create(tmp.path())?));
            let bytes = writer.write_snapshot(&self.store.snapshot_view())?;
            writer.flush()?;
            bytes
        };
        fs::rename(tmp.path(), path)?;
        tmp.persisted();
        self.store.clear_modifications();
        info!(
            path = %path.display(),
            bytes,
            entries = self.store.entries().len(),
            "cache snapshot written"
        );
        Ok(FlushOutcome::Written { bytes })
    }

    /// Encode the current cache to `writer`, whatever the modification
    /// counter says. The counter is left unchanged.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<u64, SnapshotError> {
        let mut writer = SnapshotWriter::new(writer);
        let bytes = writer.write_snapshot(&self.store.snapshot_view())?;
        writer.flush()?;
        Ok(bytes)
    }
}

impl<S: FileSource> fmt::Debug for AssetManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetManager")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn restore(config: &ManagerConfig, source: &mut dyn FileSource) -> Result<Store, StartupError> {
    let path = config.snapshot_path_str()?;
    let file = match source.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path, "no cache snapshot, starting cold");
            return Ok(Store::new(&config.arena));
        }
        Err(e) => {
            warn!(path, error = %e, "cache snapshot unreadable, starting cold");
            return Ok(Store::new(&config.arena));
        }
    };
    match SnapshotReader::decode(file.data())? {
        Decoded::Snapshot(snapshot) => {
            let store = Store::from_snapshot(&config.arena, &snapshot);
            info!(
                path,
                entries = snapshot.entries.len(),
                asset_bytes = snapshot.asset_blob.len(),
                dependency_bytes = snapshot.dependency_blob.len(),
                "cache snapshot loaded"
            );
            Ok(store)
        }
        Decoded::Unrecognized(reason) => {
            warn!(path, ?reason, "foreign or outdated cache snapshot, starting cold");
            Ok(Store::new(&config.arena))
        }
    }
}

/// A file being written beside its target; removed on drop unless it was
/// renamed into place.
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persisted(mut self) {
        self.persisted = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "cannot remove partial snapshot");
                }
            }
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("cache/kiln-cache.bin")),
            PathBuf::from("cache/kiln-cache.bin.tmp")
        );
    }

    #[test]
    fn partial_file_is_removed_unless_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let dropped = dir.path().join("dropped.tmp");
        let kept = dir.path().join("kept.tmp");
        fs::write(&dropped, b"half").unwrap();
        fs::write(&kept, b"whole").unwrap();

        drop(PartialFile::new(dropped.clone()));
        PartialFile::new(kept.clone()).persisted();

        assert!(!dropped.exists());
        assert!(kept.exists());
    }

    #[test]
    fn startup_error_display() {
        let err = StartupError::from(SnapshotError::SizeMismatch {
            expected: 20,
            actual: 19,
        });
        assert!(err.to_string().starts_with("cannot restore cache: "));
        assert!(err.source().is_some());
    }
}

//! The recursive load algorithm.
//!
//! One [`Pipeline`] is built per top-level load. It borrows the manager's
//! store, file source and registry for the duration of that load and
//! recurses through converters via [`ConvertBackend`].

use kiln_arena::ByteArena;
use kiln_core::{
    base_directory, extension, AssetHandle, ConvertError, FileSource, LoadError, PathName,
};
use tracing::{debug, warn};

use crate::convert::{ConvertBackend, ConvertContext, SourceData};
use crate::metrics::Counters;
use crate::registry::ConverterRegistry;
use crate::store::{DependencyList, Store};

/// How a successful load was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// A current cache entry was reused and its dependencies replayed.
    CacheHit,
    /// The source was converted and a fresh cache entry recorded.
    Converted,
}

#[derive(Clone, Copy, Debug)]
struct Resolved {
    outcome: LoadOutcome,
    asset: AssetHandle,
}

pub(crate) struct Pipeline<'a> {
    source: &'a mut dyn FileSource,
    registry: &'a ConverterRegistry,
    store: &'a mut Store,
    counters: &'a mut Counters,
    max_depth: usize,
    /// First fatal error raised below a converter, re-raised once it returns.
    fatal: Option<LoadError>,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(
        source: &'a mut dyn FileSource,
        registry: &'a ConverterRegistry,
        store: &'a mut Store,
        counters: &'a mut Counters,
        max_depth: usize,
    ) -> Self {
        Self {
            source,
            registry,
            store,
            counters,
            max_depth,
            fatal: None,
        }
    }

    /// Load `path` as a top-level request.
    pub(crate) fn run(mut self, path: &str) -> Result<LoadOutcome, LoadError> {
        self.resolve(path, 0).map(|r| r.outcome)
    }

    fn resolve(&mut self, path: &str, depth: usize) -> Result<Resolved, LoadError> {
        let name = PathName::new(path)?;
        if self.store.descriptor(path).is_some() {
            debug!(path, depth, "already loaded in this session");
            return Err(LoadError::DuplicateInSession {
                path: path.to_string(),
            });
        }
        if depth >= self.max_depth {
            return Err(LoadError::DepthExceeded {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }

        let file = self
            .source
            .open(path)
            .map_err(|e| LoadError::open_failed(path, &e))?;
        let len = file.len();
        let modified = file.modified();

        if let Some(entry) = self.store.current_entry(path, len, modified).copied() {
            drop(file);
            // Pushed before replay so a cycle through this path stops here.
            self.store.push_descriptor(name, entry.asset)?;
            self.counters.cache_hits += 1;
            debug!(
                path,
                depth,
                dependencies = entry.dependency_count,
                "cache hit"
            );
            for dep in self.store.dependencies_of(&entry) {
                match self.resolve(dep.as_str(), depth + 1) {
                    Ok(_) | Err(LoadError::DuplicateInSession { .. }) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        self.counters.replay_failures += 1;
                        warn!(
                            path,
                            dependency = dep.as_str(),
                            error = %e,
                            "recorded dependency failed to re-resolve"
                        );
                    }
                }
            }
            return Ok(Resolved {
                outcome: LoadOutcome::CacheHit,
                asset: entry.asset,
            });
        }

        let registry = self.registry;
        let Some(converter) = registry.for_path(path) else {
            return Err(LoadError::NoConverter {
                path: path.to_string(),
                extension: extension(path).map(str::to_string),
            });
        };
        debug!(path, depth, converter = converter.name(), "cache miss");

        let mut dependencies = DependencyList::new();
        self.counters.conversions += 1;
        let converted = {
            let source = SourceData {
                bytes: file.data(),
                path,
                base_dir: base_directory(path),
            };
            let mut cx = ConvertContext::new(self, &mut dependencies, depth);
            converter.convert(&source, &mut cx)
        };
        drop(file);

        if let Some(fatal) = self.fatal.take() {
            return Err(fatal);
        }
        let asset = converted.map_err(|reason| LoadError::ConversionFailed {
            path: path.to_string(),
            reason: Box::new(reason),
        })?;
        if self.store.asset_bytes(asset).is_none() {
            return Err(LoadError::ConversionFailed {
                path: path.to_string(),
                reason: Box::new(ConvertError::malformed(format!(
                    "converter '{}' returned {} outside the asset arena",
                    converter.name(),
                    asset.range()
                ))),
            });
        }

        self.store
            .commit(name, modified, len, asset, &dependencies)?;
        debug!(
            path,
            depth,
            bytes = asset.len(),
            dependencies = dependencies.len(),
            "converted"
        );
        Ok(Resolved {
            outcome: LoadOutcome::Converted,
            asset,
        })
    }
}

impl ConvertBackend for Pipeline<'_> {
    fn load_nested(&mut self, path: &str, depth: usize) -> Result<AssetHandle, LoadError> {
        match self.resolve(path, depth) {
            Ok(resolved) => Ok(resolved.asset),
            Err(e @ LoadError::DuplicateInSession { .. }) => {
                self.store.descriptor(path).map(|d| d.asset).ok_or(e)
            }
            Err(e) => {
                if e.is_fatal() {
                    self.latch_fatal(&e);
                }
                Err(e)
            }
        }
    }

    fn assets(&mut self) -> &mut ByteArena {
        self.store.assets_mut()
    }

    fn latch_fatal(&mut self, err: &LoadError) {
        if self.fatal.is_none() {
            self.fatal = Some(err.clone());
        }
    }
}

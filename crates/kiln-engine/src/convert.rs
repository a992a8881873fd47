//! The [`Converter`] trait and the context handed to it.
//!
//! Converters are swappable, format-specific strategies. The pipeline
//! invokes one per cache miss with the raw source bytes and a
//! [`ConvertContext`] through which the converter writes its output and
//! requests nested loads of the files it depends on.

use kiln_arena::ByteArena;
use kiln_core::{AssetHandle, ConvertError, LoadError, PathName};

use crate::store::DependencyList;

/// Raw input of one conversion.
///
/// Borrowed from the open source file; a converter must not retain it
/// beyond the call.
#[derive(Clone, Copy, Debug)]
pub struct SourceData<'a> {
    /// The complete source file contents.
    pub bytes: &'a [u8],
    /// The path being converted, as requested.
    pub path: &'a str,
    /// Prefix of `path` up to and including its last separator.
    pub base_dir: &'a str,
}

impl SourceData<'_> {
    /// Size of the source in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the source is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Turns raw source bytes of one format into engine-ready asset data.
///
/// # Contract
///
/// - Output goes only into the asset arena, via [`ConvertContext`].
/// - Files the asset depends on are loaded with
///   [`ConvertContext::load_dependency`], which also records them so a
///   later cache hit can re-resolve them without conversion.
/// - A returned error leaves no cache entry behind.
///
/// # Object safety
///
/// This trait is object-safe; the registry stores converters as
/// `Box<dyn Converter>`.
///
/// # Examples
///
/// A converter that upper-cases ASCII text:
///
/// ```
/// use kiln_core::{AssetHandle, ConvertError};
/// use kiln_engine::{ConvertContext, Converter, SourceData};
///
/// struct Shout;
///
/// impl Converter for Shout {
///     fn name(&self) -> &str { "shout" }
///
///     fn convert(
///         &self,
///         source: &SourceData<'_>,
///         cx: &mut ConvertContext<'_>,
///     ) -> Result<AssetHandle, ConvertError> {
///         let asset = cx.alloc_asset(source.len())?;
///         if let Some(out) = cx.asset_bytes_mut(asset) {
///             out.copy_from_slice(source.bytes);
///             out.make_ascii_uppercase();
///         }
///         Ok(asset)
///     }
/// }
/// ```
pub trait Converter {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Convert one source file.
    fn convert(
        &self,
        source: &SourceData<'_>,
        cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError>;
}

/// The pipeline services a [`ConvertContext`] forwards to.
pub(crate) trait ConvertBackend {
    /// Run the full load algorithm for a nested path.
    fn load_nested(&mut self, path: &str, depth: usize) -> Result<AssetHandle, LoadError>;

    /// The converted-asset arena.
    fn assets(&mut self) -> &mut ByteArena;

    /// Remember a fatal error so it survives a converter that drops it.
    fn latch_fatal(&mut self, err: &LoadError);
}

/// Execution context passed to [`Converter::convert`].
pub struct ConvertContext<'a> {
    backend: &'a mut dyn ConvertBackend,
    dependencies: &'a mut DependencyList,
    depth: usize,
}

impl<'a> ConvertContext<'a> {
    pub(crate) fn new(
        backend: &'a mut dyn ConvertBackend,
        dependencies: &'a mut DependencyList,
        depth: usize,
    ) -> Self {
        Self {
            backend,
            dependencies,
            depth,
        }
    }

    /// Recursion depth of the conversion in progress (0 for a top-level load).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Dependencies requested so far, in request order.
    pub fn dependencies(&self) -> &[PathName] {
        self.dependencies
    }

    /// Load `path` as a dependency of the asset being converted.
    ///
    /// The path is recorded as a dependency whatever the outcome, once per
    /// conversion. A path already resolved this session is not reloaded;
    /// its existing handle is returned.
    ///
    /// Fatal errors (depth exceeded, arena exhausted) are also latched by
    /// the pipeline, so the enclosing load fails even if the converter
    /// ignores the returned error.
    pub fn load_dependency(&mut self, path: &str) -> Result<AssetHandle, LoadError> {
        let name = PathName::new(path)?;
        if !self.dependencies.contains(&name) {
            self.dependencies.push(name);
        }
        self.backend.load_nested(path, self.depth + 1)
    }

    /// Allocate `size` zeroed bytes of asset data.
    pub fn alloc_asset(&mut self, size: usize) -> Result<AssetHandle, LoadError> {
        let result = self.backend.assets().allocate(size);
        self.arena_result(result)
    }

    /// Store a copy of `bytes` as asset data.
    pub fn write_asset(&mut self, bytes: &[u8]) -> Result<AssetHandle, LoadError> {
        let result = self.backend.assets().alloc_copy(bytes);
        self.arena_result(result)
    }

    /// Read back asset data, e.g. a dependency's converted bytes.
    pub fn asset_bytes(&mut self, asset: AssetHandle) -> Option<&[u8]> {
        self.backend.assets().get(asset.range())
    }

    /// Mutable view of asset data allocated during this conversion.
    pub fn asset_bytes_mut(&mut self, asset: AssetHandle) -> Option<&mut [u8]> {
        self.backend.assets().get_mut(asset.range())
    }

    fn arena_result(
        &mut self,
        result: Result<kiln_core::BlobRange, kiln_arena::ArenaError>,
    ) -> Result<AssetHandle, LoadError> {
        match result {
            Ok(range) => Ok(AssetHandle(range)),
            Err(e) => {
                let err = LoadError::from(e);
                self.backend.latch_fatal(&err);
                Err(err)
            }
        }
    }
}

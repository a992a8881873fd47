//! Extension-to-converter dispatch table.

use kiln_core::extension;

use crate::convert::Converter;

/// Maps file extensions to converters.
///
/// Lookup is a linear scan with exact, case-sensitive string matching;
/// the first registration for an extension wins and later ones are never
/// reached.
///
/// ```
/// use kiln_engine::ConverterRegistry;
/// # use kiln_core::{AssetHandle, ConvertError};
/// # use kiln_engine::{ConvertContext, Converter, SourceData};
/// # struct Raw;
/// # impl Converter for Raw {
/// #     fn name(&self) -> &str { "raw" }
/// #     fn convert(&self, s: &SourceData<'_>, cx: &mut ConvertContext<'_>)
/// #         -> Result<AssetHandle, ConvertError> { Ok(cx.write_asset(s.bytes)?) }
/// # }
///
/// let registry = ConverterRegistry::new().with("png", Raw).with("spv", Raw);
/// assert!(registry.for_path("textures/wall.png").is_some());
/// assert!(registry.for_path("textures/wall.PNG").is_none());
/// assert!(registry.for_path("textures/wall").is_none());
/// ```
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<(String, Box<dyn Converter>)>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` for `extension` (without the dot).
    pub fn register(&mut self, extension: impl Into<String>, converter: Box<dyn Converter>) {
        self.converters.push((extension.into(), converter));
    }

    /// Builder form of [`register`](ConverterRegistry::register).
    pub fn with(mut self, extension: impl Into<String>, converter: impl Converter + 'static) -> Self {
        self.register(extension, Box::new(converter));
        self
    }

    /// Converter registered for `extension`, if any.
    pub fn get(&self, extension: &str) -> Option<&dyn Converter> {
        self.converters
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, c)| c.as_ref())
    }

    /// Converter for `path`'s extension, if it has one.
    pub fn for_path(&self, path: &str) -> Option<&dyn Converter> {
        extension(path).and_then(|ext| self.get(ext))
    }

    /// Registered extensions in declaration order, duplicates included.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.converters.iter().map(|(ext, _)| ext.as_str())
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

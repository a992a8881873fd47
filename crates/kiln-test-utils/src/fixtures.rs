//! Reusable converter fixtures.
//!
//! - [`CountingConverter`]: copies the source verbatim and counts calls.
//! - [`FailingConverter`]: always rejects the source.
//! - [`SwallowingConverter`]: loads each listed dependency and ignores
//!   every failure, including fatal ones.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kiln_core::{AssetHandle, ConvertError};
use kiln_engine::{ConvertContext, Converter, SourceData};

/// Copies the source into the asset arena and counts invocations.
///
/// Clones share one counter, so a test can keep a clone after moving the
/// original into a registry.
#[derive(Clone, Debug, Default)]
pub struct CountingConverter {
    calls: Arc<AtomicUsize>,
}

impl CountingConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `convert` calls so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Converter for CountingConverter {
    fn name(&self) -> &str {
        "counting"
    }

    fn convert(
        &self,
        source: &SourceData<'_>,
        cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(cx.write_asset(source.bytes)?)
    }
}

/// Rejects every source as malformed.
#[derive(Clone, Debug, Default)]
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn name(&self) -> &str {
        "failing"
    }

    fn convert(
        &self,
        source: &SourceData<'_>,
        _cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError> {
        Err(ConvertError::malformed(format!(
            "refusing {} bytes of '{}'",
            source.len(),
            source.path
        )))
    }
}

/// Treats each non-empty line as a path to load, ignores every load
/// error, and stores the source verbatim.
#[derive(Clone, Debug, Default)]
pub struct SwallowingConverter;

impl Converter for SwallowingConverter {
    fn name(&self) -> &str {
        "swallowing"
    }

    fn convert(
        &self,
        source: &SourceData<'_>,
        cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError> {
        let text = std::str::from_utf8(source.bytes)
            .map_err(|e| ConvertError::malformed(e.to_string()))?;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let _ = cx.load_dependency(line);
        }
        Ok(cx.write_asset(source.bytes)?)
    }
}

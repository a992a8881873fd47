//! Verbatim storage converter.

use kiln_core::{AssetHandle, ConvertError};
use kiln_engine::{ConvertContext, Converter, SourceData};

/// Stores the source bytes unchanged.
///
/// ```
/// use kiln_converters::CopyConverter;
/// use kiln_engine::ConverterRegistry;
///
/// let registry = ConverterRegistry::new().with("png", CopyConverter);
/// assert_eq!(registry.get("png").unwrap().name(), "copy");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CopyConverter;

impl Converter for CopyConverter {
    fn name(&self) -> &str {
        "copy"
    }

    fn convert(
        &self,
        source: &SourceData<'_>,
        cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError> {
        Ok(cx.write_asset(source.bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::LoadError;
    use kiln_engine::{ArenaConfig, AssetManager, ConverterRegistry, LoadOutcome, ManagerConfig};
    use kiln_test_utils::MockFileSource;

    fn manager(source: MockFileSource) -> AssetManager<MockFileSource> {
        let registry = ConverterRegistry::new().with("png", CopyConverter);
        AssetManager::new(ManagerConfig::new("no-snapshot.bin"), source, registry).unwrap()
    }

    #[test]
    fn stores_bytes_verbatim() {
        let mut source = MockFileSource::new();
        source.insert("a.png", b"\x89PNG\r\n");
        let mut m = manager(source);

        assert_eq!(m.load("a.png").unwrap(), LoadOutcome::Converted);
        assert_eq!(m.asset_data("a.png").unwrap(), b"\x89PNG\r\n");
    }

    #[test]
    fn empty_source_gives_empty_asset() {
        let mut source = MockFileSource::new();
        source.insert("empty.png", b"");
        let mut m = manager(source);

        m.load("empty.png").unwrap();
        assert_eq!(m.asset_data("empty.png").unwrap(), b"");
    }

    #[test]
    fn arena_exhaustion_is_fatal() {
        let mut source = MockFileSource::new();
        source.insert("big.png", vec![0u8; 64]);
        let config = ManagerConfig::new("no-snapshot.bin")
            .with_arena(ArenaConfig::default().with_asset_bytes(32));
        let registry = ConverterRegistry::new().with("png", CopyConverter);
        let mut m = AssetManager::new(config, source, registry).unwrap();

        let err = m.load("big.png").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, LoadError::AllocationExhausted { arena: "asset", .. }));
        assert!(m.entries().is_empty());
    }
}

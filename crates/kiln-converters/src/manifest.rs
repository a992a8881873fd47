//! Dependency-list converter.
//!
//! # Format
//!
//! UTF-8 text, one dependency path per line. Blank lines and lines
//! starting with `#` are ignored; surrounding whitespace is trimmed.
//!
//! ```text
//! # level one
//! textures/wall.png
//! shaders/lit.spv
//! /shared/fog.png
//! ```
//!
//! A path is resolved against the manifest's own directory unless it
//! starts with `/`, which makes it relative to the build root instead.
//! The stored asset is the resolved paths that loaded, joined by `\n`.

use kiln_core::{AssetHandle, ConvertError};
use kiln_engine::{ConvertContext, Converter, SourceData};
use tracing::debug;

/// Loads every path a manifest lists.
///
/// Recoverable dependency failures (missing file, no converter, failed
/// conversion) are skipped; the dependency stays recorded, so the next
/// run retries it. Fatal failures abort the manifest.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestConverter;

impl Converter for ManifestConverter {
    fn name(&self) -> &str {
        "manifest"
    }

    fn convert(
        &self,
        source: &SourceData<'_>,
        cx: &mut ConvertContext<'_>,
    ) -> Result<AssetHandle, ConvertError> {
        let text = std::str::from_utf8(source.bytes).map_err(|e| {
            ConvertError::malformed(format!("manifest is not UTF-8: {e}"))
        })?;

        let mut resolved = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let path = resolve(source.base_dir, line);
            match cx.load_dependency(&path) {
                Ok(_) => resolved.push(path),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => debug!(manifest = source.path, dependency = %path, error = %e, "skipping dependency"),
            }
        }
        Ok(cx.write_asset(resolved.join("\n").as_bytes())?)
    }
}

/// Resolve a manifest line against the manifest's directory.
fn resolve(base_dir: &str, line: &str) -> String {
    match line.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("{base_dir}{line}"),
    }
}

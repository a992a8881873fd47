//! Reference converters for the Kiln asset pipeline.
//!
//! - [`CopyConverter`]: stores the source bytes verbatim. Registered for
//!   formats that need no transformation at build time.
//! - [`ManifestConverter`]: a text list of dependency paths. Loads each
//!   one through the pipeline, so a cached manifest re-resolves its whole
//!   subtree without reconversion.
//!
//! [`default_registry`] wires both to the extensions the `kiln` command
//! line tool builds.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod copy;
pub mod manifest;

pub use copy::CopyConverter;
pub use manifest::ManifestConverter;

use kiln_engine::ConverterRegistry;

/// Extensions stored verbatim by [`default_registry`].
pub const COPY_EXTENSIONS: &[&str] = &["png", "jpg", "spv", "bin", "wav"];

/// Extensions parsed as manifests by [`default_registry`].
pub const MANIFEST_EXTENSIONS: &[&str] = &["ogex", "manifest"];

/// A registry with [`CopyConverter`] for [`COPY_EXTENSIONS`] and
/// [`ManifestConverter`] for [`MANIFEST_EXTENSIONS`].
pub fn default_registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    for ext in COPY_EXTENSIONS {
        registry.register(*ext, Box::new(CopyConverter));
    }
    for ext in MANIFEST_EXTENSIONS {
        registry.register(*ext, Box::new(ManifestConverter));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_known_extensions() {
        let registry = default_registry();
        assert_eq!(registry.get("png").unwrap().name(), "copy");
        assert_eq!(registry.get("ogex").unwrap().name(), "manifest");
        assert!(registry.get("xyz").is_none());
        assert_eq!(
            registry.len(),
            COPY_EXTENSIONS.len() + MANIFEST_EXTENSIONS.len()
        );
    }
}

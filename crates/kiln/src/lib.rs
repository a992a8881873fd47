//! Kiln: a cached, dependency-tracking asset build pipeline.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Kiln sub-crates. For most users, adding `kiln` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::io;
//!
//! use kiln::prelude::*;
//!
//! // An in-memory file source where every file is one tick old.
//! struct Memory(HashMap<String, Vec<u8>>);
//! struct MemoryFile(Vec<u8>);
//!
//! impl SourceFile for MemoryFile {
//!     fn data(&self) -> &[u8] { &self.0 }
//!     fn modified(&self) -> u64 { 1 }
//! }
//!
//! impl FileSource for Memory {
//!     fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>> {
//!         match self.0.get(path) {
//!             Some(data) => Ok(Box::new(MemoryFile(data.clone()))),
//!             None => Err(io::ErrorKind::NotFound.into()),
//!         }
//!     }
//! }
//!
//! let files = Memory(HashMap::from([
//!     ("scene.ogex".to_string(), b"wall.png\n".to_vec()),
//!     ("wall.png".to_string(), b"pixels".to_vec()),
//! ]));
//! let mut manager =
//!     AssetManager::new(ManagerConfig::default(), files, default_registry()).unwrap();
//!
//! assert_eq!(manager.load("scene.ogex").unwrap(), LoadOutcome::Converted);
//! assert_eq!(manager.asset_data("wall.png"), Some(&b"pixels"[..]));
//! assert!(matches!(
//!     manager.load("wall.png"),
//!     Err(LoadError::DuplicateInSession { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kiln-core` | Handles, path names, errors, file-source traits |
//! | [`arena`] | `kiln-arena` | Fixed-capacity byte and record arenas |
//! | [`snapshot`] | `kiln-snapshot` | Cache snapshot format, reader and writer |
//! | [`engine`] | `kiln-engine` | Asset manager, load pipeline, converter registry |
//! | [`converters`] | `kiln-converters` | Reference copy and manifest converters |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`kiln-core`).
///
/// Contains [`types::AssetHandle`], [`types::PathName`], the
/// [`types::LoadError`] taxonomy and the file-reading collaborator traits.
pub use kiln_core as types;

/// Fixed-capacity arenas (`kiln-arena`).
pub use kiln_arena as arena;

/// Cache snapshot persistence (`kiln-snapshot`).
///
/// [`snapshot::SnapshotWriter`] and [`snapshot::SnapshotReader`] work on
/// any byte sink or slice; the asset manager uses them for its cache file.
pub use kiln_snapshot as snapshot;

/// The asset manager and load pipeline (`kiln-engine`).
pub use kiln_engine as engine;

/// Reference converters (`kiln-converters`).
pub use kiln_converters as converters;

/// Common imports for typical Kiln usage.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use kiln_core::{AssetHandle, ConvertError, FileSource, LoadError, SourceFile};

    // Engine
    pub use kiln_engine::{
        AssetManager, ConvertContext, Converter, ConverterRegistry, FlushOutcome, LoadOutcome,
        LoadReport, ManagerConfig, MappedFileSource, SourceData,
    };

    // Converters
    pub use kiln_converters::{default_registry, CopyConverter, ManifestConverter};
}

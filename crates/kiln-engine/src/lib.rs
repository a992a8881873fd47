//! Cache-and-dependency engine for the Kiln asset pipeline.
//!
//! [`AssetManager`] owns four arenas (converted assets, dependency
//! strings, cache entries, session descriptors) and drives the recursive
//! load pipeline: dedup against the session, test cache validity by
//! path + size + timestamp, then either replay recorded dependencies or
//! dispatch to a [`Converter`] and record a fresh cache entry. The cache
//! is restored from a snapshot at startup and flushed back on demand.
//!
//! The pipeline is single-threaded and strictly recursive; nothing here
//! is `Sync`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod convert;
pub mod fs;
pub mod manager;
pub mod metrics;
mod pipeline;
pub mod registry;
pub mod store;

pub use config::{ConfigError, ManagerConfig};
pub use kiln_arena::ArenaConfig;
pub use convert::{ConvertContext, Converter, SourceData};
pub use fs::MappedFileSource;
pub use manager::{AssetManager, FlushOutcome, StartupError};
pub use metrics::{LoadReport, ManagerStats};
pub use pipeline::LoadOutcome;
pub use registry::ConverterRegistry;
pub use store::AssetDescriptor;

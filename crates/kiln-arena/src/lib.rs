//! Fixed-capacity bump arenas for the Kiln asset pipeline.
//!
//! Every arena reserves its full capacity at creation and hands out
//! monotonically increasing offsets. Nothing is ever freed individually
//! and an arena never moves its storage, so an offset handed out once
//! stays valid for the arena's lifetime (or until [`reset`]).
//!
//! # Architecture
//!
//! ```text
//! AssetManager (owner)
//! ├── ByteArena "asset"        converted asset bytes
//! ├── ByteArena "dependency"   NUL-terminated dependency paths
//! ├── TableArena<CacheEntry>   persisted validity records
//! └── TableArena<Descriptor>   per-session resolved assets
//! ```
//!
//! Four independent arenas are used so that growth of one never
//! displaces another.
//!
//! [`reset`]: ByteArena::reset

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bytes;
pub mod config;
pub mod error;
pub mod table;

pub use bytes::ByteArena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use table::TableArena;

//! Core types and traits for the Kiln asset pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: asset handles,
//! blob ranges, fixed-capacity path names, path helpers, the error
//! taxonomy, and the file-reading collaborator traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod path;
pub mod traits;

pub use error::{ConvertError, LoadError};
pub use id::{AssetHandle, BlobRange, PathName, PathTooLong};
pub use path::{base_directory, extension};
pub use traits::{FileSource, SourceFile};

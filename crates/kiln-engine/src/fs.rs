//! Memory-mapped [`FileSource`] over the local filesystem.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use kiln_core::{FileSource, SourceFile};
use memmap2::{Mmap, MmapOptions};

/// Opens files read-only and maps them into memory.
///
/// Relative paths are joined to the optional root; absolute paths are
/// used as given. Timestamps are the file's modification time in
/// nanoseconds since the Unix epoch.
#[derive(Clone, Debug, Default)]
pub struct MappedFileSource {
    root: Option<PathBuf>,
}

impl MappedFileSource {
    /// Resolve paths against the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The root relative paths are joined to, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) if Path::new(path).is_relative() => root.join(path),
            _ => PathBuf::from(path),
        }
    }
}

impl FileSource for MappedFileSource {
    fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>> {
        let file = File::open(self.resolve(path))?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is not a regular file"),
            ));
        }
        let modified = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);

        // Zero-length mappings are rejected on some platforms.
        let map = if metadata.len() == 0 {
            None
        } else {
            // SAFETY: the map is read-only and private to this handle. A
            // concurrent writer truncating the file is outside the
            // pipeline's contract, which assumes sources are not edited
            // mid-build.
            #[allow(unsafe_code)]
            let map = unsafe { MmapOptions::new().map(&file)? };
            Some(map)
        };
        Ok(Box::new(MappedFile { map, modified }))
    }
}

struct MappedFile {
    map: Option<Mmap>,
    modified: u64,
}

impl SourceFile for MappedFile {
    fn data(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    fn modified(&self) -> u64 {
        self.modified
    }
}

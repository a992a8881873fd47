//! File-reading collaborator traits.
//!
//! The pipeline reads sources and persisted snapshots through these
//! traits only. Closing a file is dropping its [`SourceFile`], so a
//! handle is released on every exit path of the load that opened it.

use std::io;

/// An open, read-only source file.
pub trait SourceFile {
    /// The full file contents.
    fn data(&self) -> &[u8];

    /// Last-modified timestamp. Units are chosen by the [`FileSource`];
    /// the pipeline only compares timestamps for equality.
    fn modified(&self) -> u64;

    /// Size of the file in bytes.
    fn len(&self) -> u64 {
        self.data().len() as u64
    }

    /// Whether the file is empty.
    fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

/// Opens source files by path.
///
/// Implementations must not hand out writable views; the pipeline never
/// writes through a [`SourceFile`].
pub trait FileSource {
    /// Open `path` for reading.
    fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>>;
}

impl<S: FileSource + ?Sized> FileSource for &mut S {
    fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>> {
        (**self).open(path)
    }
}

impl<S: FileSource + ?Sized> FileSource for Box<S> {
    fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>> {
        (**self).open(path)
    }
}

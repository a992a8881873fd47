//! Test utilities and mock collaborators for Kiln development.
//!
//! Provides an in-memory [`FileSource`] ([`MockFileSource`]) with a
//! controllable clock and an open log, plus the converter fixtures in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::io;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use kiln_core::{FileSource, SourceFile};

pub use fixtures::{CountingConverter, FailingConverter, SwallowingConverter};

/// In-memory implementation of [`FileSource`].
///
/// Files are keyed by the exact path string the pipeline asks for. Each
/// [`insert`](MockFileSource::insert) stamps the file with the next tick
/// of an internal clock, so rewriting a file always changes its
/// timestamp unless [`insert_with_time`](MockFileSource::insert_with_time)
/// pins it.
#[derive(Debug, Default)]
pub struct MockFileSource {
    files: IndexMap<String, Entry>,
    opens: Vec<String>,
    clock: u64,
}

#[derive(Clone, Debug)]
enum Entry {
    File { data: Arc<[u8]>, modified: u64 },
    Denied,
}

impl MockFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, stamped with the next clock tick.
    pub fn insert(&mut self, path: impl Into<String>, data: impl AsRef<[u8]>) -> &mut Self {
        self.clock += 1;
        let modified = self.clock;
        self.insert_with_time(path, data, modified)
    }

    /// Add or replace a file with an explicit timestamp.
    pub fn insert_with_time(
        &mut self,
        path: impl Into<String>,
        data: impl AsRef<[u8]>,
        modified: u64,
    ) -> &mut Self {
        self.files.insert(
            path.into(),
            Entry::File {
                data: Arc::from(data.as_ref()),
                modified,
            },
        );
        self
    }

    /// Copy a real file into the mock under its path string.
    ///
    /// Used to hand a flushed snapshot to a restarted manager.
    pub fn insert_from_disk(&mut self, path: &Path) -> io::Result<&mut Self> {
        let data = std::fs::read(path)?;
        let key = path.to_string_lossy().into_owned();
        Ok(self.insert(key, data))
    }

    /// Advance a file's timestamp without changing its contents.
    pub fn touch(&mut self, path: &str) {
        self.clock += 1;
        if let Some(Entry::File { modified, .. }) = self.files.get_mut(path) {
            *modified = self.clock;
        }
    }

    /// Make every later open of `path` fail with `PermissionDenied`.
    pub fn deny(&mut self, path: impl Into<String>) {
        self.files.insert(path.into(), Entry::Denied);
    }

    /// Remove a file; later opens fail with `NotFound`.
    pub fn remove(&mut self, path: &str) {
        self.files.shift_remove(path);
    }

    /// Every path passed to `open`, successful or not, in call order.
    pub fn opens(&self) -> &[String] {
        &self.opens
    }

    /// How many times `path` was opened.
    pub fn open_count(&self, path: &str) -> usize {
        self.opens.iter().filter(|p| *p == path).count()
    }

    /// Forget the open log.
    pub fn clear_opens(&mut self) {
        self.opens.clear();
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSource for MockFileSource {
    fn open(&mut self, path: &str) -> io::Result<Box<dyn SourceFile>> {
        self.opens.push(path.to_string());
        match self.files.get(path) {
            Some(Entry::File { data, modified }) => Ok(Box::new(MockFile {
                data: Arc::clone(data),
                modified: *modified,
            })),
            Some(Entry::Denied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access to '{path}' denied"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: '{path}'"),
            )),
        }
    }
}

/// An open [`MockFileSource`] file.
struct MockFile {
    data: Arc<[u8]>,
    modified: u64,
}

impl SourceFile for MockFile {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn modified(&self) -> u64 {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_stamps_increasing_times() {
        let mut source = MockFileSource::new();
        source.insert("a.png", b"one");
        let first = source.open("a.png").unwrap().modified();
        source.insert("a.png", b"two");
        let second = source.open("a.png").unwrap();
        assert!(second.modified() > first);
        assert_eq!(second.data(), b"two");
    }

    #[test]
    fn touch_keeps_contents() {
        let mut source = MockFileSource::new();
        source.insert_with_time("a.png", b"abc", 7);
        source.touch("a.png");
        let file = source.open("a.png").unwrap();
        assert_eq!(file.data(), b"abc");
        assert_ne!(file.modified(), 7);
    }

    #[test]
    fn missing_and_denied_files() {
        let mut source = MockFileSource::new();
        source.deny("secret.png");
        assert_eq!(
            source.open("nope.png").err().unwrap().kind(),
            io::ErrorKind::NotFound
        );
        assert_eq!(
            source.open("secret.png").err().unwrap().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(source.opens(), &["nope.png", "secret.png"]);
    }

    #[test]
    fn open_count_tracks_repeats() {
        let mut source = MockFileSource::new();
        source.insert("a.png", b"x");
        let _ = source.open("a.png");
        let _ = source.open("a.png");
        assert_eq!(source.open_count("a.png"), 2);
        source.clear_opens();
        assert_eq!(source.open_count("a.png"), 0);
    }
}

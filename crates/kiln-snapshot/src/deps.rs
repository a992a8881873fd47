//! Iteration over NUL-terminated dependency strings.

use crate::error::SnapshotError;

/// Iterator over `count` NUL-terminated paths starting at `start` in a
/// dependency blob.
///
/// Yields an error (and then stops) if a string runs past the end of the
/// blob, lacks its terminator, or is not UTF-8.
pub struct DependencyPaths<'a> {
    blob: &'a [u8],
    cursor: usize,
    remaining: u32,
}

impl<'a> DependencyPaths<'a> {
    /// Iterate the `count` strings starting at byte `start` of `blob`.
    pub fn new(blob: &'a [u8], start: u32, count: u32) -> Self {
        Self {
            blob,
            cursor: start as usize,
            remaining: count,
        }
    }
}

impl<'a> Iterator for DependencyPaths<'a> {
    type Item = Result<&'a str, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let Some(tail) = self.blob.get(self.cursor..) else {
            self.remaining = 0;
            return Some(Err(SnapshotError::corrupt(format!(
                "dependency offset {} is past the end of the {}-byte blob",
                self.cursor,
                self.blob.len()
            ))));
        };
        let Some(nul) = tail.iter().position(|&b| b == 0) else {
            self.remaining = 0;
            return Some(Err(SnapshotError::corrupt(format!(
                "dependency string at {} is not NUL-terminated",
                self.cursor
            ))));
        };
        let at = self.cursor;
        self.cursor += nul + 1;
        match std::str::from_utf8(&tail[..nul]) {
            Ok(s) => Some(Ok(s)),
            Err(e) => {
                self.remaining = 0;
                Some(Err(SnapshotError::corrupt(format!(
                    "dependency string at {at} is not UTF-8: {e}"
                ))))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

//! Path helpers used for converter dispatch.
//!
//! Both helpers work on the raw path string. They accept `/` and `\` as
//! separators and never touch the filesystem.

fn is_separator(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

/// Extension of `path`, without the dot.
///
/// Scans backward from the end for the first `.`, `/` or `\`. A separator
/// reached before any dot means the final component has no extension and
/// `None` is returned.
///
/// ```
/// use kiln_core::extension;
///
/// assert_eq!(extension("models/ship.ogex"), Some("ogex"));
/// assert_eq!(extension("archive.d/readme"), None);
/// assert_eq!(extension("noext"), None);
/// ```
pub fn extension(path: &str) -> Option<&str> {
    let bytes = path.as_bytes();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'.' => return Some(&path[i + 1..]),
            b if is_separator(b) => return None,
            _ => {}
        }
    }
    None
}

/// Longest prefix of `path` ending at its last separator, separator included.
///
/// Returns an empty string for a bare file name.
///
/// ```
/// use kiln_core::base_directory;
///
/// assert_eq!(base_directory("assets/models/ship.ogex"), "assets/models/");
/// assert_eq!(base_directory("ship.ogex"), "");
/// ```
pub fn base_directory(path: &str) -> &str {
    match path.bytes().rposition(is_separator) {
        Some(i) => &path[..=i],
        None => "",
    }
}

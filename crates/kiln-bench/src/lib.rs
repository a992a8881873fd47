//! Benchmark profiles and utilities for the Kiln asset pipeline.
//!
//! - [`scene_profile`]: a two-level scene of manifests over leaf assets,
//!   held in a [`MockFileSource`]
//! - [`leaf_bytes`]: deterministic leaf contents of a given size

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_test_utils::MockFileSource;

/// A scene to build: the files plus the top-level paths to request.
pub struct SceneProfile {
    /// Every file of the scene.
    pub source: MockFileSource,
    /// Top-level manifests, in request order.
    pub roots: Vec<String>,
    /// Total number of files, manifests included.
    pub file_count: usize,
}

/// Build `manifests` level manifests, each listing `leaves` textures and
/// shaders of `leaf_size` bytes, all under a shared `levels/` directory.
///
/// Every manifest also lists one texture shared by all levels, so later
/// manifests exercise the in-session duplicate path.
pub fn scene_profile(manifests: usize, leaves: usize, leaf_size: usize) -> SceneProfile {
    let mut source = MockFileSource::new();
    let mut roots = Vec::with_capacity(manifests);
    source.insert("shared/palette.png", leaf_bytes(0, leaf_size));
    for m in 0..manifests {
        let mut listing = String::from("/shared/palette.png\n");
        for l in 0..leaves {
            let ext = if l % 2 == 0 { "png" } else { "spv" };
            let leaf = format!("level{m}/leaf{l}.{ext}");
            source.insert(format!("levels/{leaf}"), leaf_bytes(m * leaves + l, leaf_size));
            listing.push_str(&leaf);
            listing.push('\n');
        }
        let root = format!("levels/level{m}.ogex");
        source.insert(root.as_str(), listing);
        roots.push(root);
    }
    SceneProfile {
        source,
        roots,
        file_count: 1 + manifests * (leaves + 1),
    }
}

/// Deterministic bytes for leaf `seed`.
pub fn leaf_bytes(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ seed) as u8).collect()
}

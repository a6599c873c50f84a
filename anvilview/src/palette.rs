//! Texture-derived block palette.
//!
//! Built once at startup from a directory of block textures, then shared
//! read-only across worker threads — the same "scan once, intern, share"
//! shape as the teacher's `util::intern_str` + `asset.rs::AssetCache::new`
//! directory check, just applied to building a stable name<->index mapping
//! instead of a lazy sprite cache.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use arcstr::ArcStr;

/// Sentinel block names that never get a grid entry.
const AIR_NAMES: [&str; 2] = ["air", "cave_air"];

#[derive(Debug)]
pub struct PaletteRegistry {
    /// `forward[i - 1]` is the block name for index `i` (index 0 is reserved).
    forward: Vec<ArcStr>,
    inverse: HashMap<ArcStr, u16>,
}

impl PaletteRegistry {
    /// Scan `textures_dir` for `*.png` assets and assign stable indices from 1,
    /// ordered by file-stem sort.
    pub fn from_textures_dir(textures_dir: &Path) -> anyhow::Result<Self> {
        let mut names: Vec<String> = fs::read_dir(textures_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("png") {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .map(|s| s.to_owned())
                } else {
                    None
                }
            })
            .collect();
        names.sort();

        let forward: Vec<ArcStr> = names.into_iter().map(ArcStr::from).collect();
        let inverse = forward
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), (i + 1) as u16))
            .collect();

        Ok(Self { forward, inverse })
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Look up a texture name directly. Returns 0 ("empty/unknown") on miss.
    pub fn resolve(&self, name: &str) -> u16 {
        self.inverse.get(name).copied().unwrap_or(0)
    }

    /// The block name for an index, if any (index 0 has none).
    pub fn name_for(&self, index: u16) -> Option<&ArcStr> {
        index.checked_sub(1).and_then(|i| self.forward.get(i as usize))
    }

    /// Resolve a stripped block name (no `minecraft:` prefix) to a palette
    /// index, preferring the `_top` texture variant so an atlas split into
    /// side/top faces renders the top face on the map, falling back to the
    /// bare name, and finally to 0 if the block is air or cave air or
    /// simply has no matching texture.
    pub fn resolve_top_or_plain(&self, short_name: &str) -> u16 {
        if AIR_NAMES.contains(&short_name) {
            return 0;
        }
        let top_variant = format!("{short_name}_top");
        let top_index = self.resolve(&top_variant);
        if top_index != 0 {
            return top_index;
        }
        self.resolve(short_name)
    }

    /// Build the index -> name map the `/palette` HTTP route serves.
    pub fn to_index_map(&self) -> HashMap<u16, ArcStr> {
        self.forward
            .iter()
            .enumerate()
            .map(|(i, name)| ((i + 1) as u16, name.clone()))
            .collect()
    }
}

/// Strip a block name's namespace prefix, e.g. `minecraft:dirt` -> `dirt`.
pub fn strip_namespace(name: &str) -> &str {
    name.split_once(':').map(|(_, right)| right).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn write_png_stub(dir: &Path, name: &str) {
        File::create(dir.join(format!("{name}.png"))).unwrap();
    }

    #[test]
    fn strips_namespace_prefix() {
        assert_eq!(strip_namespace("minecraft:dirt"), "dirt");
        assert_eq!(strip_namespace("dirt"), "dirt");
    }

    #[test]
    fn scans_and_sorts_textures_assigning_indices_from_one() {
        let dir = tempdir();
        write_png_stub(dir.path(), "stone");
        write_png_stub(dir.path(), "dirt");
        write_png_stub(dir.path(), "dirt_top");
        File::create(dir.path().join("notes.txt")).unwrap();

        let registry = PaletteRegistry::from_textures_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 3);
        // Sorted: "dirt", "dirt_top", "stone"
        assert_eq!(registry.name_for(1).unwrap().as_str(), "dirt");
        assert_eq!(registry.name_for(2).unwrap().as_str(), "dirt_top");
        assert_eq!(registry.name_for(3).unwrap().as_str(), "stone");
        assert_eq!(registry.resolve("stone"), 3);
        assert_eq!(registry.resolve("missing"), 0);
    }

    #[test]
    fn top_variant_preferred_when_present() {
        let dir = tempdir();
        write_png_stub(dir.path(), "grass_block_top");
        write_png_stub(dir.path(), "dirt"); // no dirt_top
        let registry = PaletteRegistry::from_textures_dir(dir.path()).unwrap();

        assert_eq!(
            registry.resolve_top_or_plain("grass_block"),
            registry.resolve("grass_block_top")
        );
        assert_eq!(registry.resolve_top_or_plain("dirt"), registry.resolve("dirt"));
    }

    #[test]
    fn air_and_cave_air_always_resolve_to_zero() {
        let dir = tempdir();
        write_png_stub(dir.path(), "air"); // shouldn't matter even if a texture exists
        let registry = PaletteRegistry::from_textures_dir(dir.path()).unwrap();
        assert_eq!(registry.resolve_top_or_plain("air"), 0);
        assert_eq!(registry.resolve_top_or_plain("cave_air"), 0);
    }

    fn tempdir() -> TempDir {
        TempDir::new()
    }

    struct TempDir(std::path::PathBuf);
    impl TempDir {
        fn new() -> Self {
            use std::sync::atomic::{AtomicU64, Ordering};
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            let id = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "anvilview-test-{}-{id}",
                std::process::id()
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
        fn path(&self) -> &Path {
            &self.0
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}

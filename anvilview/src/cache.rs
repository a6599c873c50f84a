//! `DiskCache`: the two-tier on-disk cache of decoded grids and rendered
//! images, keyed by region coordinate, plus the persisted palette artifact
//! the HTTP surface serves from when run without a live render pass.
//!
//! Grounded on the teacher's general "write to a sibling temp path, then
//! rename" caution around on-disk artifacts (the teacher itself has no
//! direct analogue since its `world/cache.rs::ChunkCache` is purely
//! in-memory — this pulls the tmp-then-rename idiom from `nhatnxbk-voxelize`,
//! which persists chunk snapshots to disk the same way before serving them).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use arcstr::ArcStr;

use crate::coords::RegionCoord;
use crate::error::CacheError;
use crate::surface::BlockGrid;

pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    /// `base_dir` is the cache directory itself, passed in explicitly rather
    /// than resolved relative to the running executable — see DESIGN.md.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn grid_path(&self, region: RegionCoord) -> PathBuf {
        self.base_dir
            .join(format!("region.{}.{}.json", region.x, region.z))
    }

    fn image_path(&self, region: RegionCoord) -> PathBuf {
        self.base_dir
            .join(format!("region.{}.{}.jpeg", region.x, region.z))
    }

    fn palette_path(&self) -> PathBuf {
        self.base_dir.join("palette.json")
    }

    /// Returns `Ok(None)` when the grid artifact is absent — a cache miss,
    /// not an error.
    pub fn read_grid(&self, region: RegionCoord) -> Result<Option<BlockGrid>, CacheError> {
        let path = self.grid_path(region);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CacheError::Io(err)),
        };
        let values: Vec<u16> = serde_json::from_slice(&bytes)?;
        Ok(BlockGrid::from_vec(values))
    }

    pub fn write_grid(&self, region: RegionCoord, grid: &BlockGrid) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(grid.as_slice())?;
        self.write_atomically(&self.grid_path(region), &bytes)
    }

    pub fn write_image(&self, region: RegionCoord, jpeg_bytes: &[u8]) -> Result<(), CacheError> {
        self.write_atomically(&self.image_path(region), jpeg_bytes)
    }

    pub fn has_grid(&self, region: RegionCoord) -> bool {
        self.grid_path(region).is_file()
    }

    /// Every region with a cached grid artifact, regardless of whether the
    /// world's region files are still on disk. Lets `serve` answer
    /// `/regionslist` from the cache alone.
    pub fn cached_regions(&self) -> Vec<RegionCoord> {
        let Ok(entries) = fs::read_dir(&self.base_dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_grid_filename(&entry.file_name().to_string_lossy()))
            .collect()
    }

    /// The index -> block name map left behind by the most recent render
    /// pass, or `Ok(None)` if nothing has been rendered yet.
    pub fn read_palette(&self) -> Result<Option<HashMap<u16, ArcStr>>, CacheError> {
        let bytes = match fs::read(self.palette_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CacheError::Io(err)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn write_palette(&self, map: &HashMap<u16, ArcStr>) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(map)?;
        self.write_atomically(&self.palette_path(), &bytes)
    }

    /// Truncating overwrite is fine here; a tmp-file-then-rename still beats
    /// a partial write on process exit.
    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.base_dir)?;
        let tmp_path = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|e| e.to_str()).unwrap_or("")
        ));
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Parse `region.<x>.<z>.json` back into a `RegionCoord`.
fn parse_grid_filename(name: &str) -> Option<RegionCoord> {
    let rest = name.strip_prefix("region.")?;
    let rest = rest.strip_suffix(".json")?;
    let (x_str, z_str) = rest.split_once('.')?;
    Some(RegionCoord::new(x_str.parse().ok()?, z_str.parse().ok()?))
}

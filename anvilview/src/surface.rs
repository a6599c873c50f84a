//! `BlockGrid` / `RegionSurface` — the decoded per-region raster of palette
//! indices.

use crate::coords::REGION_BLOCKS;

/// Flat `grid[z*512 + x]` palette-index array for one region.
///
/// Owned by whichever worker decoded it, then handed to the raster
/// assembler and disk cache by value/reference — no sharing, no locking,
/// since each region is produced by exactly one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid(Vec<u16>);

impl BlockGrid {
    pub fn new() -> Self {
        Self(vec![0u16; REGION_BLOCKS * REGION_BLOCKS])
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    pub fn from_vec(data: Vec<u16>) -> Option<Self> {
        if data.len() == REGION_BLOCKS * REGION_BLOCKS {
            Some(Self(data))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> u16 {
        self.0[z * REGION_BLOCKS + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, index: u16) {
        self.0[z * REGION_BLOCKS + x] = index;
    }
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of a region's `BlockGrid` while its 32x32 chunks are decoded into
/// it. `ChunkDecoder` writes each chunk's 16x16 column window through this
/// rather than touching the grid directly, so the region-level assembly
/// point stays a single named thing regardless of how many chunks feed it.
pub struct RegionSurface {
    grid: BlockGrid,
}

impl RegionSurface {
    pub fn new() -> Self {
        Self {
            grid: BlockGrid::new(),
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, index: u16) {
        self.grid.set(x, z, index);
    }

    /// Hand over the finished grid once every chunk has been decoded.
    pub fn into_grid(self) -> BlockGrid {
        self.grid
    }
}

impl Default for RegionSurface {
    fn default() -> Self {
        Self::new()
    }
}

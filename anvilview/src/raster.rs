//! `RasterAssembler`: tile a `BlockGrid` into an RGBA raster and encode it
//! as JPEG.
//!
//! The texture cache here is eager and read-only after construction, unlike
//! the teacher's `render/texture.rs::TextureCache` (which lazily loads tiles
//! behind a read/write-locked map because the isometric renderer samples an
//! open-ended set of block+face sprites). This renderer knows its full tile
//! set up front — every name the `PaletteRegistry` can resolve to — so it
//! loads them all once at startup and needs no lock at all.

use std::collections::HashMap;
use std::path::Path;

use arcstr::ArcStr;
use image::{GenericImageView, RgbaImage};

use crate::palette::PaletteRegistry;
use crate::surface::BlockGrid;

/// Decoded block textures, keyed by block name, loaded once at startup.
pub struct TextureAtlas {
    tiles: HashMap<ArcStr, RgbaImage>,
    tile_size: u32,
}

impl TextureAtlas {
    /// Load every texture the registry knows about from `textures_dir`.
    /// The first tile loaded fixes `tile_size`; later tiles of a different
    /// size are still stored as-is — mixed tile sizes are not a case this
    /// renderer tries to line up, just one it tolerates.
    pub fn load(textures_dir: &Path, palette: &PaletteRegistry) -> anyhow::Result<Self> {
        let mut tiles = HashMap::new();
        let mut tile_size = None;
        for index in 1..=palette.len() as u16 {
            let Some(name) = palette.name_for(index) else {
                continue;
            };
            let path = textures_dir.join(format!("{name}.png"));
            let image = image::open(&path)?.to_rgba8();
            if tile_size.is_none() {
                tile_size = Some(image.width().min(image.height()));
            }
            tiles.insert(name.clone(), image);
        }
        Ok(Self {
            tiles,
            tile_size: tile_size.unwrap_or(16),
        })
    }

    fn get(&self, name: &ArcStr) -> Option<&RgbaImage> {
        self.tiles.get(name)
    }
}

/// Compose `grid` into an RGBA raster, `tile_size`-scaled per block.
///
/// A zero grid entry leaves its rectangle untouched (transparent/black); a
/// nonzero entry whose name has no loaded tile is also skipped rather than
/// erroring the whole region.
pub fn assemble(
    grid: &BlockGrid,
    palette: &PaletteRegistry,
    atlas: &TextureAtlas,
) -> RgbaImage {
    use crate::coords::REGION_BLOCKS;

    let tile_size = atlas.tile_size;
    let side = REGION_BLOCKS as u32 * tile_size;
    let mut raster = RgbaImage::new(side, side);

    for z in 0..REGION_BLOCKS {
        for x in 0..REGION_BLOCKS {
            let index = grid.get(x, z);
            if index == 0 {
                continue;
            }
            let Some(name) = palette.name_for(index) else {
                continue;
            };
            let Some(tile) = atlas.get(name) else {
                continue;
            };
            blit(&mut raster, tile, x as u32 * tile_size, z as u32 * tile_size);
        }
    }
    raster
}

/// Opaque source-over-destination copy, clipped to the nearer of the tile's
/// own bounds and the destination's.
fn blit(dest: &mut RgbaImage, tile: &RgbaImage, dest_x: u32, dest_y: u32) {
    let w = tile.width().min(dest.width().saturating_sub(dest_x));
    let h = tile.height().min(dest.height().saturating_sub(dest_y));
    for ty in 0..h {
        for tx in 0..w {
            let pixel = tile.get_pixel(tx, ty);
            dest.put_pixel(dest_x + tx, dest_y + ty, *pixel);
        }
    }
}

/// Encode `raster` as JPEG at a fixed, caller-supplied quality — kept low
/// by default to minimize cache size.
pub fn encode_jpeg(raster: &RgbaImage, quality: u8) -> anyhow::Result<Vec<u8>> {
    use image::codecs::jpeg::JpegEncoder;
    use image::ImageEncoder;

    let rgb = image::DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BlockGrid;
    use image::Rgba;

    fn solid_tile(size: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(color))
    }

    #[test]
    fn blit_copies_tile_into_destination_rectangle() {
        let mut dest = RgbaImage::new(32, 32);
        let tile = solid_tile(16, [10, 20, 30, 255]);
        blit(&mut dest, &tile, 16, 0);
        assert_eq!(*dest.get_pixel(16, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*dest.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn assemble_skips_zero_and_unresolved_entries() {
        let grid = BlockGrid::new();
        let palette_dir = std::env::temp_dir();
        // An empty-looking registry (no textures): index 0 everywhere means
        // every column is skipped and the raster stays fully transparent.
        let registry = crate::palette::PaletteRegistry::from_textures_dir(&palette_dir)
            .unwrap_or_else(|_| panic!("temp dir must be readable"));
        let atlas = TextureAtlas {
            tiles: HashMap::new(),
            tile_size: 16,
        };
        let raster = assemble(&grid, &registry, &atlas);
        assert!(raster.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn jpeg_encoding_round_trips_through_the_image_crate() {
        let raster = solid_tile(32, [200, 150, 50, 255]);
        let bytes = encode_jpeg(&raster, 80).unwrap();
        assert!(!bytes.is_empty());
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 32);
    }
}

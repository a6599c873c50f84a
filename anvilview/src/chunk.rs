//! `ChunkDecoder`: walk one chunk's MOTION_BLOCKING heightmap and packed
//! block-state arrays to resolve one palette index per column.
//!
//! Grounded on the teacher's `world/mod.rs::RawChunk::parse` packed-array
//! unpacking loop (same `bits = max(4, ceil(log2(palette.len())))` formula,
//! same LSB-first/no-boundary-crossing unpacking), narrowed to resolve a
//! single top-of-column block name instead of a full lit/biomed block.

use crate::coords::{ChunkSlot, CHUNK_SIZE, REGION_BLOCKS};
use crate::nbt::{ChunkNbt, SectionNbt};
use crate::palette::{strip_namespace, PaletteRegistry};
use crate::surface::RegionSurface;

/// Bits needed to store values `0..palette_len` (minimum 4, per the 1.16+
/// boundary-aligned packing rule this decoder assumes).
fn bits_per_index(palette_len: usize) -> u32 {
    let palette_len = palette_len as u64;
    if palette_len <= 1 {
        4
    } else {
        (u64::BITS - (palette_len - 1).leading_zeros()).max(4)
    }
}

/// Decode the 9-bit MOTION_BLOCKING entry for in-chunk column `(x, z)`.
fn heightmap_entry(motion_blocking: &[i64], x: u32, z: u32) -> u32 {
    let idx = (x + z * CHUNK_SIZE as u32) as usize;
    let word_idx = idx / 7;
    let sub = idx % 7;
    let word = motion_blocking.get(word_idx).copied().unwrap_or(0) as u64;
    ((word >> (sub * 9)) & 0x1FF) as u32
}

/// Decode the packed palette index for section-local block `(x, ly, z)`.
///
/// Returns `None` if the extracted index is out of range for `palette_len` —
/// the caller leaves that column empty and logs it rather than panicking.
fn packed_block_index(data: &[i64], palette_len: usize, x: u32, ly: u32, z: u32) -> Option<u32> {
    let bits = bits_per_index(palette_len);
    let per_word = (u64::BITS / bits) as usize;
    let mask = (1u64 << bits) - 1;
    let b = (ly * 256 + z * 16 + x) as usize;
    let w = b / per_word;
    let sub = b % per_word;
    let word = *data.get(w)? as u64;
    let index = ((word >> (sub as u32 * bits)) & mask) as u32;
    if (index as usize) < palette_len {
        Some(index)
    } else {
        None
    }
}

/// Populate the 16x16 column window at `slot` in `surface` from `chunk`.
///
/// Every per-column failure (missing section, out-of-range packed index,
/// unresolved palette name) leaves that column at 0 and is logged — it
/// never aborts the rest of the chunk, so this never fails outright.
pub fn decode_into(
    chunk: &ChunkNbt,
    slot: ChunkSlot,
    palette: &PaletteRegistry,
    surface: &mut RegionSurface,
) {
    let motion_blocking: &[i64] = chunk
        .heightmaps
        .motion_blocking
        .as_deref()
        .unwrap_or(&[]);

    for z in 0..CHUNK_SIZE as u32 {
        for x in 0..CHUNK_SIZE as u32 {
            let entry = heightmap_entry(motion_blocking, x, z);
            if entry == 0 {
                // Below this section's floor: no visible block here.
                continue;
            }
            let y = chunk.y_pos * CHUNK_SIZE - 1 + entry as i32;
            let section_y = y.div_euclid(CHUNK_SIZE);
            let ly = y.rem_euclid(CHUNK_SIZE) as u32;

            let Some(section) = find_section(&chunk.sections, section_y) else {
                log::debug!("no section Y={section_y} for column ({x},{z}); leaving empty");
                continue;
            };
            let Some(block_states) = &section.block_states else {
                continue;
            };
            if block_states.palette.is_empty() {
                continue;
            }

            let index = match &block_states.data {
                None => 0, // single-block section: every index is palette[0].
                Some(data) => {
                    match packed_block_index(data, block_states.palette.len(), x, ly, z) {
                        Some(index) => index,
                        None => {
                            log::debug!(
                                "packed index out of range for column ({x},{z}) in section Y={section_y}"
                            );
                            continue;
                        }
                    }
                }
            };

            let name = &block_states.palette[index as usize].name;
            let short_name = strip_namespace(name);
            let resolved = palette.resolve_top_or_plain(short_name);
            if resolved == 0 {
                continue;
            }

            let grid_x = slot.x as usize * CHUNK_SIZE as usize + x as usize;
            let grid_z = slot.z as usize * CHUNK_SIZE as usize + z as usize;
            debug_assert!(grid_x < REGION_BLOCKS && grid_z < REGION_BLOCKS);
            surface.set(grid_x, grid_z, resolved);
        }
    }
}

/// Last section with `Y == section_y` wins if duplicates exist — illegal
/// input, handled defensively rather than rejected outright.
fn find_section(sections: &[SectionNbt], section_y: i32) -> Option<&SectionNbt> {
    sections.iter().filter(|s| s.y as i32 == section_y).last()
}

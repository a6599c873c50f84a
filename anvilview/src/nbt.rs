//! Typed tag-tree view of a single decompressed chunk payload.
//!
//! Deserialized via `fastnbt`'s serde integration, trimmed to exactly the
//! fields the chunk decoder reads. No biome or lighting fields: this
//! renderer only ever needs `Name` from a block-state palette entry and the
//! packed index/heightmap arrays.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChunkNbt {
    #[serde(rename = "yPos")]
    pub y_pos: i32,
    #[serde(rename = "sections", default)]
    pub sections: Vec<SectionNbt>,
    #[serde(rename = "Heightmaps")]
    pub heightmaps: HeightmapsNbt,
}

#[derive(Debug, Deserialize)]
pub struct SectionNbt {
    #[serde(rename = "Y")]
    pub y: i8,
    #[serde(rename = "block_states")]
    pub block_states: Option<BlockStatesNbt>,
}

#[derive(Debug, Deserialize)]
pub struct BlockStatesNbt {
    pub palette: Vec<BlockStateNbt>,
    pub data: Option<fastnbt::LongArray>,
}

#[derive(Debug, Deserialize)]
pub struct BlockStateNbt {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct HeightmapsNbt {
    #[serde(rename = "MOTION_BLOCKING")]
    pub motion_blocking: Option<fastnbt::LongArray>,
}

/// Parse a decompressed chunk payload into its typed tag-tree view.
pub fn parse_chunk(data: &[u8]) -> Result<ChunkNbt, crate::error::ChunkDecodeError> {
    fastnbt::from_bytes(data)
        .map_err(|err| crate::error::ChunkDecodeError::TagTreeMalformed(err.to_string()))
}

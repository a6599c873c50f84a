//! Typed error kinds for the per-chunk/per-region recoverable failures this
//! crate can hit. Each is consumed locally by the caller that owns the
//! "skip the smallest unit and log" policy — none of these are meant to
//! propagate out of the pipeline via `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("region header entry is corrupt")]
    HeaderCorrupt,
    #[error("unsupported chunk compression method: {0}")]
    UnsupportedCompression(u8),
}

#[derive(Debug, Error)]
pub enum ChunkDecodeError {
    #[error("chunk tag tree malformed: {0}")]
    TagTreeMalformed(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache grid serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

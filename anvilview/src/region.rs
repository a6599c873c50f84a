//! Region container parsing.
//!
//! A region file is a fixed 8 KiB header (1024 location entries + 1024
//! timestamps, the latter unused here) followed by 4096-byte-aligned
//! chunk payloads. Grounded on the teacher's `world/mod.rs::Region`, which
//! reads each location entry as a single big-endian `u32` (top three bytes
//! = sector offset, low byte = sector count) rather than as four separate
//! byte reads — the same bytes, read the idiomatic way.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Buf;

use crate::coords::{ChunkSlot, REGION_SIZE};
use crate::error::RegionError;

const SECTOR_SIZE: u64 = 4096;
const HEADER_SIZE: usize = 2 * SECTOR_SIZE as usize;
const CHUNK_COUNT: usize = (REGION_SIZE * REGION_SIZE) as usize;
const COMPRESSION_ZLIB: u8 = 2;

/// An open region file, header already parsed.
pub struct RegionContainerReader<S: Read + Seek> {
    locations: [u32; CHUNK_COUNT],
    stream: S,
}

impl RegionContainerReader<File> {
    pub fn open(path: &Path) -> Result<Self, RegionError> {
        let file = File::open(path)?;
        Self::from_stream(file)
    }
}

impl<S: Read + Seek> RegionContainerReader<S> {
    pub fn from_stream(mut stream: S) -> Result<Self, RegionError> {
        stream.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; HEADER_SIZE];
        stream.read_exact(&mut header)?;
        let mut locations = [0u32; CHUNK_COUNT];
        let mut cursor = &header[..CHUNK_COUNT * 4];
        for slot in locations.iter_mut() {
            *slot = cursor.get_u32();
        }
        Ok(Self { locations, stream })
    }

    /// Whether `slot` has any chunk data at all (location entry non-zero).
    pub fn is_present(&self, slot: ChunkSlot) -> bool {
        self.locations[slot.to_index()] != 0
    }

    /// Decompress and return the raw NBT payload for `slot`, or `None` if absent.
    ///
    /// Any failure here (truncated sector table entry, bad compression tag,
    /// corrupt zlib stream) is the caller's to isolate to this one chunk —
    /// it never aborts the rest of the region.
    pub fn read_chunk(&mut self, slot: ChunkSlot) -> Result<Option<Vec<u8>>, RegionError> {
        let location = self.locations[slot.to_index()];
        if location == 0 {
            return Ok(None);
        }
        let sector_offset = (location >> 8) as u64;
        if sector_offset == 0 {
            return Err(RegionError::HeaderCorrupt);
        }

        self.stream
            .seek(SeekFrom::Start(sector_offset * SECTOR_SIZE))?;
        let length = self.stream.read_u32::<BigEndian>()?;
        if length == 0 {
            return Ok(None);
        }
        let mut payload = (&mut self.stream).take(length as u64);
        let compression = payload.read_u8()?;
        if compression != COMPRESSION_ZLIB {
            return Err(RegionError::UnsupportedCompression(compression));
        }

        let mut decoder = flate2::write::ZlibDecoder::new(Vec::new());
        io::copy(&mut payload, &mut decoder)?;
        Ok(Some(decoder.finish()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build_region(chunks: &[(ChunkSlot, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut locations = [0u32; CHUNK_COUNT];
        for (slot, raw) in chunks {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
            use std::io::Write;
            encoder.write_all(raw).unwrap();
            let compressed = encoder.finish().unwrap();

            // Pad the body so the payload starts on a sector boundary.
            while body.len() % SECTOR_SIZE as usize != 0 {
                body.push(0);
            }
            let sector_offset = (HEADER_SIZE + body.len()) / SECTOR_SIZE as usize;
            let length = (compressed.len() + 1) as u32;
            body.extend_from_slice(&length.to_be_bytes());
            body.push(COMPRESSION_ZLIB);
            body.extend_from_slice(&compressed);
            while body.len() % SECTOR_SIZE as usize != 0 {
                body.push(0);
            }
            let sector_count = ((body.len() as u64) / SECTOR_SIZE) as u8;
            locations[slot.to_index()] = ((sector_offset as u32) << 8) | sector_count as u32;
        }

        let mut out = Vec::new();
        for loc in locations {
            out.extend_from_slice(&loc.to_be_bytes());
        }
        out.extend_from_slice(&[0u8; SECTOR_SIZE as usize]); // timestamps, unused
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn absent_chunk_reads_as_none() {
        let raw = build_region(&[]);
        let mut reader = RegionContainerReader::from_stream(Cursor::new(raw)).unwrap();
        assert!(!reader.is_present(ChunkSlot::new(0, 0)));
        assert_eq!(reader.read_chunk(ChunkSlot::new(0, 0)).unwrap(), None);
    }

    #[test]
    fn present_chunk_round_trips_through_zlib() {
        let payload = b"hello chunk payload".to_vec();
        let raw = build_region(&[(ChunkSlot::new(5, 7), payload.clone())]);
        let mut reader = RegionContainerReader::from_stream(Cursor::new(raw)).unwrap();
        assert!(reader.is_present(ChunkSlot::new(5, 7)));
        let got = reader.read_chunk(ChunkSlot::new(5, 7)).unwrap().unwrap();
        assert_eq!(got, payload);
    }

    #[test]
    fn unsupported_compression_is_isolated_as_an_error() {
        // One location entry pointing just past the header.
        let mut locations = [0u32; CHUNK_COUNT];
        locations[0] = 2 << 8; // sector 2, count 1 (header occupies sectors 0-1)
        let mut raw = Vec::new();
        for loc in locations {
            raw.extend_from_slice(&loc.to_be_bytes());
        }
        raw.extend_from_slice(&[0u8; SECTOR_SIZE as usize]);
        raw.extend_from_slice(&4u32.to_be_bytes()); // length = 4
        raw.push(1); // gzip tag, unsupported
        raw.extend_from_slice(&[0, 0, 0]);
        raw.resize(HEADER_SIZE + 3 * SECTOR_SIZE as usize, 0);

        let mut reader = RegionContainerReader::from_stream(Cursor::new(raw)).unwrap();
        let err = reader.read_chunk(ChunkSlot::new(0, 0)).unwrap_err();
        assert!(matches!(err, RegionError::UnsupportedCompression(1)));
    }
}

use byteorder::{BigEndian, ReadBytesExt};
use cartograph_common::{CartographError, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

pub const CHUNKS_PER_SIDE: usize = 32;
const SECTOR_BYTES: usize = 4096;
const HEADER_ENTRIES: usize = CHUNKS_PER_SIDE * CHUNKS_PER_SIDE;

const COMPRESSION_GZIP: u8 = 1;
const COMPRESSION_ZLIB: u8 = 2;
const COMPRESSION_NONE: u8 = 3;

/// Decompressed bytes of one chunk record with its position in the region.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPayload {
    pub cx: usize,
    pub cz: usize,
    pub data: Vec<u8>,
}

/// A region file held in memory together with its parsed location table.
#[derive(Debug)]
pub struct RegionFile {
    path: Option<PathBuf>,
    data: Vec<u8>,
    // (sector offset, sector count) per chunk, indexed x + 32 * z
    locations: Vec<(u32, u8)>,
}

impl RegionFile {
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut region = RegionFile::from_bytes(data)?;
        region.path = Some(path.to_path_buf());
        Ok(region)
    }

    /// Parses the location table. A zero-length file is a valid region with
    /// no chunks.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Ok(RegionFile {
                path: None,
                data,
                locations: vec![(0, 0); HEADER_ENTRIES],
            });
        }
        if data.len() < 2 * SECTOR_BYTES {
            return Err(CartographError::InvalidRegionFile(format!(
                "{} bytes is shorter than the region header",
                data.len()
            )));
        }

        let mut reader = Cursor::new(&data[..SECTOR_BYTES]);
        let mut locations = Vec::with_capacity(HEADER_ENTRIES);
        for _ in 0..HEADER_ENTRIES {
            let entry = reader.read_u32::<BigEndian>()?;
            locations.push((entry >> 8, (entry & 0xFF) as u8));
        }

        Ok(RegionFile {
            path: None,
            data,
            locations,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_chunk(&self, cx: usize, cz: usize) -> bool {
        self.locations[cx + CHUNKS_PER_SIDE * cz].0 != 0
    }

    /// Decompressed payload of the chunk at (cx, cz), or `None` when the
    /// region has no record for it.
    pub fn chunk_payload(&self, cx: usize, cz: usize) -> Result<Option<Vec<u8>>> {
        if cx >= CHUNKS_PER_SIDE || cz >= CHUNKS_PER_SIDE {
            return Err(CartographError::InvalidRegionFile(format!(
                "chunk ({}, {}) outside region",
                cx, cz
            )));
        }

        let (sector, sectors) = self.locations[cx + CHUNKS_PER_SIDE * cz];
        if sector == 0 {
            return Ok(None);
        }

        let start = sector as usize * SECTOR_BYTES;
        if start + 5 > self.data.len() {
            return Err(CartographError::InvalidRegionFile(format!(
                "chunk ({}, {}) starts past end of file",
                cx, cz
            )));
        }

        let mut reader = Cursor::new(&self.data[start..]);
        let length = reader.read_u32::<BigEndian>()? as usize;
        if length == 0 || length > sectors as usize * SECTOR_BYTES || start + 4 + length > self.data.len()
        {
            return Err(CartographError::InvalidRegionFile(format!(
                "chunk ({}, {}) has bad length {}",
                cx, cz, length
            )));
        }
        let scheme = reader.read_u8()?;
        let compressed = &self.data[start + 5..start + 4 + length];

        let mut payload = Vec::new();
        match scheme {
            COMPRESSION_GZIP => {
                GzDecoder::new(compressed).read_to_end(&mut payload)?;
            }
            COMPRESSION_ZLIB => {
                ZlibDecoder::new(compressed).read_to_end(&mut payload)?;
            }
            COMPRESSION_NONE => payload.extend_from_slice(compressed),
            other => return Err(CartographError::UnsupportedCompression(other)),
        }
        Ok(Some(payload))
    }

    /// Every present chunk in table order (x fastest). A chunk that fails to
    /// decompress yields its error without stopping the iteration.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, usize, Result<ChunkPayload>)> + '_ {
        (0..HEADER_ENTRIES)
            .map(|i| (i % CHUNKS_PER_SIDE, i / CHUNKS_PER_SIDE))
            .filter(move |&(cx, cz)| self.has_chunk(cx, cz))
            .filter_map(move |(cx, cz)| match self.chunk_payload(cx, cz) {
                Ok(Some(data)) => Some((cx, cz, Ok(ChunkPayload { cx, cz, data }))),
                Ok(None) => None,
                Err(e) => Some((cx, cz, Err(e))),
            })
    }
}

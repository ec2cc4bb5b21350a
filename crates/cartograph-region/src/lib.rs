//! Region container access: locating region files in a world directory and
//! pulling decompressed chunk payloads out of them.

pub mod region_file;
pub mod region_map;

pub use region_file::{ChunkPayload, RegionFile, CHUNKS_PER_SIDE};
pub use region_map::{RegionEntry, RegionFormat, RegionMap};

//! Chunk decoding from the tag tree into sections the compositor can walk.
//!
//! Two section encodings are understood: the legacy byte/nybble arrays
//! (`Blocks`, `Data`, `Add`) and the paletted format (`Palette` plus
//! `BlockStates` packed without padding). Anything else is rejected by
//! data version before any section is touched.

use crate::nybble;
use crate::palette::{self, BlockState, Palette, SECTION_VOLUME};
use cartograph_common::{CartographError, Result};
use cartograph_nbt::Tag;
use std::collections::BTreeMap;

pub const SECTIONS_PER_CHUNK: usize = 16;
pub const COLUMNS_PER_CHUNK: usize = 16 * 16;
pub const UNKNOWN_BIOME: i32 = -1;

const LEGACY_VERSIONS: std::ops::RangeInclusive<i32> = 100..=1343;
const PALETTED_VERSIONS: std::ops::RangeInclusive<i32> = 1519..=2528;
// 1.15 moved to 4x4x4 biome cells
const VOLUMETRIC_BIOMES: i32 = 2203;

const COMPLETE_STATUSES: [&str; 4] = ["postprocessed", "fullchunk", "mobs_spawned", "full"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFormat {
    Legacy,
    Paletted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Legacy {
        /// Block ids including the `Add` bits, 4096 entries.
        blocks: Vec<u16>,
        /// Raw nybble array, two datums per byte.
        data: Vec<u8>,
    },
    Paletted {
        palette: Palette,
        /// Unpacked palette indices, 4096 entries.
        indices: Vec<u16>,
    },
}

/// What one voxel decodes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voxel<'a> {
    Legacy { id: u16, datum: u8 },
    State(&'a BlockState),
    /// Palette index past the end of the palette.
    BadIndex(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub y: usize,
    pub data: SectionData,
}

impl Section {
    /// Index of voxel (x, y, z) within a section, y-major.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        (y << 8) | (z << 4) | x
    }

    #[inline]
    pub fn voxel(&self, index: usize) -> Voxel<'_> {
        match &self.data {
            SectionData::Legacy { blocks, data } => Voxel::Legacy {
                id: blocks[index],
                datum: nybble::get(data, index),
            },
            SectionData::Paletted { palette, indices } => {
                let i = indices[index];
                match palette.get(i as usize) {
                    Some(state) => Voxel::State(state),
                    None => Voxel::BadIndex(i),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub format: ChunkFormat,
    pub sections: Vec<Option<Section>>,
    /// Per column, indexed `z * 16 + x`.
    pub biomes: Vec<i32>,
}

impl Chunk {
    pub fn section_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_some()).count()
    }

    /// Slot of the highest present section.
    pub fn top_section(&self) -> Option<usize> {
        self.sections.iter().rposition(Option::is_some)
    }

    pub fn biome(&self, x: usize, z: usize) -> i32 {
        self.biomes[z * 16 + x]
    }
}

fn missing(key: &str) -> CartographError {
    CartographError::MissingTag(key.to_owned())
}

fn unexpected(key: &str, expected: &'static str) -> CartographError {
    CartographError::UnexpectedTag {
        key: key.to_owned(),
        expected,
    }
}

fn required<'a>(tag: &'a Tag, key: &str) -> Result<&'a Tag> {
    tag.get(key).ok_or_else(|| missing(key))
}

fn byte_array<'a>(tag: &'a Tag, key: &str, len: usize) -> Result<&'a [i8]> {
    match required(tag, key)?.as_byte_array() {
        Some(bytes) if bytes.len() == len => Ok(bytes),
        Some(_) => Err(unexpected(key, "byte array of section length")),
        None => Err(unexpected(key, "byte array")),
    }
}

fn unsigned(bytes: &[i8]) -> Vec<u8> {
    bytes.iter().map(|&b| b as u8).collect()
}

/// Decodes a chunk payload root. Returns `Ok(None)` for chunks that exist
/// but are not finished generating.
pub fn decode_chunk(root: &Tag, min_palette_bits: u32) -> Result<Option<Chunk>> {
    if root.as_compound().is_none() {
        return Err(unexpected("root", "compound"));
    }
    let version = match root.get("DataVersion") {
        None => return Err(CartographError::UnsupportedDataVersion(None)),
        Some(tag) => tag
            .as_integer()
            .ok_or_else(|| unexpected("DataVersion", "integer"))? as i32,
    };

    let level = required(root, "Level")?;
    if level.as_compound().is_none() {
        return Err(unexpected("Level", "compound"));
    }

    let format = if LEGACY_VERSIONS.contains(&version) {
        ChunkFormat::Legacy
    } else if PALETTED_VERSIONS.contains(&version) {
        ChunkFormat::Paletted
    } else {
        return Err(CartographError::UnsupportedDataVersion(Some(version)));
    };

    if format == ChunkFormat::Paletted {
        if let Some(status) = level.get("Status") {
            let status = status
                .as_string()
                .ok_or_else(|| unexpected("Status", "string"))?;
            if !COMPLETE_STATUSES.contains(&status.as_str()) {
                return Ok(None);
            }
        }
    }

    let biomes = decode_biomes(level, version)?;

    let mut sections: Vec<Option<Section>> = vec![None; SECTIONS_PER_CHUNK];
    if let Some(list) = level.get("Sections") {
        let list = list
            .as_list()
            .ok_or_else(|| unexpected("Sections", "list"))?;
        for section_tag in list {
            let y = required(section_tag, "Y")?
                .as_integer()
                .ok_or_else(|| unexpected("Y", "integer"))?;
            // lighting-only sections sit outside the block range
            if !(0..SECTIONS_PER_CHUNK as i64).contains(&y) {
                continue;
            }
            let y = y as usize;
            let data = match format {
                ChunkFormat::Legacy => Some(decode_legacy_section(section_tag)?),
                ChunkFormat::Paletted => decode_paletted_section(section_tag, min_palette_bits)?,
            };
            if let Some(data) = data {
                sections[y] = Some(Section { y, data });
            }
        }
    }

    Ok(Some(Chunk {
        format,
        sections,
        biomes,
    }))
}

fn decode_biomes(level: &Tag, version: i32) -> Result<Vec<i32>> {
    let mut biomes = vec![UNKNOWN_BIOME; COLUMNS_PER_CHUNK];
    match level.get("Biomes") {
        None => {}
        Some(Tag::ByteArray(bytes)) if bytes.len() == COLUMNS_PER_CHUNK => {
            for (dst, &b) in biomes.iter_mut().zip(bytes) {
                // 0xFF marks an ungenerated column
                *dst = if b as u8 == 0xFF {
                    UNKNOWN_BIOME
                } else {
                    b as u8 as i32
                };
            }
        }
        Some(Tag::IntArray(ints)) if ints.len() == COLUMNS_PER_CHUNK => {
            biomes.copy_from_slice(ints);
        }
        Some(Tag::IntArray(ints)) if version >= VOLUMETRIC_BIOMES && ints.len() == 1024 => {
            // 4x4x4 cells; sample the layer at sea level
            let layer = 64 / 4;
            for z in 0..16 {
                for x in 0..16 {
                    biomes[z * 16 + x] = ints[layer * 16 + (z / 4) * 4 + x / 4];
                }
            }
        }
        Some(Tag::ByteArray(_)) | Some(Tag::IntArray(_)) => {
            return Err(unexpected("Biomes", "one entry per column"));
        }
        Some(_) => return Err(unexpected("Biomes", "byte or int array")),
    }
    Ok(biomes)
}

fn decode_legacy_section(section: &Tag) -> Result<SectionData> {
    let low = byte_array(section, "Blocks", SECTION_VOLUME)?;
    let data = unsigned(byte_array(section, "Data", SECTION_VOLUME / 2)?);
    let add = match section.get("Add") {
        None => None,
        Some(_) => Some(unsigned(byte_array(section, "Add", SECTION_VOLUME / 2)?)),
    };

    let blocks = (0..SECTION_VOLUME)
        .map(|i| {
            let id = low[i] as u8 as u16;
            match &add {
                Some(add) => id | (nybble::get(add, i) as u16) << 8,
                None => id,
            }
        })
        .collect();

    Ok(SectionData::Legacy { blocks, data })
}

fn decode_block_state(entry: &Tag) -> Result<BlockState> {
    let name = required(entry, "Name")?
        .as_string()
        .ok_or_else(|| unexpected("Name", "string"))?;
    let mut properties = BTreeMap::new();
    if let Some(props) = entry.get("Properties") {
        let props = props
            .as_compound()
            .ok_or_else(|| unexpected("Properties", "compound"))?;
        for (key, value) in props {
            let value = value
                .as_string()
                .ok_or_else(|| unexpected("Properties", "string values"))?;
            properties.insert(key.clone(), value.clone());
        }
    }
    Ok(BlockState {
        name: name.clone(),
        properties,
    })
}

fn decode_paletted_section(section: &Tag, min_bits: u32) -> Result<Option<SectionData>> {
    let (palette_tag, states) = match (section.get("Palette"), section.get("BlockStates")) {
        (Some(p), Some(s)) => (p, s),
        _ => return Ok(None),
    };

    let entries = palette_tag
        .as_list()
        .ok_or_else(|| unexpected("Palette", "list"))?
        .iter()
        .map(decode_block_state)
        .collect::<Result<Vec<_>>>()?;
    if entries.is_empty() {
        return Err(unexpected("Palette", "non-empty list"));
    }
    let palette = Palette::new(entries);

    let words: Vec<u64> = states
        .as_long_array()
        .ok_or_else(|| unexpected("BlockStates", "long array"))?
        .iter()
        .map(|&w| w as u64)
        .collect();

    let indices = palette::unpack(&words, palette.bit_width(min_bits), SECTION_VOLUME)?;
    Ok(Some(SectionData::Paletted { palette, indices }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{pack, DEFAULT_MIN_BITS};
    use assert_matches::assert_matches;

    fn chunk_root(version: i32, level: Vec<(&str, Tag)>) -> Tag {
        Tag::compound([
            ("DataVersion", Tag::Int(version)),
            ("Level", Tag::compound(level)),
        ])
    }

    fn palette_entry(name: &str) -> Tag {
        Tag::compound([("Name", Tag::String(name.to_owned()))])
    }

    fn paletted_section(y: i8, names: &[&str], indices: &[u32]) -> Tag {
        let width = palette::bit_width(names.len(), DEFAULT_MIN_BITS);
        let words = pack(indices, width).into_iter().map(|w| w as i64).collect();
        Tag::compound([
            ("Y", Tag::Byte(y)),
            ("Palette", Tag::List(names.iter().map(|n| palette_entry(n)).collect())),
            ("BlockStates", Tag::LongArray(words)),
        ])
    }

    #[test]
    fn test_missing_data_version() {
        let root = Tag::compound([("Level", Tag::compound(Vec::<(&str, Tag)>::new()))]);
        assert_matches!(
            decode_chunk(&root, DEFAULT_MIN_BITS),
            Err(CartographError::UnsupportedDataVersion(None))
        );
    }

    #[test]
    fn test_unsupported_versions() {
        for version in [99, 1400, 1518, 2529, 3000] {
            assert_matches!(
                decode_chunk(&chunk_root(version, vec![]), DEFAULT_MIN_BITS),
                Err(CartographError::UnsupportedDataVersion(Some(v))) if v == version
            );
        }
    }

    #[test]
    fn test_incomplete_chunk_skipped() {
        let root = chunk_root(1631, vec![("Status", Tag::String("carved".to_owned()))]);
        assert_matches!(decode_chunk(&root, DEFAULT_MIN_BITS), Ok(None));
    }

    #[test]
    fn test_paletted_section() {
        let mut indices = vec![0u32; SECTION_VOLUME];
        indices[Section::index(2, 3, 4)] = 1;
        let root = chunk_root(
            1976,
            vec![
                ("Status", Tag::String("full".to_owned())),
                (
                    "Sections",
                    Tag::List(vec![
                        Tag::compound([("Y", Tag::Byte(-1))]),
                        paletted_section(5, &["minecraft:air", "minecraft:stone"], &indices),
                        // light-only section
                        Tag::compound([("Y", Tag::Byte(6))]),
                    ]),
                ),
                ("Biomes", Tag::IntArray(vec![4; 256])),
            ],
        );

        let chunk = decode_chunk(&root, DEFAULT_MIN_BITS).unwrap().unwrap();
        assert_eq!(chunk.format, ChunkFormat::Paletted);
        assert_eq!(chunk.section_count(), 1);
        assert_eq!(chunk.top_section(), Some(5));
        assert_eq!(chunk.biome(15, 15), 4);

        let section = chunk.sections[5].as_ref().unwrap();
        assert_matches!(
            section.voxel(Section::index(2, 3, 4)),
            Voxel::State(s) if s.name == "minecraft:stone"
        );
        assert_matches!(
            section.voxel(Section::index(0, 0, 0)),
            Voxel::State(s) if s.name == "minecraft:air"
        );
    }

    #[test]
    fn test_out_of_range_index_is_flagged() {
        let mut indices = vec![0u32; SECTION_VOLUME];
        indices[17] = 9;
        let root = chunk_root(
            1519,
            vec![(
                "Sections",
                Tag::List(vec![paletted_section(0, &["minecraft:air", "minecraft:dirt"], &indices)]),
            )],
        );
        let chunk = decode_chunk(&root, DEFAULT_MIN_BITS).unwrap().unwrap();
        let section = chunk.sections[0].as_ref().unwrap();
        assert_eq!(section.voxel(17), Voxel::BadIndex(9));
    }

    #[test]
    fn test_packed_length_mismatch() {
        let section = Tag::compound([
            ("Y", Tag::Byte(0)),
            ("Palette", Tag::List(vec![palette_entry("minecraft:air")])),
            ("BlockStates", Tag::LongArray(vec![0; 100])),
        ]);
        let root = chunk_root(1519, vec![("Sections", Tag::List(vec![section]))]);
        assert_matches!(
            decode_chunk(&root, DEFAULT_MIN_BITS),
            Err(CartographError::PackedLengthMismatch { expected: 256, actual: 100 })
        );
    }

    #[test]
    fn test_legacy_section_with_add() {
        let mut blocks = vec![0i8; SECTION_VOLUME];
        let mut data = vec![0u8; SECTION_VOLUME / 2];
        let mut add = vec![0u8; SECTION_VOLUME / 2];
        let idx = Section::index(1, 2, 3);
        blocks[idx] = 0x23u8 as i8;
        nybble::set(&mut data, idx, 0xB);
        nybble::set(&mut add, idx, 0x1);
        blocks[idx + 1] = -1; // 0xFF, no add bits

        let section = Tag::compound([
            ("Y", Tag::Byte(2)),
            ("Blocks", Tag::ByteArray(blocks)),
            ("Data", Tag::ByteArray(data.iter().map(|&b| b as i8).collect())),
            ("Add", Tag::ByteArray(add.iter().map(|&b| b as i8).collect())),
        ]);
        let mut biomes = vec![1i8; 256];
        biomes[3] = -1;
        let root = chunk_root(
            1343,
            vec![
                ("Sections", Tag::List(vec![section])),
                ("Biomes", Tag::ByteArray(biomes)),
            ],
        );

        let chunk = decode_chunk(&root, DEFAULT_MIN_BITS).unwrap().unwrap();
        assert_eq!(chunk.format, ChunkFormat::Legacy);
        let section = chunk.sections[2].as_ref().unwrap();
        assert_eq!(section.voxel(idx), Voxel::Legacy { id: 0x123, datum: 0xB });
        assert_eq!(section.voxel(idx + 1), Voxel::Legacy { id: 0xFF, datum: 0 });
        assert_eq!(chunk.biome(0, 0), 1);
        assert_eq!(chunk.biome(3, 0), UNKNOWN_BIOME);
    }

    #[test]
    fn test_legacy_section_wrong_length() {
        let section = Tag::compound([
            ("Y", Tag::Byte(0)),
            ("Blocks", Tag::ByteArray(vec![0; 100])),
            ("Data", Tag::ByteArray(vec![0; 2048])),
        ]);
        let root = chunk_root(1139, vec![("Sections", Tag::List(vec![section]))]);
        assert_matches!(
            decode_chunk(&root, DEFAULT_MIN_BITS),
            Err(CartographError::UnexpectedTag { .. })
        );
    }

    #[test]
    fn test_biomes_absent_are_unknown() {
        let chunk = decode_chunk(&chunk_root(1343, vec![]), DEFAULT_MIN_BITS)
            .unwrap()
            .unwrap();
        assert!(chunk.biomes.iter().all(|&b| b == UNKNOWN_BIOME));
        assert_eq!(chunk.top_section(), None);
    }

    #[test]
    fn test_volumetric_biomes_sample_sea_level() {
        let mut cells = vec![0i32; 1024];
        for (i, cell) in cells.iter_mut().enumerate().skip(256).take(16) {
            *cell = i as i32;
        }
        let root = chunk_root(2230, vec![("Biomes", Tag::IntArray(cells))]);
        let chunk = decode_chunk(&root, DEFAULT_MIN_BITS).unwrap().unwrap();
        assert_eq!(chunk.biome(0, 0), 256);
        assert_eq!(chunk.biome(15, 15), 256 + 15);
        assert_eq!(chunk.biome(5, 9), 256 + 2 * 4 + 1);
    }
}

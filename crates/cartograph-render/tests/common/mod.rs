#![allow(dead_code)]

use cartograph_nbt::Tag;
use cartograph_render::biome_map::BiomeTable;
use cartograph_render::chunk::Section;
use cartograph_render::color_map::ColorTable;
use cartograph_render::palette::{self, DEFAULT_MIN_BITS, SECTION_VOLUME};
use cartograph_render::ColorModel;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;

const SECTOR: usize = 4096;

pub const TEST_COLORS: &str = "\
default 0xFFFF00FF
0 0x00000000
1 0xFF808080
minecraft:air 0x00000000
minecraft:stone 0xFF808080
";

pub const TEST_BIOMES: &str = "default 0xFFFFFFFF 0xFFFFFFFF 0xFFFFFFFF\n";

pub fn test_model() -> ColorModel {
    let colors = ColorTable::parse(TEST_COLORS, "test").unwrap();
    let biomes = BiomeTable::parse(TEST_BIOMES, "test").unwrap();
    ColorModel::new(Arc::new(colors), Arc::new(biomes))
}

/// Region image with each chunk zlib-compressed into its own sectors.
pub fn build_region(chunks: &[(usize, usize, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 2 * SECTOR];
    for (cx, cz, payload) in chunks {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(payload).unwrap();
        let body = enc.finish().unwrap();

        let sector = data.len() / SECTOR;
        let sectors = (body.len() + 5 + SECTOR - 1) / SECTOR;
        let entry = ((sector as u32) << 8) | sectors as u32;
        let idx = (cx + 32 * cz) * 4;
        data[idx..idx + 4].copy_from_slice(&entry.to_be_bytes());
        data.extend_from_slice(&((body.len() + 1) as u32).to_be_bytes());
        data.push(2);
        data.extend_from_slice(&body);
        data.resize((sector + sectors) * SECTOR, 0);
    }
    data
}

pub fn chunk_bytes(version: i32, level: Vec<(&str, Tag)>) -> Vec<u8> {
    Tag::compound([
        ("DataVersion", Tag::Int(version)),
        ("Level", Tag::compound(level)),
    ])
    .to_bytes("")
    .unwrap()
}

/// Section filled with palette index 1 up to and including `top_y`.
pub fn filled_indices(top_y: usize) -> Vec<u32> {
    let mut indices = vec![0u32; SECTION_VOLUME];
    for y in 0..=top_y {
        for z in 0..16 {
            for x in 0..16 {
                indices[Section::index(x, y, z)] = 1;
            }
        }
    }
    indices
}

pub fn paletted_section(y: i8, names: &[&str], indices: &[u32]) -> Tag {
    let width = palette::bit_width(names.len(), DEFAULT_MIN_BITS);
    let words = palette::pack(indices, width)
        .into_iter()
        .map(|w| w as i64)
        .collect();
    Tag::compound([
        ("Y", Tag::Byte(y)),
        (
            "Palette",
            Tag::List(
                names
                    .iter()
                    .map(|n| Tag::compound([("Name", Tag::String((*n).to_owned()))]))
                    .collect(),
            ),
        ),
        ("BlockStates", Tag::LongArray(words)),
    ])
}

/// Paletted chunk with air and stone, stone from y=0 to `top_y`.
pub fn stone_chunk(top_y: usize) -> Vec<u8> {
    chunk_bytes(
        1976,
        vec![
            ("Status", Tag::String("full".to_owned())),
            (
                "Sections",
                Tag::List(vec![paletted_section(
                    0,
                    &["minecraft:air", "minecraft:stone"],
                    &filled_indices(top_y),
                )]),
            ),
        ],
    )
}

/// Legacy chunk with block id `id` from y=0 to `top_y`.
pub fn legacy_chunk(id: i8, top_y: usize, biome: i8) -> Vec<u8> {
    let blocks: Vec<i8> = filled_indices(top_y)
        .into_iter()
        .map(|i| if i == 1 { id } else { 0 })
        .collect();
    chunk_bytes(
        1343,
        vec![
            (
                "Sections",
                Tag::List(vec![Tag::compound([
                    ("Y", Tag::Byte(0)),
                    ("Blocks", Tag::ByteArray(blocks)),
                    ("Data", Tag::ByteArray(vec![0; SECTION_VOLUME / 2])),
                ])]),
            ),
            ("Biomes", Tag::ByteArray(vec![biome; 256])),
        ],
    )
}

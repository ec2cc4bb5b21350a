#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use cartograph_nbt::Tag;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTOR: usize = 4096;

pub const COLORS: &str = "\
default 0xFFFF00FF
minecraft:air 0x00000000
minecraft:cave_air 0x00000000
minecraft:stone 0xFF808080
";

/// Fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cartograph-viewer-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn build_region(chunks: &[(usize, usize, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 2 * SECTOR];
    for (cx, cz, payload) in chunks {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(payload).unwrap();
        let body = enc.finish().unwrap();

        let sector = data.len() / SECTOR;
        let sectors = (body.len() + 5 + SECTOR - 1) / SECTOR;
        let idx = (cx + 32 * cz) * 4;
        (&mut data[idx..idx + 4])
            .write_u32::<BigEndian>(((sector as u32) << 8) | sectors as u32)
            .unwrap();
        data.write_u32::<BigEndian>((body.len() + 1) as u32).unwrap();
        data.write_u8(2).unwrap();
        data.extend_from_slice(&body);
        data.resize((sector + sectors) * SECTOR, 0);
    }
    data
}

fn chunk(version: i32, level: Vec<(&str, Tag)>) -> Vec<u8> {
    Tag::compound([
        ("DataVersion", Tag::Int(version)),
        ("Level", Tag::compound(level)),
    ])
    .to_bytes("")
    .unwrap()
}

/// Air and stone, stone filling y=0..=top_y. Indices are 4 bits wide.
pub fn stone_chunk(top_y: usize) -> Vec<u8> {
    let mut words = vec![0i64; 256];
    for y in 0..=top_y {
        // one word holds sixteen 4-bit indices, i.e. one row of x
        for row in 0..16 {
            words[y * 16 + row] = 0x1111_1111_1111_1111;
        }
    }
    chunk(
        1976,
        vec![
            ("Status", Tag::String("full".to_owned())),
            (
                "Sections",
                Tag::List(vec![Tag::compound([
                    ("Y", Tag::Byte(0)),
                    (
                        "Palette",
                        Tag::List(vec![
                            Tag::compound([("Name", Tag::String("minecraft:air".to_owned()))]),
                            Tag::compound([("Name", Tag::String("minecraft:stone".to_owned()))]),
                        ]),
                    ),
                    ("BlockStates", Tag::LongArray(words)),
                ])]),
            ),
        ],
    )
}

/// Chunk from a world version the renderer refuses.
pub fn future_chunk() -> Vec<u8> {
    chunk(3465, vec![])
}

pub fn write_world(root: &Path, regions: &[(&str, Vec<u8>)]) -> PathBuf {
    let world = root.join("world");
    let region_dir = world.join("region");
    std::fs::create_dir_all(&region_dir).unwrap();
    for (name, bytes) in regions {
        std::fs::write(region_dir.join(name), bytes).unwrap();
    }
    world
}

/// Straight RGBA pixel at (x, z) of a raw tile dump.
pub fn pixel(bytes: &[u8], x: usize, z: usize) -> [u8; 4] {
    let i = (z * 512 + x) * 4;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

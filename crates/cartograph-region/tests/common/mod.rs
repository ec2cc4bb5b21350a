use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;

const SECTOR: usize = 4096;

/// Assembles a region file image. Each chunk gets its own run of sectors.
pub fn build_region(chunks: &[(usize, usize, u8, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 2 * SECTOR];
    for (cx, cz, scheme, payload) in chunks {
        let body = match scheme {
            1 => {
                let mut enc = GzEncoder::new(Vec::new(), Compression::default());
                enc.write_all(payload).unwrap();
                enc.finish().unwrap()
            }
            2 => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(payload).unwrap();
                enc.finish().unwrap()
            }
            _ => payload.clone(),
        };
        let sector = data.len() / SECTOR;
        let sectors = (body.len() + 5 + SECTOR - 1) / SECTOR;
        let entry = ((sector as u32) << 8) | sectors as u32;
        let idx = (cx + 32 * cz) * 4;
        data[idx..idx + 4].copy_from_slice(&entry.to_be_bytes());
        data.extend_from_slice(&((body.len() + 1) as u32).to_be_bytes());
        data.push(*scheme);
        data.extend_from_slice(&body);
        data.resize((sector + sectors) * SECTOR, 0);
    }
    data
}

/// Fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cartograph-region-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

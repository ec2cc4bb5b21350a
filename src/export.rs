use cartograph_common::{RegionPos, Result};
use cartograph_render::Tile;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "report.txt";

/// `tile.<x>.<z>.rgba`
pub fn tile_file_name(pos: RegionPos) -> String {
    format!("tile.{}.{}.rgba", pos.x, pos.z)
}

/// Writes a raster as raw straight RGBA bytes, row by row.
pub async fn write_tile(dir: &Path, pos: RegionPos, tile: &Tile) -> Result<PathBuf> {
    let path = dir.join(tile_file_name(pos));
    tokio::fs::write(&path, tile.to_rgba_bytes()).await?;
    Ok(path)
}

pub async fn write_report(dir: &Path, report: &str) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE);
    tokio::fs::write(&path, report).await?;
    Ok(path)
}

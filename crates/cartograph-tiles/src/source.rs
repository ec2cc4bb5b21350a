use cartograph_common::{CartographError, RegionPos, Result};
use cartograph_region::RegionMap;
use cartograph_render::{RegionRenderer, Tile};

/// Produces tiles for the cache. Called from blocking worker threads, so
/// implementations may do file I/O and heavy computation directly.
pub trait TileSource: Send + Sync + 'static {
    /// Every region the cache should track.
    fn regions(&self) -> Vec<RegionPos>;

    fn render(&self, pos: RegionPos) -> Result<Tile>;
}

/// Renders the region files of a scanned world.
pub struct RegionSource {
    map: RegionMap,
    renderer: RegionRenderer,
}

impl RegionSource {
    pub fn new(map: RegionMap, renderer: RegionRenderer) -> Self {
        RegionSource { map, renderer }
    }

    pub fn map(&self) -> &RegionMap {
        &self.map
    }

    pub fn renderer(&self) -> &RegionRenderer {
        &self.renderer
    }
}

impl TileSource for RegionSource {
    fn regions(&self) -> Vec<RegionPos> {
        self.map.regions.iter().map(|r| r.pos).collect()
    }

    fn render(&self, pos: RegionPos) -> Result<Tile> {
        let entry = self.map.region_at(pos).ok_or_else(|| {
            CartographError::RenderError(format!("no region file for {},{}", pos.x, pos.z))
        })?;
        self.renderer.render_path(&entry.path)
    }
}

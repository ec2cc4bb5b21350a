//! Headless viewer: renders every region of a world through the tile cache
//! and dumps the rasters.

use crate::config::ViewerConfig;
use crate::export::{write_report, write_tile};
use cartograph_common::{RegionPos, Result, WorldRect};
use cartograph_logger::{log, LogSeverity};
use cartograph_region::RegionMap;
use cartograph_render::{Diagnostics, RegionRenderer};
use cartograph_tiles::{CacheSettings, RegionSource, TileCache, Viewport};
use std::path::PathBuf;

use LogSeverity::*;

/// What a run produced.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    /// Regions that ran out of render attempts.
    pub failed: Vec<RegionPos>,
    pub diagnostics: Diagnostics,
}

pub async fn run(config: &ViewerConfig) -> Result<ExportSummary> {
    let renderer = RegionRenderer::from_settings(config.render.clone())?;
    let map = RegionMap::load(&config.world, config.region_limit())?;
    let Some(bounds) = map.bounds else {
        log(format!("No regions found in {}", config.world.display()), Warning);
        return Ok(ExportSummary::default());
    };

    tokio::fs::create_dir_all(&config.output).await?;
    let mut positions: Vec<RegionPos> = map.regions.iter().map(|r| r.pos).collect();
    positions.sort_by_key(|p| (p.z, p.x));

    // every raster is read once after settling; none may be dropped before
    let settings = CacheSettings {
        evict: false,
        ..config.cache.clone()
    };
    let cache = TileCache::start(RegionSource::new(map, renderer.clone()), settings);
    cache.set_viewport(Viewport::centered(WorldRect::from_regions(&bounds)));
    cache.wait_until_settled().await;

    let mut summary = ExportSummary::default();
    for pos in positions {
        match cache.raster(pos) {
            Some(tile) => summary.written.push(write_tile(&config.output, pos, &tile).await?),
            None => {
                log(format!("Region {},{} could not be rendered", pos.x, pos.z), Warning);
                summary.failed.push(pos);
            }
        }
    }
    cache.shutdown().await;

    summary.diagnostics = renderer.diagnostics();
    let report = summary.diagnostics.report();
    for line in report.lines() {
        log(line.to_owned(), Info);
    }
    write_report(&config.output, &report).await?;
    log(
        format!(
            "Wrote {} tiles to {} ({} failed)",
            summary.written.len(),
            config.output.display(),
            summary.failed.len()
        ),
        Info,
    );
    Ok(summary)
}

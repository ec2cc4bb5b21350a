use crate::biome_map::BiomeTable;
use crate::chunk::decode_chunk;
use crate::color;
use crate::color_map::ColorTable;
use crate::color_model::ColorModel;
use crate::compositor::{Compositor, TileBuffer, TILE_SIZE};
use crate::diagnostics::{Diagnostics, RenderStats, UnmappedIds};
use crate::settings::RenderSettings;
use crate::shade::shade_tile;
use cartograph_common::{CartographError, Result};
use cartograph_logger::{log, LogSeverity};
use cartograph_nbt::Tag;
use cartograph_region::RegionFile;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use LogSeverity::*;

/// A finished, straight-alpha 512x512 raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub colors: Vec<u32>,
}

impl Tile {
    pub fn pixel(&self, x: usize, z: usize) -> u32 {
        self.colors[TileBuffer::index(x, z)]
    }

    /// Row-major `[r, g, b, a]` bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TILE_SIZE * TILE_SIZE * 4);
        for &c in &self.colors {
            out.extend_from_slice(&color::to_rgba(c));
        }
        out
    }
}

/// Turns region files into tiles. Cheap to clone; clones share the color
/// tables and the diagnostics sink.
#[derive(Debug, Clone)]
pub struct RegionRenderer {
    model: ColorModel,
    settings: Arc<RenderSettings>,
    diagnostics: Arc<Mutex<Diagnostics>>,
}

impl RegionRenderer {
    pub fn new(model: ColorModel, settings: RenderSettings) -> Self {
        RegionRenderer {
            model,
            settings: Arc::new(settings),
            diagnostics: Arc::new(Mutex::new(Diagnostics::default())),
        }
    }

    /// Loads the configured color tables, or the embedded ones.
    pub fn from_settings(settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        let colors = match &settings.color_map {
            Some(path) => ColorTable::load(path)?,
            None => ColorTable::load_default()?,
        };
        let biomes = match &settings.biome_map {
            Some(path) => BiomeTable::load(path)?,
            None => BiomeTable::load_default()?,
        };
        log(
            format!("Loaded color tables ({} biomes)", biomes.len()),
            Debug,
        );
        let model = ColorModel::new(Arc::new(colors), Arc::new(biomes));
        Ok(RegionRenderer::new(model, settings))
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn model(&self) -> &ColorModel {
        &self.model
    }

    /// Snapshot of everything recorded so far.
    pub fn diagnostics(&self) -> Diagnostics {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Decodes and composites every chunk of a region. The result is still
    /// premultiplied and unshaded.
    pub fn pre_render(&self, region: &RegionFile) -> Result<(TileBuffer, RenderStats, UnmappedIds)> {
        let started = Instant::now();
        let compositor = Compositor::new(&self.model, &self.settings);
        let mut tile = TileBuffer::new();
        let mut stats = RenderStats::default();
        let mut unmapped = UnmappedIds::default();

        for (cx, cz, payload) in region.chunks() {
            let decoded = payload.and_then(|payload| {
                let (_, root) = Tag::from_bytes(&payload.data)
                    .map_err(|e| CartographError::NbtError(e.to_string()))?;
                decode_chunk(&root, self.settings.min_palette_bits)
            });
            match decoded {
                Ok(Some(chunk)) => {
                    stats.sections += chunk.section_count();
                    compositor.composite_chunk(&chunk, cx, cz, &mut tile, &mut unmapped, &mut stats);
                    stats.chunks_rendered += 1;
                }
                Ok(None) => stats.chunks_skipped += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e @ CartographError::UnsupportedDataVersion(_)) => {
                    log(format!("Skipping chunk {},{}: {}", cx, cz, e), Warning);
                    stats.chunks_unsupported += 1;
                }
                Err(e) => {
                    log(format!("Skipping chunk {},{}: {}", cx, cz, e), Warning);
                    stats.chunks_failed += 1;
                }
            }
        }

        stats.elapsed = started.elapsed();
        Ok((tile, stats, unmapped))
    }

    /// Renders a region to a finished tile and records its diagnostics.
    pub fn render(&self, region: &RegionFile) -> Result<Tile> {
        let (mut tile, stats, unmapped) = self.pre_render(region)?;
        tile.demultiply();
        shade_tile(&mut tile, &self.settings);

        log(
            format!(
                "Rendered {}: {} chunks ({} skipped, {} failed, {} unsupported), {} sections, {} bad indices in {}ms",
                region
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<memory>".to_owned()),
                stats.chunks_rendered,
                stats.chunks_skipped,
                stats.chunks_failed,
                stats.chunks_unsupported,
                stats.sections,
                stats.bad_indices,
                stats.elapsed.as_millis()
            ),
            Debug,
        );
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.record(unmapped, &stats),
            Err(poisoned) => poisoned.into_inner().record(unmapped, &stats),
        }

        Ok(Tile { colors: tile.colors })
    }

    pub fn render_path(&self, path: &Path) -> Result<Tile> {
        let region = RegionFile::open(path)?;
        self.render(&region)
    }
}

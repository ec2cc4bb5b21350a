use crate::chunk::{Chunk, Section, Voxel};
use crate::color::{self, TRANSPARENT};
use crate::color_model::{BlockRef, ColorModel, BAD_INDEX_COLOR};
use crate::diagnostics::{RenderStats, UnmappedIds};
use crate::settings::RenderSettings;

pub const TILE_SIZE: usize = 512;
const CHUNK_SIZE: usize = 16;
// alpha at which nothing below can change a rounded channel
const OPAQUE: f32 = 1.0 - 0.5 / 255.0;

/// Color and surface height for every pixel of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct TileBuffer {
    pub colors: Vec<u32>,
    pub heights: Vec<i16>,
}

impl Default for TileBuffer {
    fn default() -> Self {
        TileBuffer {
            colors: vec![TRANSPARENT; TILE_SIZE * TILE_SIZE],
            heights: vec![0; TILE_SIZE * TILE_SIZE],
        }
    }
}

impl TileBuffer {
    pub fn new() -> Self {
        TileBuffer::default()
    }

    #[inline]
    pub fn index(x: usize, z: usize) -> usize {
        z * TILE_SIZE + x
    }

    /// Converts every pixel from premultiplied to straight alpha.
    pub fn demultiply(&mut self) {
        for c in self.colors.iter_mut() {
            *c = color::demultiply(*c);
        }
    }
}

/// Premultiplied accumulator for compositing a column top-down.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    a: f32,
    r: f32,
    g: f32,
    b: f32,
}

impl Accumulator {
    /// Puts a straight-alpha color underneath what has been accumulated.
    #[inline]
    fn under(&mut self, color: u32) {
        let k = (1.0 - self.a) * color::alpha(color) as f32 / 255.0;
        self.r += k * color::red(color) as f32 / 255.0;
        self.g += k * color::green(color) as f32 / 255.0;
        self.b += k * color::blue(color) as f32 / 255.0;
        self.a += k;
    }

    /// Same as [`Accumulator::under`] for an already premultiplied color.
    #[inline]
    fn under_premultiplied(&mut self, color: u32) {
        let k = (1.0 - self.a) / 255.0;
        self.r += k * color::red(color) as f32;
        self.g += k * color::green(color) as f32;
        self.b += k * color::blue(color) as f32;
        self.a += k * color::alpha(color) as f32;
    }

    #[inline]
    fn is_opaque(&self) -> bool {
        self.a >= OPAQUE
    }

    fn to_premultiplied(self) -> u32 {
        let q = |v: f32| (v * 255.0 + 0.5).clamp(0.0, 255.0) as u32;
        color::argb(q(self.a), q(self.r), q(self.g), q(self.b))
    }
}

/// Walks chunk columns top-down and writes premultiplied pixels and
/// surface heights into a tile.
pub struct Compositor<'a> {
    model: &'a ColorModel,
    settings: &'a RenderSettings,
    cutoff: f32,
    early_exit: bool,
}

impl<'a> Compositor<'a> {
    pub fn new(model: &'a ColorModel, settings: &'a RenderSettings) -> Self {
        Compositor {
            model,
            settings,
            cutoff: settings.shade_opacity_cutoff as f32 / 255.0,
            early_exit: true,
        }
    }

    /// Disables the stop-when-opaque shortcut. The output must not change.
    pub fn exhaustive(mut self) -> Self {
        self.early_exit = false;
        self
    }

    pub fn composite_chunk(
        &self,
        chunk: &Chunk,
        cx: usize,
        cz: usize,
        tile: &mut TileBuffer,
        unmapped: &mut UnmappedIds,
        stats: &mut RenderStats,
    ) {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let (color, height) = self.composite_column(chunk, x, z, unmapped, stats);
                let idx = TileBuffer::index(cx * CHUNK_SIZE + x, cz * CHUNK_SIZE + z);
                tile.colors[idx] = color;
                tile.heights[idx] = height;
            }
        }
    }

    /// Premultiplied color and surface height of one column.
    pub fn composite_column(
        &self,
        chunk: &Chunk,
        x: usize,
        z: usize,
        unmapped: &mut UnmappedIds,
        stats: &mut RenderStats,
    ) -> (u32, i16) {
        let Some(top) = chunk.top_section() else {
            return (TRANSPARENT, 0);
        };
        let biome = chunk.biome(x, z);
        let mut acc = Accumulator::default();
        let mut height: Option<i32> = None;

        for s in (0..=top).rev() {
            let base_y = (s * 16) as i32;
            if !self.settings.section_touches_range(base_y) {
                continue;
            }

            match &chunk.sections[s] {
                Some(section) => {
                    for y in (0..16).rev() {
                        let abs_y = base_y + y as i32;
                        if !self.settings.in_range(abs_y) {
                            continue;
                        }
                        let color = match section.voxel(Section::index(x, y, z)) {
                            Voxel::Legacy { id, datum } => {
                                self.model.resolve(BlockRef::Legacy { id, datum }, biome, unmapped)
                            }
                            Voxel::State(state) => {
                                self.model.resolve(BlockRef::State(state), biome, unmapped)
                            }
                            Voxel::BadIndex(_) => {
                                stats.bad_indices += 1;
                                BAD_INDEX_COLOR
                            }
                        };
                        acc.under(color);
                        if height.is_none() && acc.a >= self.cutoff {
                            height = Some(abs_y);
                        }
                        if self.early_exit && acc.is_opaque() {
                            return (acc.to_premultiplied(), height.unwrap_or(abs_y) as i16);
                        }
                    }
                }
                None if self.settings.section_in_range(base_y) => {
                    acc.under_premultiplied(self.model.air16(chunk.format));
                    if height.is_none() && acc.a >= self.cutoff {
                        height = Some(base_y + 15);
                    }
                }
                None => {
                    let air = self.model.air(chunk.format);
                    for abs_y in (base_y..base_y + 16).rev() {
                        if self.settings.in_range(abs_y) {
                            acc.under(air);
                            if height.is_none() && acc.a >= self.cutoff {
                                height = Some(abs_y);
                            }
                        }
                    }
                }
            }
        }

        (acc.to_premultiplied(), height.unwrap_or(0) as i16)
    }
}

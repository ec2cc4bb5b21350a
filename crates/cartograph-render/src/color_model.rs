use crate::biome_map::BiomeTable;
use crate::chunk::{ChunkFormat, UNKNOWN_BIOME};
use crate::color::{self, TRANSPARENT};
use crate::color_map::{ColorEntry, ColorTable, Influence};
use crate::diagnostics::{BlockKey, SubBlockKey, UnmappedIds};
use crate::palette::BlockState;
use std::sync::Arc;

/// Drawn for palette indices past the end of their palette.
pub const BAD_INDEX_COLOR: u32 = 0xFFFF_00FF;

const AIR_NAME: &str = "minecraft:air";

/// Block identity as the color model sees it.
#[derive(Debug, Clone, Copy)]
pub enum BlockRef<'a> {
    Legacy { id: u16, datum: u8 },
    State(&'a BlockState),
}

/// Resolves voxels to straight-alpha colors. Tables are shared read-only
/// between every render pass.
#[derive(Debug, Clone)]
pub struct ColorModel {
    colors: Arc<ColorTable>,
    biomes: Arc<BiomeTable>,
    air: [u32; 2],
    air16: [u32; 2],
}

impl ColorModel {
    pub fn new(colors: Arc<ColorTable>, biomes: Arc<BiomeTable>) -> Self {
        let mut model = ColorModel {
            colors,
            biomes,
            air: [TRANSPARENT; 2],
            air16: [TRANSPARENT; 2],
        };
        let mut scratch = UnmappedIds::default();
        let air_state = BlockState::new(AIR_NAME);
        model.air = [
            model.resolve(BlockRef::Legacy { id: 0, datum: 0 }, UNKNOWN_BIOME, &mut scratch),
            model.resolve(BlockRef::State(&air_state), UNKNOWN_BIOME, &mut scratch),
        ];
        model.air16 = model.air.map(|air| color::overlay_repeated(TRANSPARENT, air, 16));
        model
    }

    fn format_slot(format: ChunkFormat) -> usize {
        match format {
            ChunkFormat::Legacy => 0,
            ChunkFormat::Paletted => 1,
        }
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn biomes(&self) -> &BiomeTable {
        &self.biomes
    }

    /// Premultiplied color of sixteen stacked air voxels.
    pub fn air16(&self, format: ChunkFormat) -> u32 {
        self.air16[Self::format_slot(format)]
    }

    /// Straight-alpha color of one air voxel.
    pub fn air(&self, format: ChunkFormat) -> u32 {
        self.air[Self::format_slot(format)]
    }

    fn entry_for(&self, block: BlockRef<'_>, unmapped: &mut UnmappedIds) -> ColorEntry {
        let default = *self.colors.default_entry();
        match block {
            BlockRef::Legacy { id, datum } => {
                let Some(colors) = self.colors.legacy(id) else {
                    unmapped.blocks.insert(BlockKey::Id(id));
                    return default;
                };
                if let Some(sub) = colors.sub.get(datum as usize).copied().flatten() {
                    return sub;
                }
                if datum != 0 {
                    unmapped.sub_blocks.insert(SubBlockKey::IdDatum(id, datum));
                }
                colors.base.unwrap_or_else(|| {
                    unmapped.blocks.insert(BlockKey::Id(id));
                    default
                })
            }
            BlockRef::State(state) => {
                let Some(colors) = self.colors.named(&state.name) else {
                    unmapped.blocks.insert(BlockKey::Name(state.name.clone()));
                    return default;
                };
                if let Some(entry) = colors.select(state) {
                    return *entry;
                }
                if !colors.overrides.is_empty() && !state.properties.is_empty() {
                    unmapped.sub_blocks.insert(SubBlockKey::State(state.to_string()));
                }
                colors.base.unwrap_or_else(|| {
                    unmapped.blocks.insert(BlockKey::Name(state.name.clone()));
                    default
                })
            }
        }
    }

    /// Color of a voxel in the given biome. Lookup misses fall back to the
    /// table defaults and are recorded in `unmapped`.
    pub fn resolve(&self, block: BlockRef<'_>, biome_id: i32, unmapped: &mut UnmappedIds) -> u32 {
        let entry = self.entry_for(block, unmapped);
        if entry.influence == Influence::None {
            return entry.color;
        }

        let biome = match self.biomes.get(biome_id) {
            Some(biome) => biome,
            None => {
                if biome_id != UNKNOWN_BIOME {
                    unmapped.biomes.insert(biome_id);
                }
                self.biomes.default_biome()
            }
        };
        color::multiply_solid(entry.color, biome.multiplier(entry.influence))
    }
}

//! Region rendering: chunk decoding, color resolution, top-down column
//! compositing and relief shading into 512x512 tiles.

pub mod biome_map;
pub mod chunk;
pub mod color;
pub mod color_map;
pub mod color_model;
pub mod compositor;
pub mod diagnostics;
pub mod nybble;
pub mod palette;
pub mod renderer;
pub mod settings;
pub mod shade;

pub use color_model::{BlockRef, ColorModel, BAD_INDEX_COLOR};
pub use compositor::{TileBuffer, TILE_SIZE};
pub use diagnostics::{Diagnostics, RenderStats, UnmappedIds};
pub use renderer::{RegionRenderer, Tile};
pub use settings::RenderSettings;

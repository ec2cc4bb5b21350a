//! Tile cache: a pool of render workers over a fixed set of regions, with
//! per-region atomic render states, whole-raster publication and
//! time-driven eviction.

pub mod rendered_region;
pub mod settings;
pub mod source;
pub mod state;
pub mod tile_cache;
pub mod viewport;

pub use rendered_region::RenderedRegion;
pub use settings::CacheSettings;
pub use source::{RegionSource, TileSource};
pub use state::{AtomicRenderState, RenderState};
pub use tile_cache::TileCache;
pub use viewport::Viewport;

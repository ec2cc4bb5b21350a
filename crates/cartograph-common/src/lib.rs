pub mod error;
pub mod types;

pub use error::CartographError;
pub use types::{BoundingRect, RegionPos, Result, WorldPoint, WorldRect};

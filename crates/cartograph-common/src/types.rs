use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, crate::error::CartographError>;

/// Width of one region in blocks (32 chunks of 16).
pub const REGION_BLOCKS: i32 = 512;

/// Coordinate of a region in region space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        RegionPos { x, z }
    }

    /// Region containing the given block coordinate.
    pub fn containing(block_x: f64, block_z: f64) -> Self {
        RegionPos {
            x: (block_x / REGION_BLOCKS as f64).floor() as i32,
            z: (block_z / REGION_BLOCKS as f64).floor() as i32,
        }
    }

    /// Squared Euclidean distance, in region units, from this region's
    /// center to a world point.
    pub fn distance_sq_to(&self, point: WorldPoint) -> f64 {
        let dx = self.x as f64 + 0.5 - point.x / REGION_BLOCKS as f64;
        let dz = self.z as f64 + 0.5 - point.z / REGION_BLOCKS as f64;
        dx * dx + dz * dz
    }
}

/// A point in world (block) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub z: f64,
}

impl WorldPoint {
    pub fn new(x: f64, z: f64) -> Self {
        WorldPoint { x, z }
    }
}

/// Axis-aligned rectangle in world (block) coordinates, max exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl WorldRect {
    pub fn new(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Self {
        WorldRect {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    /// Rectangle exactly covering the given region bounds.
    pub fn from_regions(bounds: &BoundingRect) -> Self {
        let b = REGION_BLOCKS as f64;
        WorldRect {
            min_x: bounds.min_x as f64 * b,
            min_z: bounds.min_z as f64 * b,
            max_x: bounds.max_x as f64 * b,
            max_z: bounds.max_z as f64 * b,
        }
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint {
            x: (self.min_x + self.max_x) / 2.0,
            z: (self.min_z + self.max_z) / 2.0,
        }
    }

    /// Whether any block of the region lies inside this rectangle.
    pub fn intersects(&self, pos: RegionPos) -> bool {
        let b = REGION_BLOCKS as f64;
        let (rx0, rz0) = (pos.x as f64 * b, pos.z as f64 * b);
        rx0 < self.max_x && rx0 + b > self.min_x && rz0 < self.max_z && rz0 + b > self.min_z
    }
}

/// Integer rectangle in region space, min inclusive, max exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

impl BoundingRect {
    pub const INFINITE: BoundingRect = BoundingRect {
        min_x: i32::MIN,
        min_z: i32::MIN,
        max_x: i32::MAX,
        max_z: i32::MAX,
    };

    pub fn new(min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> Self {
        BoundingRect {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    pub fn contains(&self, pos: RegionPos) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.z >= self.min_z && pos.z < self.max_z
    }

    /// Grows this rectangle to cover `pos`. Starting from `None` yields the
    /// one-region rectangle around it.
    pub fn include(bounds: Option<BoundingRect>, pos: RegionPos) -> BoundingRect {
        match bounds {
            None => BoundingRect::new(pos.x, pos.z, pos.x + 1, pos.z + 1),
            Some(b) => BoundingRect {
                min_x: b.min_x.min(pos.x),
                min_z: b.min_z.min(pos.z),
                max_x: b.max_x.max(pos.x + 1),
                max_z: b.max_z.max(pos.z + 1),
            },
        }
    }
}

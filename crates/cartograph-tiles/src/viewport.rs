use cartograph_common::{RegionPos, WorldPoint, WorldRect};

/// The part of the world a display wants drawn, in block coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub rect: WorldRect,
    /// Regions closer to this point render first.
    pub focus: WorldPoint,
}

impl Viewport {
    pub fn new(rect: WorldRect, focus: WorldPoint) -> Self {
        Viewport { rect, focus }
    }

    /// Viewport focused on the middle of `rect`.
    pub fn centered(rect: WorldRect) -> Self {
        Viewport {
            rect,
            focus: rect.center(),
        }
    }

    pub fn shows(&self, pos: RegionPos) -> bool {
        self.rect.intersects(pos)
    }
}

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where a region is in its render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderState {
    /// No current raster; eligible for rendering.
    Invalid = 0,
    /// Claimed by exactly one worker.
    Drawing = 1,
    /// Invalidated while drawing; the worker must render again.
    Redraw = 2,
    Valid = 3,
}

impl RenderState {
    fn from_u8(value: u8) -> RenderState {
        match value {
            0 => RenderState::Invalid,
            1 => RenderState::Drawing,
            2 => RenderState::Redraw,
            _ => RenderState::Valid,
        }
    }

    /// A worker owns the region in these states.
    pub fn is_rendering(self) -> bool {
        matches!(self, RenderState::Drawing | RenderState::Redraw)
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderState::Invalid => write!(f, "INVALID"),
            RenderState::Drawing => write!(f, "DRAWING"),
            RenderState::Redraw => write!(f, "REDRAW"),
            RenderState::Valid => write!(f, "VALID"),
        }
    }
}

/// A [`RenderState`] updated only through compare-and-swap.
#[derive(Debug)]
pub struct AtomicRenderState(AtomicU8);

impl AtomicRenderState {
    pub fn new(state: RenderState) -> Self {
        AtomicRenderState(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> RenderState {
        RenderState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves from `current` to `new`. On failure returns the state that was
    /// actually observed.
    pub fn transition(&self, current: RenderState, new: RenderState) -> Result<(), RenderState> {
        self.0
            .compare_exchange(current as u8, new as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(RenderState::from_u8)
    }

    /// Applies `f` until it either declines (returns `None`) or its
    /// transition wins. Returns the state `f` last saw.
    pub fn update<F>(&self, mut f: F) -> RenderState
    where
        F: FnMut(RenderState) -> Option<RenderState>,
    {
        let mut current = self.load();
        loop {
            let Some(next) = f(current) else {
                return current;
            };
            match self.transition(current, next) {
                Ok(()) => return current,
                Err(actual) => current = actual,
            }
        }
    }
}

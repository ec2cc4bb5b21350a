use crate::state::{AtomicRenderState, RenderState};
use cartograph_common::RegionPos;
use cartograph_render::Tile;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::time::{Duration, Instant};

/// Cache slot for one region: its render state, its last published raster,
/// and the demand bookkeeping used for scheduling and eviction.
#[derive(Debug)]
pub struct RenderedRegion {
    pos: RegionPos,
    state: AtomicRenderState,
    raster: RwLock<Option<Arc<Tile>>>,
    last_access: Mutex<Instant>,
    wanted: AtomicBool,
    failures: AtomicU32,
}

impl RenderedRegion {
    pub fn new(pos: RegionPos) -> Self {
        RenderedRegion {
            pos,
            state: AtomicRenderState::new(RenderState::Invalid),
            raster: RwLock::new(None),
            last_access: Mutex::new(Instant::now()),
            wanted: AtomicBool::new(false),
            failures: AtomicU32::new(0),
        }
    }

    pub fn pos(&self) -> RegionPos {
        self.pos
    }

    pub fn state(&self) -> RenderState {
        self.state.load()
    }

    pub fn is_wanted(&self) -> bool {
        self.wanted.load(Ordering::Acquire)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    pub fn last_access(&self) -> Instant {
        match self.last_access.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Marks the region as in demand as of `now`.
    pub fn touch(&self, now: Instant) {
        match self.last_access.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
        self.wanted.store(true, Ordering::Release);
    }

    /// Current raster without counting as an access.
    pub fn peek_raster(&self) -> Option<Arc<Tile>> {
        match self.raster.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_raster(&self, tile: Option<Arc<Tile>>) {
        match self.raster.write() {
            Ok(mut guard) => *guard = tile,
            Err(poisoned) => *poisoned.into_inner() = tile,
        }
    }

    /// Whether a worker should pick this region up.
    pub fn is_pending(&self, max_attempts: u32) -> bool {
        self.is_wanted() && self.state() == RenderState::Invalid && self.failures() < max_attempts
    }

    /// Claims the region for rendering. Exactly one caller wins.
    pub fn try_claim(&self) -> bool {
        self.state
            .transition(RenderState::Invalid, RenderState::Drawing)
            .is_ok()
    }

    /// Swaps in a completely rendered raster.
    pub fn publish(&self, tile: Arc<Tile>) {
        self.set_raster(Some(tile));
    }

    /// Ends a successful pass. Returns false when the region was
    /// invalidated meanwhile; it is then back in `Drawing` and the caller
    /// must render again.
    pub fn finish(&self) -> bool {
        match self.state.transition(RenderState::Drawing, RenderState::Valid) {
            Ok(()) => {
                self.failures.store(0, Ordering::Release);
                true
            }
            Err(_) => {
                // only the claiming worker moves a region out of Redraw
                let _ = self.state.transition(RenderState::Redraw, RenderState::Drawing);
                false
            }
        }
    }

    /// Ends a failed pass. The region becomes selectable again until it
    /// runs out of attempts.
    pub fn fail(&self) -> u32 {
        // counted before the region becomes selectable again
        let attempts = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
        let _ = self.state.update(|s| s.is_rendering().then_some(RenderState::Invalid));
        attempts
    }

    /// Gives up an in-flight pass without publishing anything.
    pub fn abandon(&self) {
        let _ = self.state.update(|s| s.is_rendering().then_some(RenderState::Invalid));
    }

    /// Requests a fresh render and resets the failure count.
    pub fn invalidate(&self, now: Instant) -> RenderState {
        self.failures.store(0, Ordering::Release);
        self.touch(now);
        self.state.update(|s| match s {
            RenderState::Drawing => Some(RenderState::Redraw),
            RenderState::Valid => Some(RenderState::Invalid),
            RenderState::Redraw | RenderState::Invalid => None,
        })
    }

    /// Drops demand and the raster if the region has not been accessed
    /// since `now - max_age`. Only a drawn region is evicted; one that is
    /// queued or being rendered keeps its demand.
    pub fn evict(&self, now: Instant, max_age: Duration) -> bool {
        if now.saturating_duration_since(self.last_access()) < max_age {
            return false;
        }
        // held so a pass claimed right after the transition publishes last
        let mut raster = match self.raster.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.state.transition(RenderState::Valid, RenderState::Invalid).is_err() {
            return false;
        }
        self.wanted.store(false, Ordering::Release);
        *raster = None;
        true
    }
}

//! Concurrent render scheduler and raster cache.
//!
//! A fixed pool of worker tasks pulls regions to render, nearest to the
//! viewport focus first. Each region is claimed through its atomic state, so
//! no lock is held across a render pass and no two workers draw the same
//! region. Rasters are built privately and published whole.

use crate::rendered_region::RenderedRegion;
use crate::settings::CacheSettings;
use crate::source::TileSource;
use crate::state::RenderState;
use crate::viewport::Viewport;
use cartograph_common::{RegionPos, WorldPoint};
use cartograph_logger::{log, LogSeverity};
use cartograph_render::Tile;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use LogSeverity::*;

struct Shared<S: TileSource> {
    source: S,
    settings: CacheSettings,
    regions: HashMap<RegionPos, Arc<RenderedRegion>>,
    focus: Mutex<WorldPoint>,
    work: Notify,
    repaint: watch::Sender<u64>,
    shutdown: CancellationToken,
}

impl<S: TileSource> Shared<S> {
    fn focus(&self) -> WorldPoint {
        match self.focus.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_focus(&self, focus: WorldPoint) {
        match self.focus.lock() {
            Ok(mut guard) => *guard = focus,
            Err(poisoned) => *poisoned.into_inner() = focus,
        }
    }

    fn signal_repaint(&self) {
        self.repaint.send_modify(|generation| *generation += 1);
    }

    /// Claims the nearest pending region. A lost race moves on to the
    /// next candidate.
    fn next_region(&self) -> Option<Arc<RenderedRegion>> {
        let focus = self.focus();
        let max_attempts = self.settings.max_render_attempts;
        let mut candidates: Vec<(f64, &Arc<RenderedRegion>)> = self
            .regions
            .values()
            .filter(|r| r.is_pending(max_attempts))
            .map(|r| (r.pos().distance_sq_to(focus), r))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.pos().cmp(&b.1.pos())));

        candidates
            .into_iter()
            .map(|(_, r)| r)
            .find(|r| r.try_claim())
            .cloned()
    }

    fn is_settled(&self) -> bool {
        let max_attempts = self.settings.max_render_attempts;
        self.regions.values().filter(|r| r.is_wanted()).all(|r| match r.state() {
            RenderState::Valid => true,
            RenderState::Invalid => r.failures() >= max_attempts,
            RenderState::Drawing | RenderState::Redraw => false,
        })
    }

    fn evict(&self, now: Instant) -> usize {
        let max_age = self.settings.eviction_age();
        let evicted = self
            .regions
            .values()
            .filter(|r| r.evict(now, max_age))
            .count();
        if evicted > 0 {
            log(format!("Evicted {} cached tiles", evicted), Debug);
        }
        evicted
    }
}

async fn render_region<S: TileSource>(shared: &Arc<Shared<S>>, region: Arc<RenderedRegion>) {
    let pos = region.pos();
    loop {
        let task_shared = Arc::clone(shared);
        let pass = tokio::task::spawn_blocking(move || task_shared.source.render(pos));
        let result = tokio::select! {
            _ = shared.shutdown.cancelled() => {
                region.abandon();
                return;
            }
            result = pass => result,
        };

        match result {
            Ok(Ok(tile)) => {
                region.publish(Arc::new(tile));
                if region.finish() {
                    shared.signal_repaint();
                    return;
                }
                log(format!("Region {},{} changed while drawing, redrawing", pos.x, pos.z), Debug);
            }
            Ok(Err(e)) => {
                let attempts = region.fail();
                log(
                    format!("Failed to render region {},{} (attempt {}): {}", pos.x, pos.z, attempts, e),
                    Error,
                );
                shared.signal_repaint();
                return;
            }
            Err(join_error) => {
                let attempts = region.fail();
                log(
                    format!("Render task for region {},{} died (attempt {}): {}", pos.x, pos.z, attempts, join_error),
                    Error,
                );
                shared.signal_repaint();
                return;
            }
        }
    }
}

async fn worker<S: TileSource>(shared: Arc<Shared<S>>, id: usize) {
    log(format!("Tile worker {} started", id), Debug);
    while !shared.shutdown.is_cancelled() {
        // registered before selection so a wakeup during it is not lost
        let notified = shared.work.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        match shared.next_region() {
            Some(region) => render_region(&shared, region).await,
            None => {
                tokio::select! {
                    _ = shared.shutdown.cancelled() => break,
                    _ = notified => {}
                }
            }
        }
    }
    log(format!("Tile worker {} stopped", id), Debug);
}

async fn evictor<S: TileSource>(shared: Arc<Shared<S>>) {
    let mut ticker = interval(shared.settings.eviction_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            _ = ticker.tick() => {
                shared.evict(Instant::now());
            }
        }
    }
}

/// Keeps rendered rasters for a set of regions and renders them on demand.
pub struct TileCache<S: TileSource> {
    shared: Arc<Shared<S>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<S: TileSource> TileCache<S> {
    /// Starts the worker pool and, unless disabled, the eviction sweep.
    /// Must be called from within a tokio runtime.
    pub fn start(source: S, settings: CacheSettings) -> Self {
        let regions = source
            .regions()
            .into_iter()
            .map(|pos| (pos, Arc::new(RenderedRegion::new(pos))))
            .collect();
        let (repaint, _) = watch::channel(0);
        let worker_count = settings.worker_count.max(1);
        let shared = Arc::new(Shared {
            source,
            settings,
            regions,
            focus: Mutex::new(WorldPoint::default()),
            work: Notify::new(),
            repaint,
            shutdown: CancellationToken::new(),
        });

        let mut tasks: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|id| tokio::spawn(worker(Arc::clone(&shared), id)))
            .collect();
        if shared.settings.evict {
            tasks.push(tokio::spawn(evictor(Arc::clone(&shared))));
        }

        log(
            format!("Tile cache started with {} workers over {} regions", worker_count, shared.regions.len()),
            Info,
        );
        TileCache { shared, tasks }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionPos> + '_ {
        self.shared.regions.keys().copied()
    }

    pub fn region(&self, pos: RegionPos) -> Option<Arc<RenderedRegion>> {
        self.shared.regions.get(&pos).cloned()
    }

    pub fn state(&self, pos: RegionPos) -> Option<RenderState> {
        self.shared.regions.get(&pos).map(|r| r.state())
    }

    /// Latest published raster. Counts as an access; a region without one
    /// is queued for rendering.
    pub fn raster(&self, pos: RegionPos) -> Option<Arc<Tile>> {
        let region = self.shared.regions.get(&pos)?;
        region.touch(Instant::now());
        let raster = region.peek_raster();
        if region.state() != RenderState::Valid {
            self.shared.work.notify_waiters();
        }
        raster
    }

    /// Moves the focus and marks every region the viewport shows as wanted.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.shared.set_focus(viewport.focus);
        let now = Instant::now();
        for region in self.shared.regions.values() {
            if viewport.shows(region.pos()) {
                region.touch(now);
            }
        }
        self.shared.work.notify_waiters();
    }

    pub fn invalidate(&self, pos: RegionPos) {
        if let Some(region) = self.shared.regions.get(&pos) {
            region.invalidate(Instant::now());
            self.shared.work.notify_waiters();
        }
    }

    pub fn invalidate_all(&self) {
        let now = Instant::now();
        for region in self.shared.regions.values() {
            region.invalidate(now);
        }
        self.shared.work.notify_waiters();
    }

    /// Receiver bumped whenever a region finishes or fails a render pass.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.repaint.subscribe()
    }

    /// Whether every wanted region is drawn or out of attempts.
    pub fn is_settled(&self) -> bool {
        self.shared.is_settled()
    }

    /// Waits until [`TileCache::is_settled`] holds.
    pub async fn wait_until_settled(&self) {
        let mut repaint = self.subscribe();
        loop {
            let _ = repaint.borrow_and_update();
            if self.is_settled() {
                return;
            }
            if repaint.changed().await.is_err() {
                return;
            }
        }
    }

    /// Runs one eviction sweep immediately.
    pub fn evict_now(&self) -> usize {
        self.shared.evict(Instant::now())
    }

    /// Stops every worker. In-flight passes are abandoned and publish
    /// nothing.
    pub async fn shutdown(self) {
        self.shared.shutdown.cancel();
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                log(format!("Tile cache task failed: {}", e), Error);
            }
        }
        log("Tile cache stopped".to_owned(), Info);
    }
}

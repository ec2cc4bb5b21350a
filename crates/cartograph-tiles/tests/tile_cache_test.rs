mod common;

use cartograph_common::{BoundingRect, RegionPos, WorldRect};
use cartograph_tiles::{CacheSettings, RenderState, TileCache, Viewport};
use common::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn one_worker() -> CacheSettings {
    CacheSettings {
        worker_count: 1,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalidate_while_drawing_renders_again() {
    let pos = RegionPos::new(0, 0);
    let (source, gate) = GatedSource::new(vec![pos]);
    let cache = TileCache::start(source, one_worker());

    assert!(cache.raster(pos).is_none());
    wait_for(|| cache.state(pos) == Some(RenderState::Drawing)).await;

    cache.invalidate(pos);
    assert_eq!(cache.state(pos), Some(RenderState::Redraw));

    gate.send(()).unwrap();
    wait_for(|| cache.source().started.load(Ordering::SeqCst) == 2).await;
    // the first pass finished but could not settle
    assert_eq!(cache.state(pos), Some(RenderState::Drawing));

    gate.send(()).unwrap();
    within(cache.wait_until_settled()).await;
    assert_eq!(cache.state(pos), Some(RenderState::Valid));
    assert_eq!(cache.source().finished.load(Ordering::SeqCst), 2);

    let tile = cache.raster(pos).unwrap();
    assert_eq!(tile.colors[0] & 0xFFFF, 2);
    within(cache.shutdown()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_region_has_one_drawer() {
    let regions: Vec<RegionPos> = (0..4).flat_map(|x| (0..4).map(move |z| RegionPos::new(x, z))).collect();
    let cache = TileCache::start(
        CountingSource::new(regions.clone()),
        CacheSettings {
            worker_count: 8,
            ..Default::default()
        },
    );
    cache.set_viewport(Viewport::centered(WorldRect::from_regions(&BoundingRect::new(0, 0, 4, 4))));
    within(cache.wait_until_settled()).await;

    assert_eq!(cache.source().renders(), regions.len());
    for pos in &regions {
        assert_eq!(cache.state(*pos), Some(RenderState::Valid));
    }
    within(cache.shutdown()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_abandons_in_flight_render() {
    let pos = RegionPos::new(3, -2);
    let (source, gate) = GatedSource::new(vec![pos]);
    let cache = TileCache::start(source, one_worker());
    cache.raster(pos);
    wait_for(|| cache.state(pos) == Some(RenderState::Drawing)).await;

    let region = cache.region(pos).unwrap();
    within(cache.shutdown()).await;
    assert_eq!(region.state(), RenderState::Invalid);
    assert!(region.peek_raster().is_none());
    drop(gate);
}

#[tokio::test(start_paused = true)]
async fn test_idle_raster_is_evicted_then_rerendered_on_access() {
    let pos = RegionPos::new(0, 0);
    let cache = TileCache::start(
        CountingSource::new(vec![pos]),
        CacheSettings {
            worker_count: 1,
            evict: true,
            eviction_interval_secs: 10,
            eviction_age_secs: 30,
            max_render_attempts: 3,
        },
    );
    cache.raster(pos);
    cache.wait_until_settled().await;
    assert_eq!(cache.state(pos), Some(RenderState::Valid));

    tokio::time::sleep(Duration::from_secs(25)).await;
    let region = cache.region(pos).unwrap();
    assert!(region.peek_raster().is_some());

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(region.state(), RenderState::Invalid);
    assert!(region.peek_raster().is_none());
    assert!(!region.is_wanted());
    // nobody asked for it again
    assert_eq!(cache.source().renders(), 1);

    assert!(cache.raster(pos).is_none());
    cache.wait_until_settled().await;
    assert_eq!(cache.source().renders(), 2);
    assert!(cache.raster(pos).is_some());
    cache.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_recent_access_keeps_raster() {
    let pos = RegionPos::new(0, 0);
    let cache = TileCache::start(CountingSource::new(vec![pos]), one_worker());
    cache.raster(pos);
    cache.wait_until_settled().await;

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(cache.raster(pos).is_some());
    }
    assert_eq!(cache.source().renders(), 1);
    cache.shutdown().await;
}

fn slow_pair() -> (RegionPos, RegionPos, Viewport) {
    let viewport = Viewport::centered(WorldRect::from_regions(&BoundingRect::new(0, 0, 2, 1)));
    (RegionPos::new(0, 0), RegionPos::new(1, 0), viewport)
}

fn short_lived(evict: bool) -> CacheSettings {
    CacheSettings {
        worker_count: 1,
        evict,
        eviction_interval_secs: 1,
        eviction_age_secs: 1,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_render_without_eviction_keeps_every_raster() {
    let (a, b, viewport) = slow_pair();
    let (source, gate) = GatedSource::new(vec![a, b]);
    let cache = TileCache::start(source, short_lived(false));
    cache.set_viewport(viewport);

    gate.send(()).unwrap();
    wait_for(|| cache.source().started.load(Ordering::SeqCst) == 2).await;
    // well past the eviction age while the second region is held
    tokio::time::sleep(Duration::from_millis(2500)).await;
    gate.send(()).unwrap();
    within(cache.wait_until_settled()).await;

    for pos in [a, b] {
        let region = cache.region(pos).unwrap();
        assert_eq!(region.state(), RenderState::Valid);
        assert!(region.peek_raster().is_some());
    }
    within(cache.shutdown()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_eviction_does_not_drop_queued_regions() {
    let (a, b, viewport) = slow_pair();
    let (source, gate) = GatedSource::new(vec![a, b]);
    let cache = TileCache::start(source, short_lived(true));
    cache.set_viewport(viewport);

    wait_for(|| cache.source().started.load(Ordering::SeqCst) == 1).await;
    // sweeps run while the other region waits in the queue
    tokio::time::sleep(Duration::from_millis(2500)).await;
    gate.send(()).unwrap();
    gate.send(()).unwrap();
    within(cache.wait_until_settled()).await;

    assert_eq!(cache.source().finished.load(Ordering::SeqCst), 2);
    within(cache.shutdown()).await;
}

#![allow(dead_code)]

use cartograph_common::{CartographError, RegionPos, Result};
use cartograph_render::Tile;
use cartograph_tiles::TileSource;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

fn tile_for(pos: RegionPos, pass: usize) -> Tile {
    Tile {
        colors: vec![(pos.x as u32) << 16 | pass as u32; 4],
    }
}

/// Renders instantly and counts passes.
pub struct CountingSource {
    pub regions: Vec<RegionPos>,
    pub renders: AtomicUsize,
}

impl CountingSource {
    pub fn new(regions: Vec<RegionPos>) -> Self {
        CountingSource {
            regions,
            renders: AtomicUsize::new(0),
        }
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl TileSource for CountingSource {
    fn regions(&self) -> Vec<RegionPos> {
        self.regions.clone()
    }

    fn render(&self, pos: RegionPos) -> Result<Tile> {
        let pass = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(tile_for(pos, pass))
    }
}

/// Each pass blocks until the test releases it through the gate.
pub struct GatedSource {
    pub regions: Vec<RegionPos>,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
    gate: Mutex<Receiver<()>>,
}

impl GatedSource {
    pub fn new(regions: Vec<RegionPos>) -> (Self, Sender<()>) {
        let (tx, rx) = channel();
        let source = GatedSource {
            regions,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            gate: Mutex::new(rx),
        };
        (source, tx)
    }
}

impl TileSource for GatedSource {
    fn regions(&self) -> Vec<RegionPos> {
        self.regions.clone()
    }

    fn render(&self, pos: RegionPos) -> Result<Tile> {
        let pass = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let released = self.gate.lock().unwrap().recv();
        released.map_err(|_| CartographError::RenderError("gate closed".to_owned()))?;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(tile_for(pos, pass))
    }
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn wait_for<F: FnMut() -> bool>(mut condition: F) {
    within(async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
}

pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

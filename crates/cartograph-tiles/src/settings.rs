use serde::Deserialize;
use std::time::Duration;

/// Scheduler knobs for the tile cache.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub worker_count: usize,
    /// Whether idle rasters are dropped at all. One-shot exports turn this
    /// off so nothing rendered is lost before it is read.
    pub evict: bool,
    /// How often the eviction sweep runs.
    pub eviction_interval_secs: u64,
    /// Rasters not accessed for this long are dropped.
    pub eviction_age_secs: u64,
    /// Failed render passes allowed before a region is left alone until
    /// invalidated.
    pub max_render_attempts: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            worker_count: 4,
            evict: true,
            eviction_interval_secs: 10,
            eviction_age_secs: 30,
            max_render_attempts: 3,
        }
    }
}

impl CacheSettings {
    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    pub fn eviction_age(&self) -> Duration {
        Duration::from_secs(self.eviction_age_secs)
    }
}

use cartograph_common::{BoundingRect, CartographError, Result};
use cartograph_logger::LogSeverity;
use cartograph_render::RenderSettings;
use cartograph_tiles::CacheSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cartograph.json";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// World directory, region directory, or a single region file.
    pub world: PathBuf,
    /// Where tiles and the report are written.
    pub output: PathBuf,
    pub log_level: LogSeverity,
    /// Region coordinates to render, min inclusive and max exclusive.
    pub region_limit: Option<BoundingRect>,
    pub render: RenderSettings,
    pub cache: CacheSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            world: PathBuf::from("world"),
            output: PathBuf::from("tiles"),
            log_level: LogSeverity::Info,
            region_limit: None,
            render: RenderSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn parse(text: &str) -> Result<Self> {
        let config: ViewerConfig =
            serde_json::from_str(text).map_err(|e| CartographError::ConfigError(e.to_string()))?;
        config.render.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CartographError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        ViewerConfig::parse(&text)
    }

    pub fn region_limit(&self) -> BoundingRect {
        self.region_limit.unwrap_or(BoundingRect::INFINITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ViewerConfig::parse("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.region_limit(), BoundingRect::INFINITE);
    }

    #[test]
    fn test_full_config() {
        let config = ViewerConfig::parse(
            r#"{
                "world": "/srv/worlds/survival",
                "output": "/tmp/tiles",
                "log_level": "debug",
                "region_limit": { "min_x": -2, "min_z": -2, "max_x": 2, "max_z": 2 },
                "render": { "max_height": 100, "color_map": "colors.txt" },
                "cache": { "worker_count": 8 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.world, PathBuf::from("/srv/worlds/survival"));
        assert_eq!(config.log_level, LogSeverity::Debug);
        assert_eq!(config.region_limit(), BoundingRect::new(-2, -2, 2, 2));
        assert_eq!(config.render.max_height, 100);
        assert_eq!(config.render.color_map, Some(PathBuf::from("colors.txt")));
        assert_eq!(config.cache.worker_count, 8);
        assert_eq!(config.cache.max_render_attempts, 3);
    }

    #[test]
    fn test_bad_config() {
        assert_matches!(
            ViewerConfig::parse(r#"{"log_level": "loud"}"#),
            Err(CartographError::ConfigError(_))
        );
        assert_matches!(
            ViewerConfig::parse(r#"{"render": {"min_palette_bits": 64}}"#),
            Err(CartographError::ConfigError(_))
        );
        assert_matches!(
            ViewerConfig::load(Path::new("/nonexistent/cartograph.json")),
            Err(CartographError::ConfigError(_))
        );
    }
}

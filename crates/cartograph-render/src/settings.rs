use crate::palette::{DEFAULT_MIN_BITS, MAX_BITS};
use cartograph_common::{CartographError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Rendering knobs. Every field has a default so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Block color table; the embedded one when unset.
    pub color_map: Option<PathBuf>,
    /// Biome tint table; the embedded one when unset.
    pub biome_map: Option<PathBuf>,
    /// Lowest Y composited, inclusive.
    pub min_height: i32,
    /// Highest Y composited, exclusive.
    pub max_height: i32,
    pub shading_reference_altitude: i32,
    pub altitude_shading_factor: i32,
    pub min_altitude_shading: i32,
    pub max_altitude_shading: i32,
    /// Composited alpha (0-255) at which a column's surface height is taken.
    pub shade_opacity_cutoff: u8,
    /// Multiplier from shade units to channel steps.
    pub shading_scale: i32,
    pub min_palette_bits: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            color_map: None,
            biome_map: None,
            min_height: i32::MIN,
            max_height: i32::MAX,
            shading_reference_altitude: 64,
            altitude_shading_factor: 36,
            min_altitude_shading: -20,
            max_altitude_shading: 20,
            shade_opacity_cutoff: 0x20,
            shading_scale: 8,
            min_palette_bits: DEFAULT_MIN_BITS,
        }
    }
}

impl RenderSettings {
    /// Rejects values the decoder cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BITS).contains(&self.min_palette_bits) {
            return Err(CartographError::ConfigError(format!(
                "min_palette_bits must be between 1 and {}, got {}",
                MAX_BITS, self.min_palette_bits
            )));
        }
        Ok(())
    }

    /// Whether block `y` is composited.
    #[inline]
    pub fn in_range(&self, y: i32) -> bool {
        y >= self.min_height && y < self.max_height
    }

    /// Whether the whole 16-block section starting at `base_y` is composited.
    #[inline]
    pub fn section_in_range(&self, base_y: i32) -> bool {
        self.min_height <= base_y && self.max_height >= base_y + 16
    }

    /// Whether any block of the section starting at `base_y` is composited.
    #[inline]
    pub fn section_touches_range(&self, base_y: i32) -> bool {
        base_y < self.max_height && base_y + 16 > self.min_height
    }
}

//! Relief shading of a finished tile from its height buffer.

use crate::color;
use crate::compositor::{TileBuffer, TILE_SIZE};
use crate::settings::RenderSettings;

const MAX_GRADIENT: i32 = 10;

/// Height slope at (x, z): doubled centered differences inside the tile,
/// one-sided differences on its border, clamped to ±10.
pub fn gradient(heights: &[i16], x: usize, z: usize) -> i32 {
    let h = |x: usize, z: usize| heights[TileBuffer::index(x, z)] as i32;
    let last = TILE_SIZE - 1;

    let dyx = match x {
        0 => h(1, z) - h(0, z),
        x if x == last => h(x, z) - h(x - 1, z),
        x => (h(x + 1, z) - h(x - 1, z)) * 2,
    };
    let dyz = match z {
        0 => h(x, 1) - h(x, 0),
        z if z == last => h(x, z) - h(x, z - 1),
        z => (h(x, z + 1) - h(x, z - 1)) * 2,
    };
    (dyx + dyz).clamp(-MAX_GRADIENT, MAX_GRADIENT)
}

/// Brightening or darkening by distance from the reference altitude.
pub fn altitude_bias(height: i32, settings: &RenderSettings) -> i32 {
    let bias = settings.altitude_shading_factor * (height - settings.shading_reference_altitude) / 255;
    bias.clamp(settings.min_altitude_shading, settings.max_altitude_shading)
}

/// Shades every visible pixel of a demultiplied tile in place.
pub fn shade_tile(tile: &mut TileBuffer, settings: &RenderSettings) {
    for z in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            let idx = TileBuffer::index(x, z);
            let c = tile.colors[idx];
            if color::alpha(c) == 0 {
                continue;
            }
            let shade = gradient(&tile.heights, x, z) + altitude_bias(tile.heights[idx] as i32, settings);
            tile.colors[idx] = color::shade(c, shade * settings.shading_scale);
        }
    }
}

//! Packed `0xAARRGGBB` color arithmetic.
//!
//! Colors are plain `u32`s. Whether a value holds straight or premultiplied
//! alpha is a property of where it lives: table entries are straight, the
//! compositor's accumulators are premultiplied, finished tiles are straight.

pub const TRANSPARENT: u32 = 0;

#[inline]
pub fn alpha(color: u32) -> u32 {
    color >> 24
}

#[inline]
pub fn red(color: u32) -> u32 {
    (color >> 16) & 0xFF
}

#[inline]
pub fn green(color: u32) -> u32 {
    (color >> 8) & 0xFF
}

#[inline]
pub fn blue(color: u32) -> u32 {
    color & 0xFF
}

#[inline]
pub fn argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    (a.min(255) << 24) | (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

fn map_rgb(color: u32, f: impl Fn(u32) -> u32) -> u32 {
    argb(alpha(color), f(red(color)), f(green(color)), f(blue(color)))
}

/// Scales RGB by alpha, rounding to nearest.
pub fn premultiply(color: u32) -> u32 {
    let a = alpha(color);
    map_rgb(color, |c| (c * a + 127) / 255)
}

/// Inverse of [`premultiply`]. Fully transparent input becomes 0.
pub fn demultiply(color: u32) -> u32 {
    let a = alpha(color);
    if a == 0 {
        return TRANSPARENT;
    }
    map_rgb(color, |c| ((c * 255 + a / 2) / a).min(255))
}

/// Composites a straight-alpha `front` over a premultiplied `back`,
/// producing a premultiplied result.
pub fn overlay(back: u32, front: u32) -> u32 {
    let fa = alpha(front);
    let inv = 255 - fa;
    let mix = |f: u32, b: u32| (fa * f + inv * b + 127) / 255;
    argb(
        (fa * 255 + inv * alpha(back) + 127) / 255,
        mix(red(front), red(back)),
        mix(green(front), green(back)),
        mix(blue(front), blue(back)),
    )
}

/// Applies [`overlay`] `times` times, e.g. a run of identical voxels.
pub fn overlay_repeated(back: u32, front: u32, times: usize) -> u32 {
    (0..times).fold(back, |acc, _| overlay(acc, front))
}

/// Per-channel RGB product with a tint; alpha comes from `color`.
pub fn multiply_solid(color: u32, tint: u32) -> u32 {
    argb(
        alpha(color),
        (red(color) * red(tint) + 127) / 255,
        (green(color) * green(tint) + 127) / 255,
        (blue(color) * blue(tint) + 127) / 255,
    )
}

/// Adds `amount` to each RGB channel, clamping to [0, 255].
pub fn shade(color: u32, amount: i32) -> u32 {
    let adjust = |c: u32| (c as i32 + amount).clamp(0, 255) as u32;
    argb(
        alpha(color),
        adjust(red(color)),
        adjust(green(color)),
        adjust(blue(color)),
    )
}

/// Straight-alpha color as `[r, g, b, a]` bytes.
pub fn to_rgba(color: u32) -> [u8; 4] {
    [
        red(color) as u8,
        green(color) as u8,
        blue(color) as u8,
        alpha(color) as u8,
    ]
}

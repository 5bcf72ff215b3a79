//! Red-mean weighted color distance.
//!
//! ```text
//! red_avg = (r1 + r2) / 2
//! d = (2 + red_avg/256)·Δr² + 4·Δg² + (2 + (255 - red_avg)/256)·Δb²
//! ```
//!
//! Green carries the largest fixed weight; the red and blue weights slide
//! against each other with the mean red level. Lookup tables built by
//! different palettes are only interchangeable if this is evaluated
//! exactly as written, in `f32` with integer channel deltas.

use super::Rgb;

const INV_256: f32 = 1.0 / 256.0;

/// Squared weighted distance between a query color and a palette candidate.
#[inline]
pub fn weighted_distance(query: Rgb, candidate: Rgb) -> f32 {
    let red_avg = (query.r as f32 + candidate.r as f32) * 0.5;
    let dr = query.r as i32 - candidate.r as i32;
    let dg = query.g as i32 - candidate.g as i32;
    let db = query.b as i32 - candidate.b as i32;
    let weight_red = 2.0 + red_avg * INV_256;
    let weight_green = 4.0;
    let weight_blue = 2.0 + (255.0 - red_avg) * INV_256;
    weight_red * (dr * dr) as f32 + weight_green * (dg * dg) as f32 + weight_blue * (db * db) as f32
}

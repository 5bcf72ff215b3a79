//! Packed colors, the quantized color cube, and the weighted RGB distance.
//!
//! Every color crossing the crate boundary is a packed `0xAARRGGBB` `u32`.
//! Channel math happens on [`Rgb`], and palette matching uses
//! [`weighted_distance`], a red-mean weighted Euclidean metric.

mod distance;
mod rgb;

pub use distance::weighted_distance;
pub use rgb::{alpha, clamp_channel, lut_index, Rgb, CUBE_SIDE, LUT_SIZE, TRANSPARENT};

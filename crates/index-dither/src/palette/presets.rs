//! Built-in palettes.
//!
//! Palettes are expensive to build (a full 128³ table pass) and immutable
//! afterwards, so presets are built lazily once and shared by `Arc`.

use std::sync::{Arc, OnceLock};

use super::Palette;
use crate::color::TRANSPARENT;

/// Eight saturated map-style colors. Every entry is matchable: red is index 0.
pub const EIGHT_BIT_COLORS: [u32; 8] = [
    0xFFFF_0000, // red
    0xFF00_D93A, // green
    0xFF37_37DC, // blue
    0xFFFF_FFFF, // white
    0xFF00_0000, // black
    0xFFE5_E533, // yellow
    0xFF5C_DBD5, // cyan
    0xFFB2_4CD8, // purple
];

const CUBE_LEVELS: [u8; 6] = [0, 51, 102, 153, 204, 255];

/// Number of entries in [`default_colors`].
pub const DEFAULT_COLOR_COUNT: usize = 1 + 6 * 6 * 6 + 24;

/// The default 241-entry palette: the transparent slot, a 6×6×6 color cube,
/// and a 24-step grey ramp (`8, 18, .., 238`).
pub fn default_colors() -> Vec<u32> {
    let mut colors = Vec::with_capacity(DEFAULT_COLOR_COUNT);
    colors.push(TRANSPARENT);
    for &r in &CUBE_LEVELS {
        for &g in &CUBE_LEVELS {
            for &b in &CUBE_LEVELS {
                colors.push(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32);
            }
        }
    }
    for step in 0..24u32 {
        let v = 8 + 10 * step;
        colors.push(0xFF00_0000 | v << 16 | v << 8 | v);
    }
    colors
}

/// Shared default palette (transparent slot reserved).
pub fn default_palette() -> Arc<Palette> {
    static DEFAULT: OnceLock<Arc<Palette>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(Palette::from_validated(default_colors(), true, None)))
        .clone()
}

/// Shared eight-color palette (no reserved slot).
pub fn eight_bit_palette() -> Arc<Palette> {
    static EIGHT_BIT: OnceLock<Arc<Palette>> = OnceLock::new();
    EIGHT_BIT
        .get_or_init(|| Arc::new(Palette::from_validated(EIGHT_BIT_COLORS.to_vec(), false, None)))
        .clone()
}

/// Look up a preset by name (`default`, `eight-bit`).
pub fn preset(name: &str) -> Option<Arc<Palette>> {
    match name {
        "default" => Some(default_palette()),
        "eight-bit" | "8bit" => Some(eight_bit_palette()),
        _ => None,
    }
}

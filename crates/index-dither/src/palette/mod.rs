//! Palette types, lookup tables and presets.

mod error;
mod lut;
mod palette;
mod presets;

pub use error::{PaletteError, ParseColorError};
pub use palette::{Palette, PaletteBuilder, MAX_COLORS};
pub use presets::{
    default_colors, default_palette, eight_bit_palette, preset, DEFAULT_COLOR_COUNT,
    EIGHT_BIT_COLORS,
};

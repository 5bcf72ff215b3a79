#![allow(clippy::module_inception, clippy::manual_range_contains)]

//! index-dither: palette quantization and dithering for packed-color frames
//!
//! Converts `0xAARRGGBB` frames into one palette index per pixel, at video
//! rates, for targets that can only show a small fixed palette.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use index_dither::{Algorithm, DitherBuilder, Palette};
//!
//! let palette = Arc::new(Palette::opaque(&[0xFF00_0000, 0xFFFF_FFFF]).unwrap());
//! let dither = DitherBuilder::new()
//!     .palette(palette)
//!     .algorithm(Algorithm::FloydSteinberg)
//!     .build()
//!     .unwrap();
//!
//! let frame = vec![0xFF80_8080; 64];
//! let indices = dither.dither_into_bytes(&frame, 8);
//! assert_eq!(indices.len(), 64);
//! ```
//!
//! # Palettes and the lookup table
//!
//! A [`Palette`] holds up to 256 colors. Construction precomputes, in
//! parallel, the nearest entry for every cell of a 128³ cube made of each
//! channel's top 7 bits, so matching a pixel at dither time is one table
//! read. Nearness is the red-mean weighted distance of
//! [`color::weighted_distance`]; ties go to the lower index.
//!
//! Slot 0 is reserved for transparency unless the palette is built with
//! [`Palette::opaque`]. A reserved slot never wins a nearest-color search;
//! only [`Palette::best_index_including_transparent`] returns it, for pixels
//! with alpha 0.
//!
//! # Algorithms
//!
//! | Family | Variants | Parallel |
//! |--------|----------|----------|
//! | Nearest | direct snap | yes |
//! | Ordered | Bayer 2–16, clustered-dot, diagonal, line and spiral screens | yes |
//! | Random | seeded xoroshiro128+ noise | yes |
//! | Error diffusion | Floyd-Steinberg, Atkinson, Burkes, Stucki, Jarvis-Judice-Ninke, Stevenson-Arce, Filter Lite | no |
//! | Temporal diffusion | Floyd-Steinberg with previous-frame index reuse | strips |
//!
//! Parallel-capable algorithms expose [`ParallelDither`] through
//! [`DitherAlgorithm::as_parallel`] and produce the same bytes whichever path
//! is used. Temporal diffusion keeps the previous frame's indices and splits
//! into overlapping strips under [`DitherAlgorithm::dither_into_bytes_pooled`];
//! call [`DitherAlgorithm::reset`] on a scene cut.

pub mod api;
pub mod color;
pub mod dither;
pub mod output;
pub mod palette;


pub use api::{DitherBuilder, DitherError};
pub use color::Rgb;
pub use dither::{
    Algorithm, DitherAlgorithm, ErrorDiffusionDither, Kernel, NearestDither, OrderedDither,
    ParallelDither, RandomDither, TemporalDither, ThresholdMatrix, Xoroshiro128Plus,
};
pub use output::IndexedImage;
pub use palette::{Palette, PaletteBuilder, PaletteError, ParseColorError};

//! Dithering algorithms: palette-index conversion of packed-color frames.
//!
//! Four families share one interface:
//!
//! - **Nearest**: direct lookup-table snap, no dithering
//! - **Ordered**: positional threshold-matrix perturbation
//! - **Random**: seeded per-channel noise
//! - **Error diffusion**: quantization error pushed onto unvisited
//!   neighbours through a [`Kernel`]
//!
//! [`TemporalDither`] is a Floyd-Steinberg variant that reuses the previous
//! frame's index where the color barely moved. It is the one algorithm with
//! state between calls; [`DitherAlgorithm::reset`] clears it.
//!
//! The first three treat every pixel independently and also implement
//! [`ParallelDither`], splitting the frame into horizontal bands on a rayon
//! pool. Error diffusion depends on scan order and runs on the calling
//! thread, except temporal diffusion, which can split into overlapping
//! strips.
//!
//! # Frame shape
//!
//! Frames are row-major `0xAARRGGBB` slices of any length. A trailing
//! partial row (when `len % width != 0`) is snapped by nearest match, and
//! `width == 0` yields an empty result.

mod error_diffusion;
mod kernel;
mod matrix;
mod nearest;
mod ordered;
mod random;
mod temporal;
mod xoroshiro;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;

pub use error_diffusion::{ErrorBuffer, ErrorDiffusionDither};
pub use kernel::*;
pub use matrix::{ThresholdMatrix, MAX_BAYER_SIZE};
pub use nearest::NearestDither;
pub use ordered::{OrderedDither, MAX_STRENGTH, MIN_STRENGTH, NORMAL_STRENGTH};
pub use random::{RandomDither, HEAVY_WEIGHT, LIGHT_WEIGHT, NORMAL_WEIGHT};
pub use temporal::{
    TemporalDither, DEFAULT_ERROR_STRENGTH, DEFAULT_ERROR_THRESHOLD, DEFAULT_TEMPORAL_THRESHOLD,
};
pub use xoroshiro::{fmix64, Xoroshiro128Plus};

use crate::api::DitherError;
use crate::palette::Palette;

/// Dither algorithm selection.
///
/// Names are kebab-case for configuration files and the command line:
///
/// ```
/// use index_dither::Algorithm;
///
/// let algorithm: Algorithm = "stevenson-arce".parse().unwrap();
/// assert_eq!(algorithm, Algorithm::StevensonArce);
/// assert_eq!(algorithm.to_string(), "stevenson-arce");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Lookup-table snap of each pixel. Fastest; bands on flat gradients.
    Nearest,
    /// Threshold-matrix dithering. Stable between frames, no error bleed.
    Ordered,
    /// Seeded noise before the snap. Grainy, uncorrelated between frames.
    Random,
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Atkinson error diffusion (75% propagation).
    Atkinson,
    /// Burkes error diffusion.
    Burkes,
    /// Stucki error diffusion.
    Stucki,
    /// Jarvis-Judice-Ninke error diffusion.
    JarvisJudiceNinke,
    /// Stevenson-Arce error diffusion (four-row hexagonal kernel).
    StevensonArce,
    /// Sierra Lite error diffusion.
    FilterLite,
    /// Floyd-Steinberg that keeps last frame's index for near-unchanged pixels.
    TemporalFloydSteinberg,
}

impl Algorithm {
    pub const ALL: [Algorithm; 11] = [
        Algorithm::Nearest,
        Algorithm::Ordered,
        Algorithm::Random,
        Algorithm::FloydSteinberg,
        Algorithm::Atkinson,
        Algorithm::Burkes,
        Algorithm::Stucki,
        Algorithm::JarvisJudiceNinke,
        Algorithm::StevensonArce,
        Algorithm::FilterLite,
        Algorithm::TemporalFloydSteinberg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Nearest => "nearest",
            Algorithm::Ordered => "ordered",
            Algorithm::Random => "random",
            Algorithm::FloydSteinberg => "floyd-steinberg",
            Algorithm::Atkinson => "atkinson",
            Algorithm::Burkes => "burkes",
            Algorithm::Stucki => "stucki",
            Algorithm::JarvisJudiceNinke => "jarvis-judice-ninke",
            Algorithm::StevensonArce => "stevenson-arce",
            Algorithm::FilterLite => "filter-lite",
            Algorithm::TemporalFloydSteinberg => "temporal-floyd-steinberg",
        }
    }

    /// Diffusion kernel, for error diffusion variants.
    pub fn kernel(self) -> Option<&'static Kernel> {
        match self {
            Algorithm::FloydSteinberg | Algorithm::TemporalFloydSteinberg => Some(&FLOYD_STEINBERG),
            Algorithm::Atkinson => Some(&ATKINSON),
            Algorithm::Burkes => Some(&BURKES),
            Algorithm::Stucki => Some(&STUCKI),
            Algorithm::JarvisJudiceNinke => Some(&JARVIS_JUDICE_NINKE),
            Algorithm::StevensonArce => Some(&STEVENSON_ARCE),
            Algorithm::FilterLite => Some(&FILTER_LITE),
            Algorithm::Nearest | Algorithm::Ordered | Algorithm::Random => None,
        }
    }

    #[inline]
    pub fn is_error_diffusion(self) -> bool {
        self.kernel().is_some()
    }

    /// Carries state from one frame to the next.
    #[inline]
    pub fn is_temporal(self) -> bool {
        self == Algorithm::TemporalFloydSteinberg
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DitherError;

    /// Case-insensitive; `_` and `-` are interchangeable. `sierra-lite` and
    /// `jjn` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "sierra-lite" => return Ok(Algorithm::FilterLite),
            "jjn" => return Ok(Algorithm::JarvisJudiceNinke),
            _ => {}
        }
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| DitherError::UnknownAlgorithm(s.to_string()))
    }
}

/// A configured dithering algorithm bound to one shared palette.
///
/// Instances are safe to share between threads. All but the temporal
/// variant are immutable after construction.
pub trait DitherAlgorithm: Send + Sync {
    /// Which algorithm this is.
    fn algorithm(&self) -> Algorithm;

    /// The palette every output index refers to.
    fn palette(&self) -> &Arc<Palette>;

    /// Convert a frame to one palette index per pixel, in input order.
    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8>;

    /// Replace each pixel with its palette-snapped color, in place.
    fn dither(&self, buffer: &mut [u32], width: usize) {
        let indices = self.dither_into_bytes(buffer, width);
        let palette = self.palette();
        for (pixel, &index) in buffer.iter_mut().zip(&indices) {
            *pixel = palette.color(index);
        }
    }

    /// The band-parallel form of this algorithm, if it has one.
    fn as_parallel(&self) -> Option<&dyn ParallelDither> {
        None
    }

    /// Dither using `pool` where the algorithm can split the frame, and on
    /// the calling thread otherwise.
    fn dither_into_bytes_pooled(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        match self.as_parallel() {
            Some(parallel) => parallel.dither_into_bytes_parallel(pixels, width, pool),
            None => self.dither_into_bytes(pixels, width),
        }
    }

    /// Drop any state carried between frames. A no-op for stateless
    /// algorithms.
    fn reset(&self) {}
}

/// Algorithms whose output for a pixel does not depend on other pixels.
///
/// Parallel output is identical to [`DitherAlgorithm::dither_into_bytes`]
/// for the same input.
pub trait ParallelDither: DitherAlgorithm {
    fn dither_into_bytes_parallel(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8>;
}

impl fmt::Debug for dyn DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DitherAlgorithm")
            .field("algorithm", &self.algorithm())
            .field("palette", &self.palette().len())
            .finish()
    }
}

// ============================================================================
// Row-band driver for per-pixel algorithms
// ============================================================================

/// Maps one row to palette indices. `row` may be shorter than the frame
/// width for the trailing partial row.
pub(crate) trait RowMapper: Sync {
    fn map_row(&self, y: usize, row: &[u32], out: &mut [u8]);
}

/// Bands handed to each pool thread, so uneven rows still balance.
const BANDS_PER_THREAD: usize = 4;

pub(crate) fn map_rows<M: RowMapper + ?Sized>(mapper: &M, pixels: &[u32], width: usize) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let mut out = vec![0u8; pixels.len()];
    for (y, (row, out_row)) in pixels.chunks(width).zip(out.chunks_mut(width)).enumerate() {
        mapper.map_row(y, row, out_row);
    }
    out
}

pub(crate) fn map_rows_parallel<M: RowMapper + ?Sized>(
    mapper: &M,
    pixels: &[u32],
    width: usize,
    pool: &ThreadPool,
) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let mut out = vec![0u8; pixels.len()];
    let rows = pixels.len().div_ceil(width);
    let bands = pool.current_num_threads().max(1) * BANDS_PER_THREAD;
    let band_rows = rows.div_ceil(bands).max(1);
    let band_len = band_rows * width;
    pool.install(|| {
        out.par_chunks_mut(band_len)
            .zip(pixels.par_chunks(band_len))
            .enumerate()
            .for_each(|(band, (out_band, in_band))| {
                let first_row = band * band_rows;
                for (i, (row, out_row)) in in_band.chunks(width).zip(out_band.chunks_mut(width)).enumerate() {
                    mapper.map_row(first_row + i, row, out_row);
                }
            });
    });
    out
}

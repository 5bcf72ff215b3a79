//! Random-noise dithering.
//!
//! Each channel gets uniform integer noise in `[-weight, weight]` before the
//! snap. Noise comes from one xoroshiro128+ stream per row, keyed by the
//! instance seed, a per-call frame counter and the row index, so a frame's
//! output depends only on the seed and how many frames came before it, never
//! on how rows were spread across threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rayon::ThreadPool;

use super::{fmix64, map_rows, map_rows_parallel, Algorithm, DitherAlgorithm, ParallelDither, RowMapper, Xoroshiro128Plus};
use crate::color::Rgb;
use crate::palette::Palette;

pub const LIGHT_WEIGHT: u8 = 32;
pub const NORMAL_WEIGHT: u8 = 64;
pub const HEAVY_WEIGHT: u8 = 128;

/// Seeded noise ditherer.
#[derive(Debug)]
pub struct RandomDither {
    palette: Arc<Palette>,
    weight: i32,
    seed: u64,
    frame: AtomicU64,
}

impl RandomDither {
    pub fn new(palette: Arc<Palette>, weight: u8, seed: u64) -> Self {
        Self {
            palette,
            weight: weight as i32,
            seed,
            frame: AtomicU64::new(0),
        }
    }

    pub fn weight(&self) -> u8 {
        self.weight as u8
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn next_frame(&self) -> FrameNoise<'_> {
        FrameNoise {
            dither: self,
            frame: self.frame.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// Row mapper for one frame.
struct FrameNoise<'a> {
    dither: &'a RandomDither,
    frame: u64,
}

impl FrameNoise<'_> {
    fn row_rng(&self, y: usize) -> Xoroshiro128Plus {
        let key = fmix64(self.dither.seed ^ fmix64(self.frame)).wrapping_add(y as u64);
        Xoroshiro128Plus::seed_from_u64(key)
    }
}

impl RowMapper for FrameNoise<'_> {
    fn map_row(&self, y: usize, row: &[u32], out: &mut [u8]) {
        let w = self.dither.weight;
        let palette = &self.dither.palette;
        let mut rng = self.row_rng(y);
        for (o, &pixel) in out.iter_mut().zip(row) {
            let c = Rgb::from_packed(pixel);
            let r = c.r as i32 + rng.gen_range(-w..=w);
            let g = c.g as i32 + rng.gen_range(-w..=w);
            let b = c.b as i32 + rng.gen_range(-w..=w);
            *o = palette.best_index_clamped(r, g, b);
        }
    }
}

impl DitherAlgorithm for RandomDither {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Random
    }

    fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8> {
        map_rows(&self.next_frame(), pixels, width)
    }

    fn as_parallel(&self) -> Option<&dyn ParallelDither> {
        Some(self)
    }
}

impl ParallelDither for RandomDither {
    fn dither_into_bytes_parallel(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        map_rows_parallel(&self.next_frame(), pixels, width, pool)
    }
}

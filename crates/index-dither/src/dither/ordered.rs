//! Ordered (threshold-matrix) dithering.
//!
//! Each pixel is offset on all three channels by
//! `threshold(x, y) * step * strength` before the lookup-table snap, where
//! `step = 255 / (levels - 1)` and `levels` is the mean number of distinct
//! values a palette channel takes. The offset table is computed once per
//! instance.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::ThreadPool;

use super::{map_rows, map_rows_parallel, Algorithm, DitherAlgorithm, ParallelDither, RowMapper, ThresholdMatrix};
use crate::color::Rgb;
use crate::palette::Palette;

pub const MIN_STRENGTH: f32 = 0.0;
pub const NORMAL_STRENGTH: f32 = 1.0;
pub const MAX_STRENGTH: f32 = 2.0;

/// Threshold-matrix ditherer.
#[derive(Debug, Clone)]
pub struct OrderedDither {
    palette: Arc<Palette>,
    matrix: ThresholdMatrix,
    strength: f32,
    offsets: Vec<i32>,
}

impl OrderedDither {
    /// `strength` is clamped to `MIN_STRENGTH..=MAX_STRENGTH`.
    pub fn new(palette: Arc<Palette>, matrix: ThresholdMatrix, strength: f32) -> Self {
        let strength = strength.clamp(MIN_STRENGTH, MAX_STRENGTH);
        let step = 255.0 / (channel_levels(&palette) - 1.0);
        let offsets = (0..matrix.height())
            .flat_map(|y| (0..matrix.width()).map(move |x| (x, y)))
            .map(|(x, y)| (matrix.threshold(x, y) * step * strength).round() as i32)
            .collect();
        Self {
            palette,
            matrix,
            strength,
            offsets,
        }
    }

    pub fn matrix(&self) -> &ThresholdMatrix {
        &self.matrix
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> i32 {
        let w = self.matrix.width();
        self.offsets[(y % self.matrix.height()) * w + x % w]
    }
}

/// Mean count of distinct channel values across the matchable entries, at least 2.
fn channel_levels(palette: &Palette) -> f32 {
    let skip = usize::from(palette.reserves_transparent());
    let mut reds = BTreeSet::new();
    let mut greens = BTreeSet::new();
    let mut blues = BTreeSet::new();
    for &color in palette.colors().iter().skip(skip) {
        let c = Rgb::from_packed(color);
        reds.insert(c.r);
        greens.insert(c.g);
        blues.insert(c.b);
    }
    let mean = (reds.len() + greens.len() + blues.len()) as f32 / 3.0;
    mean.max(2.0)
}

impl RowMapper for OrderedDither {
    fn map_row(&self, y: usize, row: &[u32], out: &mut [u8]) {
        for (x, (o, &pixel)) in out.iter_mut().zip(row).enumerate() {
            let c = Rgb::from_packed(pixel);
            let d = self.offset(x, y);
            *o = self
                .palette
                .best_index_clamped(c.r as i32 + d, c.g as i32 + d, c.b as i32 + d);
        }
    }
}

impl DitherAlgorithm for OrderedDither {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ordered
    }

    fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8> {
        map_rows(self, pixels, width)
    }

    fn as_parallel(&self) -> Option<&dyn ParallelDither> {
        Some(self)
    }
}

impl ParallelDither for OrderedDither {
    fn dither_into_bytes_parallel(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        map_rows_parallel(self, pixels, width, pool)
    }
}

//! Direct nearest-color snapping.

use std::sync::Arc;

use rayon::ThreadPool;

use super::{map_rows, map_rows_parallel, Algorithm, DitherAlgorithm, ParallelDither, RowMapper};
use crate::color::Rgb;
use crate::palette::Palette;

/// Snaps every pixel through the palette's lookup table. No dithering.
#[derive(Debug, Clone)]
pub struct NearestDither {
    palette: Arc<Palette>,
}

impl NearestDither {
    pub fn new(palette: Arc<Palette>) -> Self {
        Self { palette }
    }
}

impl RowMapper for NearestDither {
    fn map_row(&self, _y: usize, row: &[u32], out: &mut [u8]) {
        for (o, &pixel) in out.iter_mut().zip(row) {
            *o = self.palette.best_index_packed(pixel);
        }
    }
}

impl DitherAlgorithm for NearestDither {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Nearest
    }

    fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8> {
        map_rows(self, pixels, width)
    }

    fn dither(&self, buffer: &mut [u32], width: usize) {
        if width == 0 {
            return;
        }
        for pixel in buffer.iter_mut() {
            let c = Rgb::from_packed(*pixel);
            *pixel = self.palette.best_color(c.r, c.g, c.b);
        }
    }

    fn as_parallel(&self) -> Option<&dyn ParallelDither> {
        Some(self)
    }
}

impl ParallelDither for NearestDither {
    fn dither_into_bytes_parallel(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        map_rows_parallel(self, pixels, width, pool)
    }
}

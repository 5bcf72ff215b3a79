//! Kernel-driven error diffusion.
//!
//! Pixels are visited in scan order (serpentine by default). For each one the
//! accumulated error is added, channels are clamped to `0..=255`, the result
//! is snapped through the lookup table, and the difference between the
//! clamped and the snapped color is spread over the kernel's neighbours.
//! Output depends on every earlier pixel, so this always runs on one thread.

use std::sync::Arc;

use super::{Algorithm, DitherAlgorithm, Kernel};
use crate::color::{clamp_channel, Rgb};
use crate::palette::Palette;

/// Sliding window of per-channel error rows.
///
/// Holds only the rows a kernel can reach (`max_dy + 1`), not the whole
/// frame. `rows[0]` is the row being scanned.
#[derive(Debug)]
pub struct ErrorBuffer {
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth.max(1)).map(|_| vec![[0.0; 3]; width]).collect(),
            width,
        }
    }

    /// Error accumulated so far for column `x` of the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    /// Add error to `(x, current_row + row_offset)`. Out-of-range targets are ignored.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: [f32; 3]) {
        if x < self.width && row_offset < self.rows.len() {
            let cell = &mut self.rows[row_offset][x];
            for (acc, e) in cell.iter_mut().zip(error) {
                *acc += e;
            }
        }
    }

    /// Drop the current row and append a cleared one.
    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

/// Error diffusion ditherer for any [`Kernel`].
#[derive(Debug, Clone)]
pub struct ErrorDiffusionDither {
    palette: Arc<Palette>,
    algorithm: Algorithm,
    kernel: &'static Kernel,
    serpentine: bool,
}

impl ErrorDiffusionDither {
    /// Returns `None` when `algorithm` has no diffusion kernel or needs
    /// per-frame state (see [`TemporalDither`](super::TemporalDither)).
    pub fn new(palette: Arc<Palette>, algorithm: Algorithm, serpentine: bool) -> Option<Self> {
        if algorithm.is_temporal() {
            return None;
        }
        let kernel = algorithm.kernel()?;
        Some(Self {
            palette,
            algorithm,
            kernel,
            serpentine,
        })
    }

    pub fn kernel(&self) -> &'static Kernel {
        self.kernel
    }

    pub fn serpentine(&self) -> bool {
        self.serpentine
    }
}

impl DitherAlgorithm for ErrorDiffusionDither {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8> {
        if width == 0 {
            return Vec::new();
        }
        let height = pixels.len() / width;
        let mut output = vec![0u8; pixels.len()];
        diffuse(
            &pixels[..width * height],
            width,
            height,
            &self.palette,
            self.kernel,
            self.serpentine,
            &mut output[..width * height],
        );
        for (o, &pixel) in output[width * height..].iter_mut().zip(&pixels[width * height..]) {
            *o = self.palette.best_index_packed(pixel);
        }
        output
    }
}

fn diffuse(
    pixels: &[u32],
    width: usize,
    height: usize,
    palette: &Palette,
    kernel: &Kernel,
    serpentine: bool,
    output: &mut [u8],
) {
    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        let reverse = serpentine && y % 2 == 1;
        for step in 0..width {
            let x = if reverse { width - 1 - step } else { step };
            let idx = y * width + x;

            let source = Rgb::from_packed(pixels[idx]);
            let acc = error_buf.get_accumulated(x);
            let wanted = [
                clamp_channel((source.r as f32 + acc[0]).round() as i32),
                clamp_channel((source.g as f32 + acc[1]).round() as i32),
                clamp_channel((source.b as f32 + acc[2]).round() as i32),
            ];

            let index = palette.best_index(wanted[0], wanted[1], wanted[2]);
            output[idx] = index;

            let snapped = Rgb::from_packed(palette.color(index));
            let error = [
                wanted[0] as f32 - snapped.r as f32,
                wanted[1] as f32 - snapped.g as f32,
                wanted[2] as f32 - snapped.b as f32,
            ];

            for &(dx, dy, weight) in kernel.entries {
                let dx = if reverse { -dx } else { dx };
                let nx = x as i64 + dx as i64;
                if nx < 0 || nx as usize >= width || y + dy as usize >= height {
                    continue;
                }
                let share = weight as f32 / divisor;
                error_buf.add_error(
                    nx as usize,
                    dy as usize,
                    [error[0] * share, error[1] * share, error[2] * share],
                );
            }
        }
        error_buf.advance_row();
    }
}

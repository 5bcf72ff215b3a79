//! Floyd-Steinberg diffusion with frame-to-frame index reuse.
//!
//! Each pixel first checks what its index was on the previous frame. If the
//! error-adjusted source is within `temporal_threshold` of that entry's color
//! on every channel, the old index is kept and only the residual is
//! diffused. Otherwise the pixel is snapped normally. Static areas of a video
//! therefore stop flickering between neighbouring palette entries.
//!
//! This is the only algorithm that keeps state between calls. The previous
//! frame's indices sit behind a mutex and are replaced after every frame;
//! [`TemporalDither::reset`] drops them, for scene cuts or size changes.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use rayon::ThreadPool;

use super::{Algorithm, DitherAlgorithm, Kernel, FLOYD_STEINBERG};
use crate::color::Rgb;
use crate::palette::Palette;

pub const DEFAULT_TEMPORAL_THRESHOLD: u32 = 8;
pub const DEFAULT_ERROR_THRESHOLD: u32 = 4;
pub const DEFAULT_ERROR_STRENGTH: f32 = 1.0;

/// Rows a strip dithers above its first output row to seed its error buffer.
const WARMUP_ROWS: usize = 4;

/// Temporal Floyd-Steinberg ditherer.
#[derive(Debug)]
pub struct TemporalDither {
    palette: Arc<Palette>,
    serpentine: bool,
    temporal_threshold: i32,
    error_threshold: i32,
    /// Error strength in 1/256 steps.
    strength_256: i32,
    previous: Mutex<Option<Arc<[u8]>>>,
}

impl TemporalDither {
    /// `error_strength` is clamped to `0.0..=1.0`.
    pub fn new(
        palette: Arc<Palette>,
        serpentine: bool,
        temporal_threshold: u32,
        error_threshold: u32,
        error_strength: f32,
    ) -> Self {
        Self {
            palette,
            serpentine,
            temporal_threshold: temporal_threshold.min(255) as i32,
            error_threshold: error_threshold.min(765) as i32,
            strength_256: (error_strength.clamp(0.0, 1.0) * 256.0).round() as i32,
            previous: Mutex::new(None),
        }
    }

    pub fn temporal_threshold(&self) -> u32 {
        self.temporal_threshold as u32
    }

    pub fn error_threshold(&self) -> u32 {
        self.error_threshold as u32
    }

    pub fn error_strength(&self) -> f32 {
        self.strength_256 as f32 / 256.0
    }

    /// Whether a previous frame is held.
    pub fn has_history(&self) -> bool {
        self.previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Forget the previous frame. The next frame is dithered from scratch.
    pub fn reset(&self) {
        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Previous indices, if they were taken from a frame of the same length.
    fn snapshot(&self, len: usize) -> Option<Arc<[u8]>> {
        let previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
        previous.as_ref().filter(|p| p.len() == len).cloned()
    }

    fn remember(&self, output: &[u8]) {
        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(output));
    }

    /// Dither in horizontal strips on `pool`.
    ///
    /// Every strip starts its error buffer a few rows early, so seams stay
    /// close to, but are not bit-identical with, the sequential result.
    pub fn dither_into_bytes_strips(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        if width == 0 {
            return Vec::new();
        }
        let height = pixels.len() / width;
        let previous = self.snapshot(pixels.len());
        let mut output = vec![0u8; pixels.len()];
        let strips = pool.current_num_threads().max(1);
        let strip_rows = height.div_ceil(strips).max(1);
        let ctx = StripContext {
            pixels,
            width,
            height,
            previous: previous.as_deref(),
            dither: self,
        };
        pool.install(|| {
            output[..width * height]
                .par_chunks_mut(strip_rows * width)
                .enumerate()
                .for_each(|(strip, out)| {
                    let start = strip * strip_rows;
                    ctx.process(start, (start + strip_rows).min(height), out);
                });
        });
        self.finish_partial_row(pixels, width, height, &mut output);
        self.remember(&output);
        output
    }

    fn finish_partial_row(&self, pixels: &[u32], width: usize, height: usize, output: &mut [u8]) {
        for (o, &pixel) in output[width * height..].iter_mut().zip(&pixels[width * height..]) {
            *o = self.palette.best_index_packed(pixel);
        }
    }

    #[inline]
    fn scale(&self, delta: i32) -> i32 {
        (delta * self.strength_256) >> 8
    }
}

impl DitherAlgorithm for TemporalDither {
    fn algorithm(&self) -> Algorithm {
        Algorithm::TemporalFloydSteinberg
    }

    fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn dither_into_bytes(&self, pixels: &[u32], width: usize) -> Vec<u8> {
        if width == 0 {
            return Vec::new();
        }
        let height = pixels.len() / width;
        let previous = self.snapshot(pixels.len());
        let mut output = vec![0u8; pixels.len()];
        let ctx = StripContext {
            pixels,
            width,
            height,
            previous: previous.as_deref(),
            dither: self,
        };
        ctx.process(0, height, &mut output[..width * height]);
        self.finish_partial_row(pixels, width, height, &mut output);
        self.remember(&output);
        output
    }

    fn dither_into_bytes_pooled(&self, pixels: &[u32], width: usize, pool: &ThreadPool) -> Vec<u8> {
        self.dither_into_bytes_strips(pixels, width, pool)
    }

    fn reset(&self) {
        TemporalDither::reset(self);
    }
}

/// One frame's read-only inputs, shared by every strip.
struct StripContext<'a> {
    pixels: &'a [u32],
    width: usize,
    height: usize,
    previous: Option<&'a [u8]>,
    dither: &'a TemporalDither,
}

impl StripContext<'_> {
    /// Dither rows `start..end` into `out`, which holds exactly those rows.
    fn process(&self, start: usize, end: usize, out: &mut [u8]) {
        let kernel: &Kernel = &FLOYD_STEINBERG;
        let width = self.width;
        let palette = &self.dither.palette;
        let mut errors: Vec<Vec<[i32; 3]>> = (0..=kernel.max_dy).map(|_| vec![[0; 3]; width]).collect();

        for y in start.saturating_sub(WARMUP_ROWS)..end {
            let write = y >= start;
            let reverse = self.dither.serpentine && y % 2 == 1;
            for step in 0..width {
                let x = if reverse { width - 1 - step } else { step };
                let idx = y * width + x;
                let source = Rgb::from_packed(self.pixels[idx]);
                let acc = errors[0][x];
                let wanted = [
                    (source.r as i32 + acc[0]).clamp(0, 255),
                    (source.g as i32 + acc[1]).clamp(0, 255),
                    (source.b as i32 + acc[2]).clamp(0, 255),
                ];

                if let Some(previous) = self.previous {
                    let kept = previous[idx];
                    let old = Rgb::from_packed(palette.color(kept));
                    let residual = [
                        wanted[0] - old.r as i32,
                        wanted[1] - old.g as i32,
                        wanted[2] - old.b as i32,
                    ];
                    if residual.iter().all(|d| d.abs() <= self.dither.temporal_threshold) {
                        if write {
                            out[(y - start) * width + x] = kept;
                        }
                        if residual.iter().map(|d| d.abs()).sum::<i32>() > self.dither.error_threshold {
                            spread(kernel, &mut errors, x, y, width, self.height, reverse, residual);
                        }
                        continue;
                    }
                }

                let index = palette.best_index(wanted[0] as u8, wanted[1] as u8, wanted[2] as u8);
                if write {
                    out[(y - start) * width + x] = index;
                }
                let snapped = Rgb::from_packed(palette.color(index));
                let error = [
                    wanted[0] - snapped.r as i32,
                    wanted[1] - snapped.g as i32,
                    wanted[2] - snapped.b as i32,
                ];
                if error.iter().map(|d| d.abs()).sum::<i32>() > self.dither.error_threshold {
                    let scaled = error.map(|d| self.dither.scale(d));
                    spread(kernel, &mut errors, x, y, width, self.height, reverse, scaled);
                }
            }
            errors.rotate_left(1);
            if let Some(last) = errors.last_mut() {
                last.fill([0; 3]);
            }
        }
    }
}

/// Integer share of `error` to each kernel neighbour, rounding toward
/// negative infinity.
#[allow(clippy::too_many_arguments)]
fn spread(
    kernel: &Kernel,
    errors: &mut [Vec<[i32; 3]>],
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    reverse: bool,
    error: [i32; 3],
) {
    let divisor = kernel.divisor as i32;
    for &(dx, dy, weight) in kernel.entries {
        let dx = if reverse { -dx } else { dx };
        let nx = x as i64 + dx as i64;
        if nx < 0 || nx as usize >= width || y + dy as usize >= height {
            continue;
        }
        let cell = &mut errors[dy as usize][nx as usize];
        for (acc, e) in cell.iter_mut().zip(error) {
            *acc += (e * weight as i32).div_euclid(divisor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greys() -> Arc<Palette> {
        Arc::new(Palette::opaque(&[0xFF00_0000, 0xFF55_5555, 0xFFAA_AAAA, 0xFFFF_FFFF]).unwrap())
    }

    fn temporal() -> TemporalDither {
        TemporalDither::new(
            greys(),
            true,
            DEFAULT_TEMPORAL_THRESHOLD,
            DEFAULT_ERROR_THRESHOLD,
            DEFAULT_ERROR_STRENGTH,
        )
    }

    fn scene() -> Vec<u32> {
        (0..24 * 16u32).map(|i| 0xFF00_0000 | ((i * 7) % 256) * 0x0001_0101).collect()
    }

    #[test]
    fn test_static_scene_is_stable_after_first_frame() {
        let dither = temporal();
        let pixels = scene();
        let _first = dither.dither_into_bytes(&pixels, 24);
        let second = dither.dither_into_bytes(&pixels, 24);
        let third = dither.dither_into_bytes(&pixels, 24);
        assert_eq!(second, third);
    }

    #[test]
    fn test_reset_clears_history() {
        let dither = temporal();
        assert!(!dither.has_history());
        let first = dither.dither_into_bytes(&scene(), 24);
        assert!(dither.has_history());

        dither.reset();
        assert!(!dither.has_history());
        // With no history the next frame matches a fresh instance.
        assert_eq!(dither.dither_into_bytes(&scene(), 24), first);
    }

    #[test]
    fn test_reset_through_trait_object() {
        let dither: Arc<dyn DitherAlgorithm> = Arc::new(temporal());
        dither.dither_into_bytes(&scene(), 24);
        dither.reset();
        assert_eq!(dither.dither_into_bytes(&scene(), 24), temporal().dither_into_bytes(&scene(), 24));
    }

    #[test]
    fn test_close_color_keeps_previous_index() {
        // Diffusion off, so every pixel is decided on its own.
        let dither = TemporalDither::new(greys(), true, 50, 765, 1.0);
        assert_eq!(dither.dither_into_bytes(&[0xFF7D_7D7D; 16], 4), vec![1; 16]);
        // 130 is nearer 170, but still within 50 of last frame's 85.
        assert_eq!(dither.dither_into_bytes(&[0xFF82_8282; 16], 4), vec![1; 16]);

        let fresh = TemporalDither::new(greys(), true, 50, 765, 1.0);
        assert_eq!(fresh.dither_into_bytes(&[0xFF82_8282; 16], 4), vec![2; 16]);
    }

    #[test]
    fn test_large_change_redithers() {
        let dither = temporal();
        dither.dither_into_bytes(&vec![0xFF00_0000; 16], 4);
        let out = dither.dither_into_bytes(&vec![0xFFFF_FFFF; 16], 4);
        assert!(out.iter().all(|&i| i == 3));
    }

    #[test]
    fn test_length_change_ignores_history() {
        let dither = temporal();
        dither.dither_into_bytes(&vec![0xFF00_0000; 16], 4);
        let out = dither.dither_into_bytes(&vec![0xFFFF_FFFF; 20], 4);
        assert_eq!(out, vec![3; 20]);
    }

    #[test]
    fn test_parameters_are_clamped() {
        let dither = TemporalDither::new(greys(), true, 1000, 5000, 3.0);
        assert_eq!(dither.temporal_threshold(), 255);
        assert_eq!(dither.error_threshold(), 765);
        assert_eq!(dither.error_strength(), 1.0);
        assert_eq!(TemporalDither::new(greys(), true, 0, 0, -1.0).error_strength(), 0.0);
    }

    #[test]
    fn test_strips_cover_frame_and_record_history() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let dither = temporal();
        let pixels: Vec<u32> = scene().into_iter().chain([0xFFFF_FFFF; 5]).collect();
        let out = dither.dither_into_bytes_strips(&pixels, 24, &pool);
        assert_eq!(out.len(), pixels.len());
        assert!(out.iter().all(|&i| (i as usize) < 4));
        assert_eq!(&out[out.len() - 5..], &[3; 5]);
        assert!(dither.has_history());
    }

    #[test]
    fn test_single_strip_matches_sequential() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let (a, b) = (temporal(), temporal());
        let pixels = scene();
        for _ in 0..3 {
            assert_eq!(a.dither_into_bytes(&pixels, 24), b.dither_into_bytes_strips(&pixels, 24, &pool));
        }
    }

    #[test]
    fn test_zero_error_strength_is_nearest_on_first_frame() {
        let dither = TemporalDither::new(greys(), true, 8, 0, 0.0);
        let pixels = scene();
        let out = dither.dither_into_bytes(&pixels, 24);
        let nearest: Vec<u8> = pixels.iter().map(|&p| greys().best_index_packed(p)).collect();
        assert_eq!(out, nearest);
    }
}

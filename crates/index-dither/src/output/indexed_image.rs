//! Palette-indexed frame with on-demand color expansion.

use std::sync::Arc;

use crate::color::{alpha, Rgb};
use crate::dither::DitherAlgorithm;
use crate::palette::Palette;

/// Dithered output: one palette index per pixel, row-major.
#[derive(Debug, Clone)]
pub struct IndexedImage {
    indices: Vec<u8>,
    width: usize,
    height: usize,
    palette: Arc<Palette>,
}

impl IndexedImage {
    /// # Panics
    ///
    /// Debug builds assert `indices.len() == width * height`.
    pub fn new(indices: Vec<u8>, width: usize, height: usize, palette: Arc<Palette>) -> Self {
        debug_assert_eq!(
            indices.len(),
            width * height,
            "indices length ({}) must match {}x{}",
            indices.len(),
            width,
            height,
        );
        Self {
            indices,
            width,
            height,
            palette,
        }
    }

    /// Dither a `width`-wide frame. A trailing partial row is dropped so the
    /// image stays rectangular.
    pub fn dither(algorithm: &dyn DitherAlgorithm, pixels: &[u32], width: usize) -> Self {
        let height = pixels.len().checked_div(width).unwrap_or(0);
        let mut indices = algorithm.dither_into_bytes(&pixels[..width * height], width);
        indices.truncate(width * height);
        Self::new(indices, width, height, algorithm.palette().clone())
    }

    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Packed `0xAARRGGBB` colors.
    pub fn to_packed(&self) -> Vec<u32> {
        self.indices.iter().map(|&i| self.palette.color(i)).collect()
    }

    /// Interleaved RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.indices.len() * 3);
        for &index in &self.indices {
            let c = Rgb::from_packed(self.palette.color(index));
            rgb.extend_from_slice(&[c.r, c.g, c.b]);
        }
        rgb
    }

    /// Interleaved RGBA bytes; the transparent slot gets alpha 0.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.indices.len() * 4);
        for &index in &self.indices {
            let packed = self.palette.color(index);
            let c = Rgb::from_packed(packed);
            rgba.extend_from_slice(&[c.r, c.g, c.b, alpha(packed)]);
        }
        rgba
    }
}

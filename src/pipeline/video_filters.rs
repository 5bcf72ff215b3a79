//! Pixel-level video filters for use ahead of a [`DitherFilter`](super::DitherFilter).

use super::filter::Filter;
use crate::models::{Frame, VideoMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Mirror left to right.
    Horizontal,
    /// Mirror top to bottom.
    Vertical,
    Both,
}

#[derive(Debug, Clone, Copy)]
pub struct FlipFilter {
    direction: FlipDirection,
}

impl FlipFilter {
    pub fn new(direction: FlipDirection) -> Self {
        Self { direction }
    }
}

impl Filter<Frame, VideoMetadata> for FlipFilter {
    fn apply(&self, frame: &mut Frame, _metadata: &VideoMetadata) {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 {
            return;
        }
        let pixels = frame.pixels_mut();
        if matches!(self.direction, FlipDirection::Horizontal | FlipDirection::Both) {
            pixels.chunks_exact_mut(width).for_each(<[u32]>::reverse);
        }
        if matches!(self.direction, FlipDirection::Vertical | FlipDirection::Both) {
            for y in 0..height / 2 {
                let (top, bottom) = pixels.split_at_mut((height - 1 - y) * width);
                top[y * width..(y + 1) * width].swap_with_slice(&mut bottom[..width]);
            }
        }
    }
}

/// Per-channel binary threshold: channels above `threshold` become
/// `max_value`, the rest become zero. Alpha is kept.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    threshold: u8,
    max_value: u8,
    inverted: bool,
}

impl ThresholdFilter {
    pub fn new(threshold: u8, max_value: u8) -> Self {
        Self {
            threshold,
            max_value,
            inverted: false,
        }
    }

    /// Swap which side of the threshold gets `max_value`.
    pub fn inverted(mut self) -> Self {
        self.inverted = !self.inverted;
        self
    }

    #[inline]
    fn channel(&self, value: u32) -> u32 {
        if (value > self.threshold as u32) != self.inverted {
            self.max_value as u32
        } else {
            0
        }
    }
}

impl Filter<Frame, VideoMetadata> for ThresholdFilter {
    fn apply(&self, frame: &mut Frame, _metadata: &VideoMetadata) {
        for pixel in frame.pixels_mut() {
            let p = *pixel;
            *pixel = (p & 0xFF00_0000)
                | self.channel((p >> 16) & 0xFF) << 16
                | self.channel((p >> 8) & 0xFF) << 8
                | self.channel(p & 0xFF);
        }
    }
}

/// Weighted blend with a fixed overlay frame of the same size.
///
/// `alpha` is the weight of the incoming frame. Frames whose size differs
/// from the overlay pass through unchanged.
#[derive(Debug, Clone)]
pub struct BlendFilter {
    overlay: Frame,
    alpha: f32,
}

impl BlendFilter {
    pub fn new(overlay: Frame, alpha: f32) -> Self {
        Self {
            overlay,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

impl Filter<Frame, VideoMetadata> for BlendFilter {
    fn apply(&self, frame: &mut Frame, _metadata: &VideoMetadata) {
        if frame.width() != self.overlay.width() || frame.height() != self.overlay.height() {
            return;
        }
        let alpha = self.alpha;
        let mix = |a: u32, b: u32, shift: u32| -> u32 {
            let a = ((a >> shift) & 0xFF) as f32;
            let b = ((b >> shift) & 0xFF) as f32;
            ((a * alpha + b * (1.0 - alpha)).round() as u32).min(255) << shift
        };
        for (pixel, &other) in frame.pixels_mut().iter_mut().zip(self.overlay.pixels()) {
            let p = *pixel;
            *pixel = (p & 0xFF00_0000) | mix(p, other, 16) | mix(p, other, 8) | mix(p, other, 0);
        }
    }
}

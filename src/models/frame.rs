use crate::error::FrameError;

/// Raw audio samples carried through an audio pipeline.
pub type AudioChunk = Vec<u8>;

/// A decoded video frame: row-major `0xAARRGGBB` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Frame {
    /// Wrap a pixel buffer, rejecting one whose length disagrees with the size.
    pub fn new(pixels: Vec<u32>, width: usize, height: usize) -> Result<Self, FrameError> {
        let expected = width
            .checked_mul(height)
            .ok_or(FrameError::DimensionsOverflow { width, height })?;
        if pixels.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// All-zero frame, as emitted by an exhausted repeating source.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    /// Pack tightly interleaved RGB bytes into opaque pixels.
    pub fn from_rgb_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| 0xFF00_0000 | (c[0] as u32) << 16 | (c[1] as u32) << 8 | c[2] as u32)
            .collect();
        Self::new(pixels, width, height)
    }

    pub fn from_rgba_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| (c[3] as u32) << 24 | (c[0] as u32) << 16 | (c[1] as u32) << 8 | c[2] as u32)
            .collect();
        Self::new(pixels, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        assert!(Frame::new(vec![0; 6], 3, 2).is_ok());
        assert_eq!(
            Frame::new(vec![0; 5], 3, 2),
            Err(FrameError::LengthMismatch {
                width: 3,
                height: 2,
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_new_rejects_overflowing_dimensions() {
        assert_eq!(
            Frame::new(Vec::new(), usize::MAX, 2),
            Err(FrameError::DimensionsOverflow {
                width: usize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn test_blank() {
        let frame = Frame::blank(4, 3);
        assert_eq!(frame.pixels().len(), 12);
        assert!(frame.is_blank());
    }

    #[test]
    fn test_from_rgb_bytes() {
        let frame = Frame::from_rgb_bytes(&[255, 0, 0, 0, 128, 255], 2, 1).unwrap();
        assert_eq!(frame.pixels(), &[0xFFFF_0000, 0xFF00_80FF]);
    }

    #[test]
    fn test_from_rgba_bytes_keeps_alpha() {
        let frame = Frame::from_rgba_bytes(&[1, 2, 3, 0, 4, 5, 6, 255], 2, 1).unwrap();
        assert_eq!(frame.pixels(), &[0x0001_0203, 0xFF04_0506]);
    }

    #[test]
    fn test_from_rgb_bytes_short_buffer() {
        assert!(Frame::from_rgb_bytes(&[0; 5], 2, 1).is_err());
    }
}

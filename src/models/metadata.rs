use std::time::Duration;

/// Per-frame description handed to every video filter alongside the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoMetadata {
    pub width: usize,
    pub height: usize,
    pub frame_rate: Option<f32>,
    pub bitrate: Option<u32>,
}

impl VideoMetadata {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Time between frames at the declared rate, if any.
    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_rate
            .filter(|fps| *fps > 0.0 && fps.is_finite())
            .map(|fps| Duration::from_micros((1_000_000.0 / fps as f64).round() as u64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioMetadata {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioMetadata {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let meta = VideoMetadata::new(64, 48).with_frame_rate(25.0).with_bitrate(1_000);
        assert_eq!(meta.pixel_count(), 3072);
        assert_eq!(meta.frame_rate, Some(25.0));
        assert_eq!(meta.bitrate, Some(1_000));
        assert_eq!(meta.frame_interval(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_no_interval_without_rate() {
        assert_eq!(VideoMetadata::new(1, 1).frame_interval(), None);
        assert_eq!(VideoMetadata::new(1, 1).with_frame_rate(0.0).frame_interval(), None);
    }
}

use std::time::Duration;

use super::frame_source::{interval_for, FrameSource};
use crate::error::{FrameError, SourceError};
use crate::models::Frame;

/// How many times a [`RepeatingFrameSource`] plays its frame list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    Times(u32),
    Forever,
}

/// Cycles through a fixed list of pre-rendered frames at their own rate.
///
/// Once a finite repeat count is used up the source keeps producing blank
/// frames of the same size instead of ending the stream.
#[derive(Debug, Clone)]
pub struct RepeatingFrameSource {
    frames: Vec<Vec<u32>>,
    width: usize,
    height: usize,
    frame_rate: f32,
    interval: Duration,
    repeat: RepeatCount,
    position: usize,
    cycles: u32,
}

impl RepeatingFrameSource {
    pub fn new(frames: Vec<Frame>, frame_rate: f32, repeat: RepeatCount) -> Result<Self, SourceError> {
        let interval = interval_for(frame_rate).ok_or(SourceError::InvalidFrameRate(frame_rate))?;
        let first = frames.first().ok_or(SourceError::NoFrames)?;
        let (width, height) = (first.width(), first.height());

        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width() != width || f.height() != height)
        {
            return Err(SourceError::BadFrame {
                index,
                source: FrameError::SizeMismatch {
                    width: frame.width(),
                    height: frame.height(),
                    expected_width: width,
                    expected_height: height,
                },
            });
        }

        Ok(Self {
            frames: frames.into_iter().map(Frame::into_pixels).collect(),
            width,
            height,
            frame_rate,
            interval,
            repeat,
            position: 0,
            cycles: 0,
        })
    }

    /// True once every repeat has been played.
    pub fn is_exhausted(&self) -> bool {
        match self.repeat {
            RepeatCount::Times(n) => self.cycles >= n,
            RepeatCount::Forever => false,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for RepeatingFrameSource {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn next_frame(&mut self) -> Option<Vec<u32>> {
        if self.is_exhausted() {
            return Some(vec![0; self.width * self.height]);
        }
        let frame = self.frames[self.position].clone();
        self.position += 1;
        if self.position == self.frames.len() {
            self.position = 0;
            self.cycles = self.cycles.saturating_add(1);
        }
        Some(frame)
    }

    fn frame_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn frame_rate(&self) -> Option<f32> {
        Some(self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: u32) -> Vec<Frame> {
        (1..=n).map(|i| Frame::new(vec![i; 4], 2, 2).unwrap()).collect()
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            RepeatingFrameSource::new(Vec::new(), 10.0, RepeatCount::Forever).unwrap_err(),
            SourceError::NoFrames
        );
        assert_eq!(
            RepeatingFrameSource::new(frames(1), 0.0, RepeatCount::Forever).unwrap_err(),
            SourceError::InvalidFrameRate(0.0)
        );

        let mut mixed = frames(2);
        mixed.push(Frame::blank(4, 1));
        assert!(matches!(
            RepeatingFrameSource::new(mixed, 10.0, RepeatCount::Forever),
            Err(SourceError::BadFrame { index: 2, .. })
        ));
    }

    #[test]
    fn test_interval_from_rate() {
        let source = RepeatingFrameSource::new(frames(1), 25.0, RepeatCount::Forever).unwrap();
        assert_eq!(source.frame_interval(), Some(Duration::from_millis(40)));
        assert_eq!(source.frame_rate(), Some(25.0));
    }

    #[test]
    fn test_forever_never_exhausts() {
        let mut source = RepeatingFrameSource::new(frames(2), 10.0, RepeatCount::Forever).unwrap();
        for _ in 0..10 {
            source.next_frame();
        }
        assert!(!source.is_exhausted());
        assert_eq!(source.next_frame(), Some(vec![1; 4]));
    }

    #[test]
    fn test_zero_repeats_is_blank() {
        let mut source = RepeatingFrameSource::new(frames(2), 10.0, RepeatCount::Times(0)).unwrap();
        assert_eq!(source.next_frame(), Some(vec![0; 4]));
    }
}

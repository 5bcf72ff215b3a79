//! Test fixtures: frames, palettes and recording filters.

use std::sync::{Arc, Mutex};

use dithercast::models::{Frame, VideoMetadata};
use dithercast::services::PlayerOptions;
use index_dither::Palette;
use std::time::Duration;

/// Flat frame filled with one value.
pub fn flat_frame(value: u32, width: usize, height: usize) -> Frame {
    Frame::new(vec![value; width * height], width, height).expect("flat frame")
}

/// Grey ramp running left to right.
pub fn ramp_frame(width: usize, height: usize) -> Frame {
    let pixels = (0..width * height)
        .map(|i| {
            let v = ((i % width) * 255 / width.max(1)) as u32;
            0xFF00_0000 | v << 16 | v << 8 | v
        })
        .collect();
    Frame::new(pixels, width, height).expect("ramp frame")
}

pub fn black_white() -> Arc<Palette> {
    Arc::new(Palette::opaque(&[0xFF00_0000, 0xFFFF_FFFF]).expect("palette"))
}

/// Player options with short waits for tests.
pub fn quick_options() -> PlayerOptions {
    PlayerOptions {
        empty_frame_wait: Duration::from_millis(2),
        shutdown_grace: Duration::from_secs(2),
        thread_name: "player-it".to_string(),
    }
}

/// Shared log of everything a recording filter has seen.
pub type Recorded<T> = Arc<Mutex<Vec<T>>>;

/// A filter closure that records every frame's pixels.
pub fn recording_filter() -> (
    impl Fn(&mut Frame, &VideoMetadata) + Send + Sync + 'static,
    Recorded<Vec<u32>>,
) {
    let seen: Recorded<Vec<u32>> = Arc::new(Mutex::new(Vec::new()));
    let filter = {
        let seen = Arc::clone(&seen);
        move |frame: &mut Frame, _: &VideoMetadata| seen.lock().unwrap().push(frame.pixels().to_vec())
    };
    (filter, seen)
}

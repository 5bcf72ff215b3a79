//! Tests for the frame player and the frame sources it pulls from.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{flat_frame, quick_options, recording_filter, wait_until};
use dithercast::error::PlayerError;
use dithercast::models::{Frame, VideoMetadata};
use dithercast::pipeline::PipelineBuilder;
use dithercast::services::{
    FramePanic, FramePlayer, FrameSource, PlayerOptions, RepeatCount, RepeatingFrameSource,
    SupplierSource,
};
use pretty_assertions::assert_eq;

const TIMEOUT: Duration = Duration::from_secs(5);

fn three_frames() -> Vec<Frame> {
    vec![flat_frame(10, 3, 2), flat_frame(20, 3, 2), flat_frame(30, 3, 2)]
}

#[test]
fn test_repeating_source_exhausts_to_blank_frames() {
    let mut source = RepeatingFrameSource::new(three_frames(), 20.0, RepeatCount::Times(2)).unwrap();

    let produced: Vec<Vec<u32>> = (0..10).map(|_| source.next_frame().unwrap()).collect();

    let expected_cycle = [10, 20, 30, 10, 20, 30];
    for (frame, value) in produced.iter().zip(expected_cycle) {
        assert_eq!(*frame, vec![value; 6]);
    }
    for frame in &produced[6..] {
        assert_eq!(*frame, vec![0; 6]);
    }
    assert!(source.is_exhausted());
    assert_eq!(source.frame_interval(), Some(Duration::from_millis(50)));
}

#[test]
fn test_player_delivers_repeats_then_blanks() {
    let source = RepeatingFrameSource::new(three_frames(), 500.0, RepeatCount::Times(2)).unwrap();
    let (recorder, seen) = recording_filter();

    let player = FramePlayer::new(quick_options());
    player.video_callback().attach(PipelineBuilder::video().then(recorder).build());
    assert!(player.start(source).unwrap());

    assert!(wait_until(TIMEOUT, || seen.lock().unwrap().len() >= 9));
    player.release();

    let seen = seen.lock().unwrap();
    let firsts: Vec<u32> = seen.iter().take(6).map(|f| f[0]).collect();
    assert_eq!(firsts, vec![10, 20, 30, 10, 20, 30]);
    assert!(seen[6..].iter().all(|f| *f == vec![0; 6]));
    assert!(player.stats().frames_processed >= 9);
}

#[test]
fn test_frames_arrive_in_source_order() {
    let counter = Arc::new(AtomicU32::new(0));
    let source = {
        let counter = Arc::clone(&counter);
        SupplierSource::new(1, 1, move || Some(vec![counter.fetch_add(1, Ordering::Relaxed) + 1]))
    };
    let (recorder, seen) = recording_filter();

    let player = FramePlayer::new(quick_options());
    player.video_callback().attach(PipelineBuilder::video().then(recorder).build());
    player.start(source).unwrap();
    assert!(wait_until(TIMEOUT, || seen.lock().unwrap().len() >= 50));
    player.release();

    let values: Vec<u32> = seen.lock().unwrap().iter().map(|f| f[0]).collect();
    let expected: Vec<u32> = (1..=values.len() as u32).collect();
    assert_eq!(values, expected);
}

#[test]
fn test_malformed_frames_are_skipped() {
    let calls = Arc::new(AtomicU32::new(0));
    let source = {
        let calls = Arc::clone(&calls);
        SupplierSource::new(2, 2, move || {
            let n = calls.fetch_add(1, Ordering::Relaxed);
            if n % 2 == 0 {
                Some(vec![7; 3])
            } else {
                Some(vec![9; 4])
            }
        })
    };
    let (recorder, seen) = recording_filter();

    let player = FramePlayer::new(quick_options());
    player.video_callback().attach(PipelineBuilder::video().then(recorder).build());
    player.start(source).unwrap();
    assert!(wait_until(TIMEOUT, || player.stats().frames_rejected >= 3
        && player.stats().frames_processed >= 3));
    player.release();

    assert!(seen.lock().unwrap().iter().all(|f| *f == vec![9; 4]));
}

#[test]
fn test_malformed_frames_back_off_like_empty_polls() {
    let calls = Arc::new(AtomicU32::new(0));
    let source = {
        let calls = Arc::clone(&calls);
        SupplierSource::new(2, 2, move || {
            calls.fetch_add(1, Ordering::Relaxed);
            Some(vec![1; 3])
        })
    };

    let player = FramePlayer::new(PlayerOptions::default());
    player.start(source).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    player.release();

    // 50 ms between requests allows about five in 200 ms.
    let requests = calls.load(Ordering::Relaxed);
    assert!(requests >= 1, "source was never polled");
    assert!(requests < 20, "{requests} requests in 200 ms");
    assert_eq!(player.stats().frames_rejected, requests as u64);
    assert_eq!(player.stats().frames_processed, 0);
}

#[test]
fn test_empty_source_is_polled_without_processing() {
    let player = FramePlayer::new(quick_options());
    let (recorder, seen) = recording_filter();
    player.video_callback().attach(PipelineBuilder::video().then(recorder).build());
    player.start(SupplierSource::new(4, 4, || Some(Vec::new()))).unwrap();

    assert!(wait_until(TIMEOUT, || player.stats().empty_polls >= 3));
    player.release();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(player.stats().frames_processed, 0);
}

#[test]
fn test_filter_panic_goes_to_handler_and_playback_continues() {
    let panics: Arc<Mutex<Vec<FramePanic>>> = Arc::new(Mutex::new(Vec::new()));
    let player = {
        let panics = Arc::clone(&panics);
        FramePlayer::new(quick_options())
            .with_exception_handler(move |panic: &FramePanic| panics.lock().unwrap().push(panic.clone()))
    };

    let chain = PipelineBuilder::video()
        .then(|frame: &mut Frame, _: &VideoMetadata| {
            if frame.pixels()[0] == 2 {
                panic!("bad pixel");
            }
        })
        .build();
    player.video_callback().attach(chain);

    let counter = Arc::new(AtomicU32::new(0));
    let source = {
        let counter = Arc::clone(&counter);
        SupplierSource::new(1, 1, move || Some(vec![counter.fetch_add(1, Ordering::Relaxed) + 1]))
    };
    player.start(source).unwrap();
    assert!(wait_until(TIMEOUT, || player.stats().frames_processed >= 5));
    player.release();

    let panics = panics.lock().unwrap();
    assert_eq!(panics.len(), 1);
    assert_eq!(panics[0].frame, 1);
    assert_eq!(panics[0].message, "bad pixel");
    assert_eq!(player.stats().filter_panics, 1);
}

#[test]
fn test_release_is_terminal() {
    let player = FramePlayer::new(quick_options());
    player.start(SupplierSource::new(1, 1, || None)).unwrap();
    assert!(player.is_running());

    player.release();
    assert!(!player.is_running());
    assert!(matches!(
        player.start(SupplierSource::new(1, 1, || None)),
        Err(PlayerError::Released)
    ));
}

#[test]
fn test_chain_can_be_swapped_while_playing() {
    let player = FramePlayer::new(quick_options());
    let (first, first_seen) = recording_filter();
    let (second, second_seen) = recording_filter();
    player.video_callback().attach(PipelineBuilder::video().then(first).build());
    player
        .start(SupplierSource::new(1, 1, || Some(vec![5])).with_frame_rate(1000.0))
        .unwrap();

    assert!(wait_until(TIMEOUT, || !first_seen.lock().unwrap().is_empty()));
    player.video_callback().attach(PipelineBuilder::video().then(second).build());
    assert!(wait_until(TIMEOUT, || !second_seen.lock().unwrap().is_empty()));
    player.release();
}

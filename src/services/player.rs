//! Frame player: pulls frames from a [`FrameSource`] on a dedicated thread
//! and pushes each one through the attached video chain.
//!
//! The worker thread runs a current-thread tokio runtime so every wait
//! (frame pacing, empty-source back-off) can be cut short by `release()`.
//! Frames are processed strictly in source order, one at a time.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;

use super::frame_source::FrameSource;
use crate::error::PlayerError;
use crate::models::{Frame, VideoMetadata};
use crate::pipeline::AttachableCallback;

#[derive(Debug, Clone)]
pub struct PlayerOptions {
    /// Back-off before asking an empty source again.
    pub empty_frame_wait: Duration,
    /// How long `release()` waits for the worker to stop.
    pub shutdown_grace: Duration,
    pub thread_name: String,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            empty_frame_wait: Duration::from_millis(50),
            shutdown_grace: Duration::from_secs(5),
            thread_name: "frame-player".to_string(),
        }
    }
}

/// A filter panic caught while processing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePanic {
    /// Sequence number of the frame among those the player accepted.
    pub frame: u64,
    pub message: String,
}

impl FramePanic {
    fn from_payload(frame: u64, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self { frame, message }
    }
}

impl std::fmt::Display for FramePanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "filter panicked on frame {}: {}", self.frame, self.message)
    }
}

pub type ExceptionHandler = Arc<dyn Fn(&FramePanic) + Send + Sync>;

fn log_panic(panic: &FramePanic) {
    tracing::error!(frame = panic.frame, message = %panic.message, "Filter panicked");
}

/// Snapshot of a player's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStats {
    /// Frames that went through the whole chain.
    pub frames_processed: u64,
    /// Frames dropped because their size did not match the source.
    pub frames_rejected: u64,
    /// Requests that found no frame ready.
    pub empty_polls: u64,
    pub filter_panics: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames_processed: AtomicU64,
    frames_rejected: AtomicU64,
    empty_polls: AtomicU64,
    filter_panics: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PlayerStats {
        PlayerStats {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
            filter_panics: self.filter_panics.load(Ordering::Relaxed),
        }
    }
}

struct Worker {
    shutdown: watch::Sender<bool>,
    done: mpsc::Receiver<()>,
    thread: JoinHandle<()>,
}

#[derive(Default)]
struct State {
    worker: Option<Worker>,
    released: bool,
}

/// Drives frames from a source through an attachable video chain.
///
/// `start` may be called again after the worker has stopped on its own, but
/// never after `release`.
pub struct FramePlayer {
    options: PlayerOptions,
    video: Arc<AttachableCallback<Frame, VideoMetadata>>,
    counters: Arc<Counters>,
    handler: ExceptionHandler,
    state: Mutex<State>,
}

impl FramePlayer {
    pub fn new(options: PlayerOptions) -> Self {
        Self {
            options,
            video: Arc::new(AttachableCallback::new()),
            counters: Arc::new(Counters::default()),
            handler: Arc::new(log_panic),
            state: Mutex::new(State::default()),
        }
    }

    /// Replace the default handler, which logs filter panics.
    pub fn with_exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FramePanic) + Send + Sync + 'static,
    {
        self.handler = Arc::new(handler);
        self
    }

    /// The chain every frame is pushed through. Attach before or while playing.
    pub fn video_callback(&self) -> &Arc<AttachableCallback<Frame, VideoMetadata>> {
        &self.video
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn stats(&self) -> PlayerStats {
        self.counters.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lock_state()
            .worker
            .as_ref()
            .is_some_and(|w| !w.thread.is_finished())
    }

    /// Start pulling from `source`. Returns `Ok(false)` if already running.
    pub fn start<S>(&self, source: S) -> Result<bool, PlayerError>
    where
        S: FrameSource + 'static,
    {
        let mut state = self.lock_state();
        if state.released {
            return Err(PlayerError::Released);
        }
        if state.worker.as_ref().is_some_and(|w| !w.thread.is_finished()) {
            return Ok(false);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = mpsc::channel();
        let context = WorkerContext {
            video: Arc::clone(&self.video),
            counters: Arc::clone(&self.counters),
            handler: Arc::clone(&self.handler),
            empty_frame_wait: self.options.empty_frame_wait,
            shutdown: shutdown_rx,
        };

        let (width, height) = (source.width(), source.height());
        let thread = thread::Builder::new()
            .name(self.options.thread_name.clone())
            .spawn(move || {
                context.run_blocking(Box::new(source));
                let _ = done_tx.send(());
            })?;

        tracing::info!(
            thread = %self.options.thread_name,
            width,
            height,
            "Player started"
        );
        state.worker = Some(Worker {
            shutdown: shutdown_tx,
            done: done_rx,
            thread,
        });
        Ok(true)
    }

    /// Stop the worker and refuse further starts. Safe to call repeatedly.
    ///
    /// A frame already inside the chain finishes first. The worker gets
    /// `shutdown_grace` to exit; past that it is left to finish detached.
    pub fn release(&self) {
        let worker = {
            let mut state = self.lock_state();
            state.released = true;
            state.worker.take()
        };
        let Some(worker) = worker else {
            return;
        };

        worker.shutdown.send_replace(true);
        match worker.done.recv_timeout(self.options.shutdown_grace) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if worker.thread.join().is_err() {
                    tracing::warn!("Player thread panicked during shutdown");
                }
                tracing::info!(stats = ?self.stats(), "Player released");
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    grace_ms = self.options.shutdown_grace.as_millis() as u64,
                    "Player thread did not stop in time, detaching"
                );
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FramePlayer {
    fn default() -> Self {
        Self::new(PlayerOptions::default())
    }
}

impl Drop for FramePlayer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for FramePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePlayer")
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish()
    }
}

struct WorkerContext {
    video: Arc<AttachableCallback<Frame, VideoMetadata>>,
    counters: Arc<Counters>,
    handler: ExceptionHandler,
    empty_frame_wait: Duration,
    shutdown: watch::Receiver<bool>,
}

impl WorkerContext {
    fn run_blocking(self, source: Box<dyn FrameSource>) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(%e, "Failed to build player runtime");
                return;
            }
        };
        runtime.block_on(self.run(source));
    }

    async fn run(mut self, mut source: Box<dyn FrameSource>) {
        let (width, height) = (source.width(), source.height());
        let mut accepted: u64 = 0;
        let mut rejected: u64 = 0;

        while !*self.shutdown.borrow() {
            if let Some(interval) = source.frame_interval() {
                if !self.wait(interval).await {
                    break;
                }
            }

            let pixels = match source.next_frame() {
                Some(pixels) if !pixels.is_empty() => pixels,
                _ => {
                    self.counters.empty_polls.fetch_add(1, Ordering::Relaxed);
                    if !self.wait(self.empty_frame_wait).await {
                        break;
                    }
                    continue;
                }
            };

            let mut frame = match Frame::new(pixels, width, height) {
                Ok(frame) => frame,
                Err(e) => {
                    self.counters.frames_rejected.fetch_add(1, Ordering::Relaxed);
                    rejected += 1;
                    if rejected == 1 {
                        tracing::warn!(%e, "Dropping malformed frame");
                    } else {
                        tracing::debug!(%e, rejected, "Dropping malformed frame");
                    }
                    if !self.wait(self.empty_frame_wait).await {
                        break;
                    }
                    continue;
                }
            };

            let mut metadata = VideoMetadata::new(width, height);
            if let Some(frame_rate) = source.frame_rate() {
                metadata = metadata.with_frame_rate(frame_rate);
            }

            let chain = self.video.retrieve();
            let sequence = accepted;
            accepted += 1;
            match catch_unwind(AssertUnwindSafe(|| chain.run(&mut frame, &metadata))) {
                Ok(()) => {
                    self.counters.frames_processed.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    self.counters.filter_panics.fetch_add(1, Ordering::Relaxed);
                    let panic = FramePanic::from_payload(sequence, payload);
                    (self.handler)(&panic);
                }
            }
        }

        tracing::debug!("Player loop stopped");
    }

    /// Sleep for `duration`. Returns false if shutdown was requested first.
    async fn wait(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.shutdown.changed() => false,
        }
    }
}

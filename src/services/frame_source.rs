use std::time::Duration;

/// Supplies frames to a [`FramePlayer`](super::FramePlayer).
///
/// `next_frame` returns row-major `0xAARRGGBB` pixels of `width * height`
/// entries. `None` or an empty buffer means no frame is ready yet.
pub trait FrameSource: Send {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn next_frame(&mut self) -> Option<Vec<u32>>;

    /// Pacing the player waits out before each request.
    fn frame_interval(&self) -> Option<Duration> {
        None
    }

    fn frame_rate(&self) -> Option<f32> {
        None
    }
}

type Supplier = Box<dyn FnMut() -> Option<Vec<u32>> + Send>;

/// Frame source backed by a closure.
pub struct SupplierSource {
    width: usize,
    height: usize,
    supplier: Supplier,
    frame_rate: Option<f32>,
}

impl SupplierSource {
    pub fn new<F>(width: usize, height: usize, supplier: F) -> Self
    where
        F: FnMut() -> Option<Vec<u32>> + Send + 'static,
    {
        Self {
            width,
            height,
            supplier: Box::new(supplier),
            frame_rate: None,
        }
    }

    /// Declare a rate. The player then paces requests to it.
    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}

impl FrameSource for SupplierSource {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn next_frame(&mut self) -> Option<Vec<u32>> {
        (self.supplier)()
    }

    fn frame_interval(&self) -> Option<Duration> {
        interval_for(self.frame_rate?)
    }

    fn frame_rate(&self) -> Option<f32> {
        self.frame_rate
    }
}

impl std::fmt::Debug for SupplierSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplierSource")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_rate", &self.frame_rate)
            .finish()
    }
}

/// `1000 / fps` milliseconds, or `None` for rates that cannot pace.
pub(crate) fn interval_for(frame_rate: f32) -> Option<Duration> {
    if frame_rate > 0.0 && frame_rate.is_finite() {
        Some(Duration::from_micros((1_000_000.0 / frame_rate as f64).round() as u64))
    } else {
        None
    }
}

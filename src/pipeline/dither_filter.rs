use std::sync::Arc;

use index_dither::DitherAlgorithm;
use rayon::ThreadPool;

use super::filter::Filter;
use crate::models::{Frame, VideoMetadata};

/// Receives the palette indices of each dithered frame.
pub type ResultSink = Arc<dyn Fn(Vec<u8>, &VideoMetadata) + Send + Sync>;

/// Dithers each frame to palette indices and hands them to a sink.
///
/// The frame itself is left unchanged for any filter further down the
/// chain. With a pool, band-parallel algorithms fan out across it and
/// temporal diffusion splits into strips; plain error diffusion always runs
/// on the calling thread.
#[derive(Clone)]
pub struct DitherFilter {
    algorithm: Arc<dyn DitherAlgorithm>,
    sink: ResultSink,
    pool: Option<Arc<ThreadPool>>,
}

impl DitherFilter {
    pub fn new<F>(algorithm: Arc<dyn DitherAlgorithm>, sink: F) -> Self
    where
        F: Fn(Vec<u8>, &VideoMetadata) + Send + Sync + 'static,
    {
        Self {
            algorithm,
            sink: Arc::new(sink),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn algorithm(&self) -> &Arc<dyn DitherAlgorithm> {
        &self.algorithm
    }

    /// Forget frame-to-frame state, e.g. on a scene cut.
    pub fn reset(&self) {
        self.algorithm.reset();
    }

    fn dither_indices(&self, frame: &Frame) -> Vec<u8> {
        match self.pool.as_deref() {
            Some(pool) => self.algorithm.dither_into_bytes_pooled(frame.pixels(), frame.width(), pool),
            None => self.algorithm.dither_into_bytes(frame.pixels(), frame.width()),
        }
    }
}

impl Filter<Frame, VideoMetadata> for DitherFilter {
    fn apply(&self, frame: &mut Frame, metadata: &VideoMetadata) {
        let indices = self.dither_indices(frame);
        (self.sink)(indices, metadata);
    }
}

impl std::fmt::Debug for DitherFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DitherFilter")
            .field("algorithm", &self.algorithm.algorithm())
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

/// Replaces every pixel with its dithered palette color, in place.
#[derive(Debug, Clone)]
pub struct SnapFilter {
    algorithm: Arc<dyn DitherAlgorithm>,
}

impl SnapFilter {
    pub fn new(algorithm: Arc<dyn DitherAlgorithm>) -> Self {
        Self { algorithm }
    }
}

impl Filter<Frame, VideoMetadata> for SnapFilter {
    fn apply(&self, frame: &mut Frame, _metadata: &VideoMetadata) {
        let width = frame.width();
        self.algorithm.dither(frame.pixels_mut(), width);
    }
}

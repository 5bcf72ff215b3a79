use std::marker::PhantomData;
use std::sync::Arc;

use super::filter::Filter;
use super::step::{AudioStep, Step, Terminal, VideoStep};
use crate::models::{AudioChunk, AudioMetadata, Frame, VideoMetadata};

/// Collects filters in run order and links them into a [`Step`] chain.
///
/// The first filter added becomes the head, so the chain runs in the order
/// of the `then` calls.
pub struct StepBuilder<T, M> {
    filters: Vec<Arc<dyn Filter<T, M>>>,
    _kind: PhantomData<fn(T, M)>,
}

impl<T, M> StepBuilder<T, M> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            _kind: PhantomData,
        }
    }

    pub fn then<F: Filter<T, M> + 'static>(self, filter: F) -> Self {
        self.then_shared(Arc::new(filter))
    }

    /// Append a filter that is also held elsewhere.
    pub fn then_shared(mut self, filter: Arc<dyn Filter<T, M>>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T, M> StepBuilder<T, M>
where
    Step<T, M>: Terminal,
{
    /// Link the filters. An empty builder yields the shared no-op step.
    pub fn build(self) -> Arc<Step<T, M>> {
        let mut filters = self.filters.into_iter().rev();
        let Some(last) = filters.next() else {
            return Step::no_op();
        };
        filters.fold(Arc::new(Step::new(last, None)), |next, filter| {
            Arc::new(Step::new(filter, Some(next)))
        })
    }
}

impl<T, M> Default for StepBuilder<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry points for the two chain kinds.
pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn video() -> StepBuilder<Frame, VideoMetadata> {
        StepBuilder::new()
    }

    pub fn audio() -> StepBuilder<AudioChunk, AudioMetadata> {
        StepBuilder::new()
    }
}

/// Shorthand for an empty video chain.
pub fn empty_video() -> Arc<VideoStep> {
    VideoStep::no_op()
}

pub fn empty_audio() -> Arc<AudioStep> {
    AudioStep::no_op()
}

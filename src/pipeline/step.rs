use std::fmt;
use std::sync::{Arc, OnceLock};

use super::filter::{Filter, NoOpFilter};
use crate::models::{AudioChunk, AudioMetadata, Frame, VideoMetadata};

/// A link in a filter chain.
///
/// Steps are immutable once built. A chain is shared as `Arc<Step>` and
/// swapped as a whole, never edited in place.
pub struct Step<T, M> {
    filter: Arc<dyn Filter<T, M>>,
    next: Option<Arc<Step<T, M>>>,
}

pub type VideoStep = Step<Frame, VideoMetadata>;
pub type AudioStep = Step<AudioChunk, AudioMetadata>;

impl<T, M> Step<T, M> {
    pub fn new(filter: Arc<dyn Filter<T, M>>, next: Option<Arc<Step<T, M>>>) -> Self {
        Self { filter, next }
    }

    /// Apply only this step's filter.
    pub fn process(&self, data: &mut T, metadata: &M) {
        self.filter.apply(data, metadata);
    }

    pub fn next(&self) -> Option<&Arc<Step<T, M>>> {
        self.next.as_ref()
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// Apply this step and every step after it, head first.
    pub fn run(&self, data: &mut T, metadata: &M) {
        let mut step = Some(self);
        while let Some(current) = step {
            current.process(data, metadata);
            step = current.next.as_deref();
        }
    }

    /// Number of steps from here to the end of the chain.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut step = Some(self);
        while let Some(current) = step {
            count += 1;
            step = current.next.as_deref();
        }
        count
    }
}

impl<T, M> fmt::Debug for Step<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("len", &self.len()).finish()
    }
}

/// Chains with a shared do-nothing terminal.
pub trait Terminal: Sized {
    /// The one no-op step for this chain kind. Every call returns a clone
    /// of the same `Arc`.
    fn no_op() -> Arc<Self>;

    fn is_no_op(step: &Arc<Self>) -> bool {
        Arc::ptr_eq(step, &Self::no_op())
    }
}

impl Terminal for VideoStep {
    fn no_op() -> Arc<Self> {
        static NO_OP: OnceLock<Arc<VideoStep>> = OnceLock::new();
        Arc::clone(NO_OP.get_or_init(|| Arc::new(Step::new(Arc::new(NoOpFilter), None))))
    }
}

impl Terminal for AudioStep {
    fn no_op() -> Arc<Self> {
        static NO_OP: OnceLock<Arc<AudioStep>> = OnceLock::new();
        Arc::clone(NO_OP.get_or_init(|| Arc::new(Step::new(Arc::new(NoOpFilter), None))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_no_op_is_shared() {
        let a = VideoStep::no_op();
        let b = VideoStep::no_op();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_last());
        assert_eq!(a.len(), 1);
        assert!(VideoStep::is_no_op(&a));
        assert!(AudioStep::is_no_op(&AudioStep::no_op()));
    }

    #[test]
    fn test_process_applies_only_this_step() {
        let calls = Arc::new(Mutex::new(0));
        let counter = {
            let calls = Arc::clone(&calls);
            move |_: &mut AudioChunk, _: &AudioMetadata| *calls.lock().unwrap() += 1
        };
        let tail: Arc<AudioStep> = Arc::new(Step::new(Arc::new(counter.clone()), None));
        let head = Step::new(Arc::new(counter), Some(tail));

        let mut chunk = vec![0u8; 4];
        let meta = AudioMetadata::new(48_000, 2);
        head.process(&mut chunk, &meta);
        assert_eq!(*calls.lock().unwrap(), 1);
        head.run(&mut chunk, &meta);
        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(head.len(), 2);
        assert!(!head.is_last());
        assert!(head.next().is_some_and(|n| n.is_last()));
    }
}

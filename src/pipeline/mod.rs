//! Filter chains that frames and audio chunks are pushed through.
//!
//! A chain is built once from filters in run order and then shared
//! immutably. Players hold the active chain in an [`AttachableCallback`]
//! so it can be replaced while frames are flowing.

mod attachable;
mod builder;
mod dither_filter;
mod filter;
mod step;
mod video_filters;

pub use attachable::AttachableCallback;
pub use builder::{empty_audio, empty_video, PipelineBuilder, StepBuilder};
pub use dither_filter::{DitherFilter, ResultSink, SnapFilter};
pub use filter::{Filter, NoOpFilter};
pub use step::{AudioStep, Step, Terminal, VideoStep};
pub use video_filters::{BlendFilter, FlipDirection, FlipFilter, ThresholdFilter};

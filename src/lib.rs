//! Dithercast - frame pipelines into palette-indexed output.
//!
//! Frames flow from a source through a filter chain driven by a player
//! thread; the dithering itself lives in the `index-dither` crate.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

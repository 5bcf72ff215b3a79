//! High-level API: the [`DitherBuilder`] and the crate-wide [`DitherError`].

mod builder;
mod error;

pub use builder::DitherBuilder;
pub use error::DitherError;

//! Output types.
//!
//! [`IndexedImage`] pairs palette indices with their dimensions and the
//! shared palette, and expands them back to colors on demand.

mod indexed_image;

pub use indexed_image::IndexedImage;

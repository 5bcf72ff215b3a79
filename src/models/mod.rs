pub mod config;
pub mod frame;
pub mod metadata;

pub use config::{AppConfig, PaletteConfig};
pub use frame::{AudioChunk, Frame};
pub use metadata::{AudioMetadata, VideoMetadata};

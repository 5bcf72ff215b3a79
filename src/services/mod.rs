pub mod frame_source;
pub mod player;
pub mod repeating_source;

pub use frame_source::{FrameSource, SupplierSource};
pub use player::{ExceptionHandler, FramePanic, FramePlayer, PlayerOptions, PlayerStats};
pub use repeating_source::{RepeatCount, RepeatingFrameSource};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame has {actual} pixels, expected {expected} for {width}x{height}")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Frame is {width}x{height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("Frame dimensions overflow: {width}x{height}")]
    DimensionsOverflow { width: usize, height: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("Repeating source needs at least one frame")]
    NoFrames,

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),

    #[error("Frame {index} does not match the source size: {source}")]
    BadFrame {
        index: usize,
        #[source]
        source: FrameError,
    },
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player has been released")]
    Released,

    #[error("Failed to spawn player thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown palette preset: {0}")]
    UnknownPalette(String),

    #[error("Dither error: {0}")]
    Dither(#[from] index_dither::DitherError),

    #[error("Failed to start dither pool: {0}")]
    ThreadPool(String),
}

impl From<index_dither::PaletteError> for ConfigError {
    fn from(e: index_dither::PaletteError) -> Self {
        ConfigError::Dither(e.into())
    }
}

//! Error types for palette construction and color parsing.

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3, 6 or 8 characters after stripping '#')
    #[error("invalid hex color length (expected 3, 6 or 8 characters)")]
    InvalidLength,
    /// Invalid hexadecimal character encountered
    #[error("invalid hex character: {0}")]
    InvalidHex(char),
}

/// Error type for palette validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaletteError {
    /// No colors provided
    #[error("palette must contain at least one color")]
    EmptyPalette,
    /// Index-encoded output cannot address more than 256 entries
    #[error("palette has {count} colors, at most {max} are supported")]
    TooManyColors { count: usize, max: usize },
    /// A configured color string could not be parsed
    #[error("invalid palette color '{input}': {source}")]
    InvalidColor {
        input: String,
        #[source]
        source: ParseColorError,
    },
    /// The dedicated build pool could not be started
    #[error("failed to start palette build pool: {0}")]
    ThreadPool(String),
}

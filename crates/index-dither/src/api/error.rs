//! Unified error type for configuring dithering.

use crate::palette::{PaletteError, ParseColorError};

/// Unified error type for the public API.
///
/// ```
/// use index_dither::{DitherError, Palette};
///
/// fn create_palette() -> Result<Palette, DitherError> {
///     let palette = Palette::from_hex(&["#000000", "#FFFFFF"], false)?;
///     Ok(palette)
/// }
/// # assert!(create_palette().is_ok());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DitherError {
    /// Algorithm name not recognized
    #[error("unknown dither algorithm '{0}'")]
    UnknownAlgorithm(String),
    /// Threshold matrix name not recognized
    #[error("unknown threshold matrix '{0}'")]
    UnknownMatrix(String),
    /// A parameter is outside its accepted range
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// Palette validation error
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// Color parsing error
    #[error(transparent)]
    ParseColor(#[from] ParseColorError),
}

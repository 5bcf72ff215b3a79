//! 8-bit RGB triple and packed-color helpers.

use std::str::FromStr;

use crate::palette::ParseColorError;

/// Cells per channel in the quantized color cube (channels keep their top 7 bits).
pub const CUBE_SIDE: usize = 128;

/// Total number of cells in the quantized color cube.
pub const LUT_SIZE: usize = CUBE_SIDE * CUBE_SIDE * CUBE_SIDE;

/// Packed value of the reserved "no color" palette slot.
pub const TRANSPARENT: u32 = 0;

/// An 8-bit-per-channel RGB color.
///
/// Alpha is not carried: palettes are opaque apart from the reserved
/// transparent slot, and frame pixels are matched on RGB only.
///
/// # Example
///
/// ```
/// use index_dither::Rgb;
///
/// let red = Rgb::from_packed(0xFFFF_0000);
/// assert_eq!(red, Rgb::new(255, 0, 0));
/// assert_eq!(red.to_packed() as i32, -65536);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack the RGB channels of an `0xAARRGGBB` value, ignoring alpha.
    #[inline]
    pub const fn from_packed(argb: u32) -> Self {
        Self {
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack as an opaque `0xFFRRGGBB` value.
    #[inline]
    pub const fn to_packed(self) -> u32 {
        0xFF00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Build from signed channel values, clamping each to `0..=255`.
    ///
    /// Dithering perturbs channels past the representable range; this is the
    /// single place where such values are brought back.
    #[inline]
    pub fn from_i32_clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Position of this color's cell in the quantized cube.
    #[inline]
    pub const fn lut_index(self) -> usize {
        lut_index(self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#RRGGBB`, `#RGB` or `#AARRGGBB` (alpha discarded), with or
    /// without the hash. Case-insensitive; surrounding whitespace is trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        // Only bare hex digits; no sign, no separators.
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidHex(c));
        }

        let digits: Vec<u8> = s
            .chars()
            .map(|c| c.to_digit(16).unwrap_or_default() as u8)
            .collect();
        match digits.len() {
            3 => Ok(Self::new(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
            6 | 8 => {
                let d = &digits[digits.len() - 6..];
                Ok(Self::new((d[0] << 4) | d[1], (d[2] << 4) | d[3], (d[4] << 4) | d[5]))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

/// Alpha channel of a packed `0xAARRGGBB` value.
#[inline]
pub const fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

/// Clamp a signed channel value to `0..=255`.
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Quantization function `q(r, g, b)`: each channel is halved to 7 bits and
/// the three are concatenated red-major.
#[inline]
pub const fn lut_index(r: u8, g: u8, b: u8) -> usize {
    (((r as usize) >> 1) << 14) | (((g as usize) >> 1) << 7) | ((b as usize) >> 1)
}

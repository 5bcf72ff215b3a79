//! Indexed palette with precomputed nearest-color lookup tables.
//!
//! A `Palette` owns an ordered list of up to 256 packed colors plus two
//! flat tables over the 128³ quantized color cube:
//!
//! - `index_map[q]`: palette index of the best match for cell `q`
//! - `full_color_map[q]`: packed color at that index
//!
//! Both are built once, in parallel, before the constructor returns; after
//! that a `Palette` is immutable and every query is a single table read.

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;

use super::error::PaletteError;
use super::lut::{self, LookupTables};
use crate::color::{alpha, lut_index, Rgb, TRANSPARENT};

/// Index-encoded output is one byte per pixel.
pub const MAX_COLORS: usize = 256;

/// A color palette with constant-time nearest-color queries.
///
/// # Transparent slot
///
/// By default slot 0 is reserved for transparency: whatever the caller put
/// there is replaced by [`TRANSPARENT`] and the nearest-color search starts
/// at index 1, so opaque pixels never map to it. Use [`Palette::opaque`] (or
/// [`PaletteBuilder::reserve_transparent`]) when every entry is a real
/// color and index 0 must be reachable.
///
/// # Example
///
/// ```
/// use index_dither::Palette;
///
/// let palette = Palette::opaque(&[0xFF00_0000, 0xFFFF_FFFF]).unwrap();
/// assert_eq!(palette.best_index(250, 250, 250), 1);
/// assert_eq!(palette.best_color(3, 3, 3), 0xFF00_0000);
/// ```
pub struct Palette {
    colors: Vec<u32>,
    search_start: usize,
    index_map: Box<[u8]>,
    full_color_map: Box<[u32]>,
}

impl Palette {
    /// Build a palette with slot 0 reserved for transparency.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::EmptyPalette`] for an empty slice and
    /// [`PaletteError::TooManyColors`] for more than 256 entries.
    pub fn new(colors: &[u32]) -> Result<Self, PaletteError> {
        PaletteBuilder::new(colors.to_vec()).build()
    }

    /// Build a palette where every entry, including index 0, is matchable.
    pub fn opaque(colors: &[u32]) -> Result<Self, PaletteError> {
        PaletteBuilder::new(colors.to_vec())
            .reserve_transparent(false)
            .build()
    }

    /// Start a builder for finer control (reserved slot, build pool).
    pub fn builder(colors: Vec<u32>) -> PaletteBuilder {
        PaletteBuilder::new(colors)
    }

    /// Parse hex color strings and build a palette.
    ///
    /// ```
    /// use index_dither::Palette;
    ///
    /// let palette = Palette::from_hex(&["#000", "#FFFFFF", "#FF0000"], false).unwrap();
    /// assert_eq!(palette.len(), 3);
    /// assert_eq!(palette.color(2), 0xFFFF_0000);
    /// ```
    pub fn from_hex(colors: &[&str], reserve_transparent: bool) -> Result<Self, PaletteError> {
        let packed = colors
            .iter()
            .map(|s| {
                s.parse::<Rgb>()
                    .map(Rgb::to_packed)
                    .map_err(|source| PaletteError::InvalidColor {
                        input: (*s).to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        PaletteBuilder::new(packed)
            .reserve_transparent(reserve_transparent)
            .build()
    }

    /// Construct from colors already known to be valid.
    pub(crate) fn from_validated(
        mut colors: Vec<u32>,
        reserve_transparent: bool,
        pool: Option<&ThreadPool>,
    ) -> Self {
        for color in colors.iter_mut() {
            *color = Rgb::from_packed(*color).to_packed();
        }
        if reserve_transparent {
            colors[0] = TRANSPARENT;
        }
        let search_start = usize::from(reserve_transparent);
        let LookupTables {
            index_map,
            full_color_map,
        } = lut::build(&colors, search_start, pool);
        Self {
            colors,
            search_start,
            index_map,
            full_color_map,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether slot 0 is the reserved transparent entry.
    #[inline]
    pub fn reserves_transparent(&self) -> bool {
        self.search_start == 1
    }

    /// Palette colors in index order.
    #[inline]
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Packed color at `index`. Out-of-range indices yield [`TRANSPARENT`].
    #[inline]
    pub fn color(&self, index: u8) -> u32 {
        self.colors.get(index as usize).copied().unwrap_or(TRANSPARENT)
    }

    /// The cube-indexed palette-index table.
    #[inline]
    pub fn index_map(&self) -> &[u8] {
        &self.index_map
    }

    /// The cube-indexed packed-color table.
    #[inline]
    pub fn full_color_map(&self) -> &[u32] {
        &self.full_color_map
    }

    /// Nearest palette index for an RGB color. Never returns the reserved
    /// slot unless the palette has no other entry.
    #[inline]
    pub fn best_index(&self, r: u8, g: u8, b: u8) -> u8 {
        self.index_map[lut_index(r, g, b)]
    }

    /// Nearest palette color for an RGB color.
    #[inline]
    pub fn best_color(&self, r: u8, g: u8, b: u8) -> u32 {
        self.full_color_map[lut_index(r, g, b)]
    }

    #[inline]
    pub fn best_index_rgb(&self, color: Rgb) -> u8 {
        self.index_map[color.lut_index()]
    }

    #[inline]
    pub fn best_index_packed(&self, argb: u32) -> u8 {
        self.best_index_rgb(Rgb::from_packed(argb))
    }

    /// Like [`Palette::best_index_packed`], but fully transparent pixels
    /// (alpha 0) map to index 0.
    #[inline]
    pub fn best_index_including_transparent(&self, argb: u32) -> u8 {
        if alpha(argb) == 0 {
            0
        } else {
            self.best_index_packed(argb)
        }
    }

    /// Nearest index for signed channel values, clamped to `0..=255` first.
    #[inline]
    pub fn best_index_clamped(&self, r: i32, g: i32, b: i32) -> u8 {
        self.best_index_rgb(Rgb::from_i32_clamped(r, g, b))
    }

    /// Full linear scan without the lookup tables.
    ///
    /// Exact for every 8-bit input (the tables resolve the cube cell's even
    /// representative instead); meant for verification and one-off queries.
    pub fn nearest_by_scan(&self, color: Rgb) -> u8 {
        let candidates: Vec<Rgb> = self.colors.iter().map(|&c| Rgb::from_packed(c)).collect();
        lut::best_match(&candidates, self.search_start, color)
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("len", &self.colors.len())
            .field("reserves_transparent", &self.reserves_transparent())
            .field("colors", &format_args!("{:08X?}", self.colors))
            .finish_non_exhaustive()
    }
}

/// Builder for [`Palette`].
#[derive(Clone)]
pub struct PaletteBuilder {
    colors: Vec<u32>,
    reserve_transparent: bool,
    pool: Option<Arc<ThreadPool>>,
}

impl PaletteBuilder {
    pub fn new(colors: Vec<u32>) -> Self {
        Self {
            colors,
            reserve_transparent: true,
            pool: None,
        }
    }

    /// Reserve slot 0 for transparency (default `true`).
    pub fn reserve_transparent(mut self, reserve: bool) -> Self {
        self.reserve_transparent = reserve;
        self
    }

    /// Run the table build on a caller-supplied pool instead of the global one.
    pub fn pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Run the table build on a dedicated pool with `threads` workers.
    pub fn threads(self, threads: usize) -> Result<Self, PaletteError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("palette-build-{i}"))
            .build()
            .map_err(|e| PaletteError::ThreadPool(e.to_string()))?;
        Ok(self.pool(Arc::new(pool)))
    }

    /// Validate and build the lookup tables. Blocks until both are complete.
    pub fn build(self) -> Result<Palette, PaletteError> {
        if self.colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if self.colors.len() > MAX_COLORS {
            return Err(PaletteError::TooManyColors {
                count: self.colors.len(),
                max: MAX_COLORS,
            });
        }
        Ok(Palette::from_validated(
            self.colors,
            self.reserve_transparent,
            self.pool.as_deref(),
        ))
    }
}

impl fmt::Debug for PaletteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteBuilder")
            .field("colors", &self.colors.len())
            .field("reserve_transparent", &self.reserve_transparent)
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

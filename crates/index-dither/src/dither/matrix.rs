//! Threshold matrices for ordered dithering.
//!
//! A matrix holds every threshold rank `0..max` equally often (once for
//! most, twice for the paired diagonal screens). The ordered ditherer tiles
//! it over the frame and turns rank `m` into a signed offset proportional to
//! `(m + 0.5) / max - 0.5`.

use std::fmt;
use std::str::FromStr;

use crate::api::DitherError;

/// A tiled threshold matrix.
#[derive(Clone, PartialEq, Eq)]
pub struct ThresholdMatrix {
    width: usize,
    height: usize,
    values: Vec<u16>,
    max: u16,
}

const CLUSTERED_DOT_6X6: [u16; 36] = [
    34, 29, 17, 21, 30, 35, //
    28, 14, 9, 16, 20, 31, //
    13, 8, 4, 5, 15, 19, //
    12, 3, 0, 1, 10, 18, //
    27, 7, 2, 6, 23, 24, //
    33, 26, 11, 22, 25, 32,
];

const SPIRAL_5X5: [u16; 25] = [
    20, 21, 22, 23, 24, //
    19, 6, 7, 8, 9, //
    18, 5, 0, 1, 10, //
    17, 4, 3, 2, 11, //
    16, 15, 14, 13, 12,
];

const CLUSTERED_DOT_6X6_2: [u16; 36] = [
    34, 25, 21, 17, 29, 33, //
    30, 13, 9, 5, 12, 24, //
    18, 6, 1, 0, 8, 20, //
    22, 10, 2, 3, 4, 16, //
    26, 14, 7, 11, 15, 28, //
    35, 31, 19, 23, 27, 32,
];

const CLUSTERED_DOT_6X6_3: [u16; 36] = [
    30, 22, 16, 21, 33, 35, //
    24, 11, 7, 9, 26, 28, //
    13, 5, 0, 2, 14, 19, //
    15, 3, 1, 4, 12, 18, //
    27, 8, 6, 10, 25, 29, //
    32, 20, 17, 23, 31, 34,
];

const CLUSTERED_DOT_8X8: [u16; 64] = [
    3, 9, 17, 27, 25, 15, 7, 1, //
    11, 29, 37, 45, 43, 35, 23, 5, //
    19, 39, 51, 57, 55, 49, 33, 13, //
    31, 47, 59, 62, 61, 53, 41, 21, //
    30, 46, 58, 63, 60, 52, 40, 20, //
    18, 38, 50, 56, 54, 48, 32, 12, //
    10, 28, 36, 44, 42, 34, 22, 4, //
    2, 8, 16, 26, 24, 14, 6, 0,
];

const DIAGONAL_6X6: [u16; 36] = [
    8, 6, 7, 9, 11, 10, //
    5, 0, 1, 12, 17, 16, //
    4, 3, 2, 13, 14, 15, //
    9, 11, 10, 8, 6, 7, //
    12, 17, 16, 5, 0, 1, //
    13, 14, 15, 4, 3, 2,
];

const DIAGONAL_8X8: [u16; 64] = [
    24, 10, 12, 26, 35, 47, 49, 37, //
    8, 0, 2, 14, 45, 59, 61, 51, //
    22, 6, 4, 16, 43, 57, 63, 53, //
    30, 20, 18, 28, 33, 41, 55, 39, //
    34, 46, 48, 36, 25, 11, 13, 27, //
    44, 58, 60, 50, 9, 1, 3, 15, //
    42, 56, 62, 52, 23, 7, 5, 17, //
    32, 40, 54, 38, 31, 21, 19, 29,
];

const DIAGONAL_8X8_2: [u16; 64] = [
    13, 11, 12, 15, 18, 20, 19, 16, //
    4, 3, 2, 9, 27, 28, 29, 22, //
    5, 0, 1, 10, 26, 31, 30, 21, //
    8, 6, 7, 14, 23, 25, 24, 17, //
    18, 20, 19, 16, 13, 11, 12, 15, //
    27, 28, 29, 22, 4, 3, 2, 9, //
    26, 31, 30, 21, 5, 0, 1, 10, //
    23, 25, 24, 17, 8, 6, 7, 14,
];

const DIAGONAL_8X8_3: [u16; 64] = [
    13, 9, 5, 12, 18, 22, 26, 19, //
    6, 1, 0, 8, 25, 30, 31, 23, //
    10, 2, 3, 4, 21, 29, 28, 27, //
    14, 7, 11, 15, 17, 24, 20, 16, //
    18, 22, 26, 19, 13, 9, 5, 12, //
    25, 30, 31, 23, 6, 1, 0, 8, //
    21, 29, 28, 27, 10, 2, 3, 4, //
    17, 24, 20, 16, 14, 7, 11, 15,
];

const DIAGONAL_16X16: [u16; 256] = [
    63, 58, 50, 40, 41, 51, 59, 60, 64, 69, 77, 87, 86, 76, 68, 67, //
    57, 33, 27, 18, 19, 28, 34, 52, 70, 94, 100, 109, 108, 99, 93, 75, //
    49, 26, 13, 11, 12, 15, 29, 44, 78, 101, 114, 116, 115, 112, 98, 83, //
    39, 17, 4, 3, 2, 9, 20, 42, 88, 110, 123, 124, 125, 118, 107, 85, //
    38, 16, 5, 0, 1, 10, 21, 43, 89, 111, 122, 127, 126, 117, 106, 84, //
    48, 25, 8, 6, 7, 14, 30, 45, 79, 102, 119, 121, 120, 113, 97, 82, //
    56, 32, 24, 23, 22, 31, 35, 53, 71, 95, 103, 104, 105, 96, 92, 74, //
    62, 55, 47, 37, 36, 46, 54, 61, 65, 72, 80, 90, 91, 81, 73, 66, //
    64, 69, 77, 87, 86, 76, 68, 67, 63, 58, 50, 40, 41, 51, 59, 60, //
    70, 94, 100, 109, 108, 99, 93, 75, 57, 33, 27, 18, 19, 28, 34, 52, //
    78, 101, 114, 116, 115, 112, 98, 83, 49, 26, 13, 11, 12, 15, 29, 44, //
    88, 110, 123, 124, 125, 118, 107, 85, 39, 17, 4, 3, 2, 9, 20, 42, //
    89, 111, 122, 127, 126, 117, 106, 84, 38, 16, 5, 0, 1, 10, 21, 43, //
    79, 102, 119, 121, 120, 113, 97, 82, 48, 25, 8, 6, 7, 14, 30, 45, //
    71, 95, 103, 104, 105, 96, 92, 74, 56, 32, 24, 23, 22, 31, 35, 53, //
    65, 72, 80, 90, 91, 81, 73, 66, 62, 55, 47, 37, 36, 46, 54, 61,
];

const VERTICAL_5X3: [u16; 15] = [
    9, 3, 0, 6, 12, //
    10, 4, 1, 7, 13, //
    11, 5, 2, 8, 14,
];

const HORIZONTAL_3X5: [u16; 15] = [
    9, 10, 11, //
    3, 4, 5, //
    0, 1, 2, //
    6, 7, 8, //
    12, 13, 14,
];

const HORIZONTAL_LINE_6X6: [u16; 36] = [
    35, 33, 31, 30, 32, 34, //
    23, 21, 19, 18, 20, 22, //
    11, 9, 7, 6, 8, 10, //
    5, 3, 1, 0, 2, 4, //
    17, 15, 13, 12, 14, 16, //
    29, 27, 25, 24, 26, 28,
];

const VERTICAL_LINE_6X6: [u16; 36] = [
    35, 23, 11, 5, 17, 29, //
    33, 21, 9, 3, 15, 27, //
    31, 19, 7, 1, 13, 25, //
    30, 18, 6, 0, 12, 24, //
    32, 20, 8, 2, 14, 26, //
    34, 22, 10, 4, 16, 28,
];

/// A fixed matrix selectable by name.
struct NamedMatrix {
    name: &'static str,
    width: usize,
    max: u16,
    values: &'static [u16],
}

const NAMED: &[NamedMatrix] = &[
    NamedMatrix { name: "clustered-dot-6x6", width: 6, max: 36, values: &CLUSTERED_DOT_6X6 },
    NamedMatrix { name: "clustered-dot-6x6-2", width: 6, max: 36, values: &CLUSTERED_DOT_6X6_2 },
    NamedMatrix { name: "clustered-dot-6x6-3", width: 6, max: 36, values: &CLUSTERED_DOT_6X6_3 },
    NamedMatrix { name: "clustered-dot-8x8", width: 8, max: 64, values: &CLUSTERED_DOT_8X8 },
    NamedMatrix { name: "spiral-5x5", width: 5, max: 25, values: &SPIRAL_5X5 },
    NamedMatrix { name: "diagonal-6x6", width: 6, max: 18, values: &DIAGONAL_6X6 },
    NamedMatrix { name: "diagonal-8x8", width: 8, max: 64, values: &DIAGONAL_8X8 },
    NamedMatrix { name: "diagonal-8x8-2", width: 8, max: 32, values: &DIAGONAL_8X8_2 },
    NamedMatrix { name: "diagonal-8x8-3", width: 8, max: 32, values: &DIAGONAL_8X8_3 },
    NamedMatrix { name: "diagonal-16x16", width: 16, max: 128, values: &DIAGONAL_16X16 },
    NamedMatrix { name: "vertical-5x3", width: 5, max: 15, values: &VERTICAL_5X3 },
    NamedMatrix { name: "horizontal-3x5", width: 3, max: 15, values: &HORIZONTAL_3X5 },
    NamedMatrix { name: "horizontal-line-6x6", width: 6, max: 36, values: &HORIZONTAL_LINE_6X6 },
    NamedMatrix { name: "vertical-line-6x6", width: 6, max: 36, values: &VERTICAL_LINE_6X6 },
];

impl NamedMatrix {
    fn to_matrix(&self) -> ThresholdMatrix {
        ThresholdMatrix {
            width: self.width,
            height: self.values.len() / self.width,
            values: self.values.to_vec(),
            max: self.max,
        }
    }
}

/// Largest Bayer matrix side supported (`16 * 16 = 256` ranks).
pub const MAX_BAYER_SIZE: usize = 16;

impl ThresholdMatrix {
    /// Recursively generated Bayer matrix of side `size` (a power of two in
    /// `2..=16`).
    ///
    /// ```
    /// use index_dither::ThresholdMatrix;
    ///
    /// let m = ThresholdMatrix::bayer(2).unwrap();
    /// assert_eq!(m.values(), &[0, 2, 3, 1]);
    /// ```
    pub fn bayer(size: usize) -> Result<Self, DitherError> {
        if !(2..=MAX_BAYER_SIZE).contains(&size) || !size.is_power_of_two() {
            return Err(DitherError::InvalidParameter {
                name: "matrix",
                reason: format!("bayer size must be a power of two in 2..={MAX_BAYER_SIZE}, got {size}"),
            });
        }
        let mut values = vec![0u16];
        let mut side = 1;
        while side < size {
            let next = side * 2;
            let mut grown = vec![0u16; next * next];
            for y in 0..next {
                for x in 0..next {
                    let quadrant = match (y / side, x / side) {
                        (0, 0) => 0,
                        (0, _) => 2,
                        (_, 0) => 3,
                        _ => 1,
                    };
                    grown[y * next + x] = 4 * values[(y % side) * side + x % side] + quadrant;
                }
            }
            values = grown;
            side = next;
        }
        Ok(Self {
            width: size,
            height: size,
            values,
            max: (size * size) as u16,
        })
    }

    /// 6×6 clustered-dot matrix (halftone-style round dots).
    pub fn clustered_dot_6x6() -> Self {
        NAMED[0].to_matrix()
    }

    /// 5×5 spiral matrix growing outward from the centre.
    pub fn spiral_5x5() -> Self {
        NAMED[4].to_matrix()
    }

    /// One of the fixed halftone screens, by its full name.
    pub fn named(name: &str) -> Option<Self> {
        NAMED.iter().find(|m| m.name == name).map(NamedMatrix::to_matrix)
    }

    /// Names accepted by [`named`](Self::named).
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMED.iter().map(|m| m.name)
    }

    /// A caller-supplied row-major matrix. Every value must be below `max`.
    pub fn custom(values: Vec<u16>, width: usize, max: u16) -> Result<Self, DitherError> {
        let invalid = |reason: String| DitherError::InvalidParameter {
            name: "matrix",
            reason,
        };
        if width == 0 || values.is_empty() || values.len() % width != 0 {
            return Err(invalid(format!(
                "{} values do not form rows of width {width}",
                values.len()
            )));
        }
        if max == 0 {
            return Err(invalid("max must be positive".to_string()));
        }
        if let Some(v) = values.iter().find(|&&v| v >= max) {
            return Err(invalid(format!("value {v} is not below max {max}")));
        }
        Ok(Self {
            width,
            height: values.len() / width,
            values,
            max,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Row-major threshold ranks.
    #[inline]
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Centered threshold in `(-0.5, 0.5)` for the rank at `(x mod w, y mod h)`.
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let rank = self.values[(y % self.height) * self.width + x % self.width];
        (rank as f32 + 0.5) / self.max as f32 - 0.5
    }
}

impl Default for ThresholdMatrix {
    /// Bayer 4×4.
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            values: vec![0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5],
            max: 16,
        }
    }
}

impl fmt::Debug for ThresholdMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThresholdMatrix({}x{}, max {})", self.width, self.height, self.max)
    }
}

impl FromStr for ThresholdMatrix {
    type Err = DitherError;

    /// Accepts `bayer-2` through `bayer-16`, any name from
    /// [`ThresholdMatrix::names`], and the short forms `clustered-6` and
    /// `spiral-5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let full = match name.as_str() {
            "clustered-6" => "clustered-dot-6x6",
            "spiral-5" => "spiral-5x5",
            other => other,
        };
        if let Some(matrix) = Self::named(full) {
            return Ok(matrix);
        }
        match name.strip_prefix("bayer-").map(str::parse::<usize>) {
            Some(Ok(size)) => Self::bayer(size),
            _ => Err(DitherError::UnknownMatrix(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(m: &ThresholdMatrix) -> bool {
        let mut sorted = m.values().to_vec();
        sorted.sort_unstable();
        sorted == (0..m.max()).collect::<Vec<_>>()
    }

    /// Every rank below `max` appears the same number of times.
    fn is_balanced(m: &ThresholdMatrix) -> bool {
        let per_rank = m.values().len() / m.max() as usize;
        let mut counts = vec![0usize; m.max() as usize];
        for &v in m.values() {
            counts[v as usize] += 1;
        }
        per_rank > 0 && counts.iter().all(|&c| c == per_rank)
    }

    #[test]
    fn test_bayer_4_matches_default() {
        assert_eq!(ThresholdMatrix::bayer(4).unwrap(), ThresholdMatrix::default());
    }

    #[test]
    fn test_generated_matrices_are_permutations() {
        for size in [2, 4, 8, 16] {
            let m = ThresholdMatrix::bayer(size).unwrap();
            assert_eq!(m.values().len(), size * size);
            assert!(is_permutation(&m), "bayer-{size}");
        }
        assert!(is_permutation(&ThresholdMatrix::clustered_dot_6x6()));
        assert!(is_permutation(&ThresholdMatrix::spiral_5x5()));
    }

    #[test]
    fn test_bayer_rejects_bad_sizes() {
        for size in [0, 1, 3, 6, 32] {
            assert!(ThresholdMatrix::bayer(size).is_err(), "size {size}");
        }
    }

    #[test]
    fn test_threshold_is_centered_and_tiled() {
        let m = ThresholdMatrix::bayer(2).unwrap();
        assert!((m.threshold(0, 0) - (-0.375)).abs() < 1e-6);
        assert!((m.threshold(0, 1) - 0.375).abs() < 1e-6);
        assert_eq!(m.threshold(2, 2), m.threshold(0, 0));
        let mean: f32 = (0..2)
            .flat_map(|y| (0..2).map(move |x| (x, y)))
            .map(|(x, y)| m.threshold(x, y))
            .sum::<f32>()
            / 4.0;
        assert!(mean.abs() < 1e-6);
    }

    #[test]
    fn test_custom_validation() {
        assert!(ThresholdMatrix::custom(vec![0, 1, 2, 3], 2, 4).is_ok());
        assert!(ThresholdMatrix::custom(vec![0, 1, 2], 2, 4).is_err());
        assert!(ThresholdMatrix::custom(vec![0, 4], 2, 4).is_err());
        assert!(ThresholdMatrix::custom(vec![], 2, 4).is_err());
    }

    #[test]
    fn test_named_matrices_are_balanced() {
        let names: Vec<_> = ThresholdMatrix::names().collect();
        assert_eq!(names.len(), 14);
        for name in names {
            let m = ThresholdMatrix::named(name).unwrap();
            assert_eq!(m.values().len(), m.width() * m.height(), "{name}");
            assert!(is_balanced(&m), "{name} does not use every rank equally");
            assert_eq!(name.parse::<ThresholdMatrix>().unwrap(), m);
        }
    }

    #[test]
    fn test_named_shapes() {
        let m = ThresholdMatrix::named("vertical-5x3").unwrap();
        assert_eq!((m.width(), m.height(), m.max()), (5, 3, 15));
        let m = ThresholdMatrix::named("horizontal-3x5").unwrap();
        assert_eq!((m.width(), m.height(), m.max()), (3, 5, 15));
        let m = ThresholdMatrix::named("diagonal-16x16").unwrap();
        assert_eq!((m.width(), m.height(), m.max()), (16, 16, 128));
        assert!(is_permutation(&ThresholdMatrix::named("clustered-dot-8x8").unwrap()));
        assert!(!is_permutation(&ThresholdMatrix::named("diagonal-6x6").unwrap()));
        assert!(ThresholdMatrix::named("clustered-6").is_none());
    }

    #[test]
    fn test_line_screens_are_transposes() {
        let h = ThresholdMatrix::named("horizontal-line-6x6").unwrap();
        let v = ThresholdMatrix::named("vertical-line-6x6").unwrap();
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(h.values()[y * 6 + x], v.values()[x * 6 + y]);
            }
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("bayer-8".parse::<ThresholdMatrix>().unwrap().width(), 8);
        assert_eq!("Spiral-5".parse::<ThresholdMatrix>().unwrap().max(), 25);
        assert_eq!("clustered-6".parse::<ThresholdMatrix>().unwrap(), ThresholdMatrix::clustered_dot_6x6());
        assert_eq!(" Diagonal-8x8-2 ".parse::<ThresholdMatrix>().unwrap().max(), 32);
        assert!(matches!(
            "blue-noise".parse::<ThresholdMatrix>(),
            Err(DitherError::UnknownMatrix(_))
        ));
        assert!(matches!(
            "bayer-3".parse::<ThresholdMatrix>(),
            Err(DitherError::InvalidParameter { .. })
        ));
    }
}

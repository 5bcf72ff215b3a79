//! Error diffusion kernels.
//!
//! A kernel lists the not-yet-visited neighbours that receive a share of a
//! pixel's quantization error, as `(dx, dy, weight)` with `dy >= 0`. Each
//! neighbour gets `error * weight / divisor`. On right-to-left rows of a
//! serpentine scan `dx` is negated.

/// An error diffusion kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    /// `(dx, dy, weight)` entries.
    pub entries: &'static [(i32, i32, u16)],
    /// Normalizing divisor for the weights.
    pub divisor: u16,
    /// Furthest row reached; the error buffer keeps `max_dy + 1` rows.
    pub max_dy: usize,
}

impl Kernel {
    /// Sum of all entry weights.
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|&(_, _, w)| w as u32).sum()
    }

    /// Fraction of the error that is propagated (1.0 for a lossless kernel).
    pub fn propagation(&self) -> f32 {
        self.total_weight() as f32 / self.divisor as f32
    }

    /// Widest horizontal reach in either direction.
    pub fn max_dx(&self) -> usize {
        self.entries
            .iter()
            .map(|&(dx, _, _)| dx.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }
}

/// Floyd-Steinberg.
///
/// ```text
///        X   7
///    3   5   1      (/16)
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
    max_dy: 1,
};

/// Atkinson. Only 6/8 of the error moves on; the rest is dropped, which
/// keeps highlights and shadows clean on small palettes.
///
/// ```text
///        X   1   1
///    1   1   1
///        1          (/8)
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
    max_dy: 2,
};

/// Burkes: two-row Stucki.
///
/// ```text
///            X   8   4
///    2   4   8   4   2      (/32)
/// ```
pub const BURKES: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
    max_dy: 1,
};

/// Stucki.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1      (/42)
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};

/// Jarvis, Judice and Ninke.
///
/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1      (/48)
/// ```
pub const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
    max_dy: 2,
};

/// Sierra Lite ("filter lite").
///
/// ```text
///    X   2
///    1   1          (/4)
/// ```
pub const FILTER_LITE: Kernel = Kernel {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};

/// Stevenson-Arce: a hexagonal-grid kernel spreading error over four rows.
///
/// ```text
///                        X       32
///        12      26      30      16
///            12      26      12
///         5      12      12       5      (/200)
/// ```
pub const STEVENSON_ARCE: Kernel = Kernel {
    entries: &[
        (2, 0, 32),
        (-3, 1, 12),
        (-1, 1, 26),
        (1, 1, 30),
        (3, 1, 16),
        (-2, 2, 12),
        (0, 2, 26),
        (2, 2, 12),
        (-3, 3, 5),
        (-1, 3, 12),
        (1, 3, 12),
        (3, 3, 5),
    ],
    divisor: 200,
    max_dy: 3,
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(&str, Kernel); 7] = [
        ("floyd-steinberg", FLOYD_STEINBERG),
        ("atkinson", ATKINSON),
        ("burkes", BURKES),
        ("stucki", STUCKI),
        ("jarvis-judice-ninke", JARVIS_JUDICE_NINKE),
        ("filter-lite", FILTER_LITE),
        ("stevenson-arce", STEVENSON_ARCE),
    ];

    #[test]
    fn test_lossless_kernels_propagate_all_error() {
        for (name, kernel) in ALL.iter().filter(|(name, _)| *name != "atkinson") {
            assert_eq!(
                kernel.total_weight(),
                kernel.divisor as u32,
                "{name} weights should sum to its divisor"
            );
        }
    }

    #[test]
    fn test_atkinson_propagates_three_quarters() {
        assert_eq!(ATKINSON.total_weight(), 6);
        assert!((ATKINSON.propagation() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_dy_matches_entries() {
        for (name, kernel) in &ALL {
            let actual = kernel
                .entries
                .iter()
                .map(|&(_, dy, _)| dy as usize)
                .max()
                .unwrap();
            assert_eq!(actual, kernel.max_dy, "{name} max_dy mismatch");
        }
    }

    #[test]
    fn test_entries_only_reach_unvisited_pixels() {
        for (name, kernel) in &ALL {
            for &(dx, dy, _) in kernel.entries {
                assert!(dy >= 0, "{name} reaches a previous row");
                assert!(dy > 0 || dx > 0, "{name} reaches a visited pixel");
            }
        }
    }

    #[test]
    fn test_stevenson_arce_shape() {
        assert_eq!(STEVENSON_ARCE.entries.len(), 12);
        assert_eq!(STEVENSON_ARCE.max_dx(), 3);
        assert_eq!(STEVENSON_ARCE.divisor, 200);
    }
}

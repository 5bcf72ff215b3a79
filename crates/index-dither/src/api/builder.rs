//! DitherBuilder -- the fluent entry point for configuring an algorithm.

use std::sync::Arc;

use crate::dither::{
    Algorithm, DitherAlgorithm, ErrorDiffusionDither, NearestDither, OrderedDither, RandomDither,
    TemporalDither, ThresholdMatrix, DEFAULT_ERROR_STRENGTH, DEFAULT_ERROR_THRESHOLD,
    DEFAULT_TEMPORAL_THRESHOLD, MAX_STRENGTH, MIN_STRENGTH, NORMAL_STRENGTH, NORMAL_WEIGHT,
};
use crate::palette::{default_palette, Palette};

use super::DitherError;

/// Builder producing a shareable [`DitherAlgorithm`].
///
/// Settings that do not apply to the chosen algorithm are ignored, so one
/// configuration can be re-targeted by changing only
/// [`algorithm`](Self::algorithm).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use index_dither::{Algorithm, DitherBuilder, Palette};
///
/// let palette = Arc::new(Palette::opaque(&[0xFF00_0000, 0xFFFF_FFFF]).unwrap());
/// let dither = DitherBuilder::new()
///     .palette(palette)
///     .algorithm(Algorithm::Ordered)
///     .strength(1.5)
///     .build()
///     .unwrap();
///
/// let indices = dither.dither_into_bytes(&[0xFF80_8080; 16], 4);
/// assert_eq!(indices.len(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct DitherBuilder {
    palette: Option<Arc<Palette>>,
    algorithm: Algorithm,
    strength: f32,
    matrix: ThresholdMatrix,
    weight: i32,
    seed: Option<u64>,
    serpentine: bool,
    temporal_threshold: u32,
    error_threshold: u32,
    error_strength: f32,
}

impl Default for DitherBuilder {
    fn default() -> Self {
        Self {
            palette: None,
            algorithm: Algorithm::default(),
            strength: NORMAL_STRENGTH,
            matrix: ThresholdMatrix::default(),
            weight: NORMAL_WEIGHT as i32,
            seed: None,
            serpentine: true,
            temporal_threshold: DEFAULT_TEMPORAL_THRESHOLD,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            error_strength: DEFAULT_ERROR_STRENGTH,
        }
    }
}

impl DitherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Palette to dither against. Defaults to the shared built-in palette.
    pub fn palette(mut self, palette: Arc<Palette>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Select the algorithm by its kebab-case name.
    pub fn algorithm_name(self, name: &str) -> Result<Self, DitherError> {
        Ok(self.algorithm(name.parse()?))
    }

    /// Ordered dithering strength, `0.0..=2.0`.
    pub fn strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Ordered dithering threshold matrix (default Bayer 4×4).
    pub fn matrix(mut self, matrix: ThresholdMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    /// Random dithering noise amplitude, `0..=255`.
    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Random dithering seed. Unset means a fresh random seed per build.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Serpentine scanning for error diffusion (default `true`).
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    /// Largest per-channel drift, `0..=255`, for which temporal diffusion
    /// keeps last frame's index.
    pub fn temporal_threshold(mut self, threshold: u32) -> Self {
        self.temporal_threshold = threshold;
        self
    }

    /// Temporal diffusion skips spreading errors whose channel sum is at
    /// most this.
    pub fn error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    /// Fraction of the quantization error temporal diffusion spreads,
    /// `0.0..=1.0`.
    pub fn error_strength(mut self, strength: f32) -> Self {
        self.error_strength = strength;
        self
    }

    /// Validate parameters and build the algorithm.
    pub fn build(self) -> Result<Arc<dyn DitherAlgorithm>, DitherError> {
        let palette = self.palette.unwrap_or_else(default_palette);
        let algorithm: Arc<dyn DitherAlgorithm> = match self.algorithm {
            Algorithm::Nearest => Arc::new(NearestDither::new(palette)),
            Algorithm::Ordered => {
                if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&self.strength) {
                    return Err(DitherError::InvalidParameter {
                        name: "strength",
                        reason: format!("{} is outside {MIN_STRENGTH}..={MAX_STRENGTH}", self.strength),
                    });
                }
                Arc::new(OrderedDither::new(palette, self.matrix, self.strength))
            }
            Algorithm::Random => {
                let weight = u8::try_from(self.weight).map_err(|_| DitherError::InvalidParameter {
                    name: "weight",
                    reason: format!("{} is outside 0..=255", self.weight),
                })?;
                let seed = self.seed.unwrap_or_else(rand::random);
                Arc::new(RandomDither::new(palette, weight, seed))
            }
            Algorithm::TemporalFloydSteinberg => {
                if self.temporal_threshold > 255 {
                    return Err(DitherError::InvalidParameter {
                        name: "temporal_threshold",
                        reason: format!("{} is outside 0..=255", self.temporal_threshold),
                    });
                }
                if !(0.0..=1.0).contains(&self.error_strength) {
                    return Err(DitherError::InvalidParameter {
                        name: "error_strength",
                        reason: format!("{} is outside 0..=1", self.error_strength),
                    });
                }
                Arc::new(TemporalDither::new(
                    palette,
                    self.serpentine,
                    self.temporal_threshold,
                    self.error_threshold,
                    self.error_strength,
                ))
            }
            kernel_based => {
                let dither = ErrorDiffusionDither::new(palette, kernel_based, self.serpentine)
                    .ok_or_else(|| DitherError::UnknownAlgorithm(kernel_based.to_string()))?;
                Arc::new(dither)
            }
        };
        tracing::debug!(
            algorithm = %algorithm.algorithm(),
            palette = algorithm.palette().len(),
            "Built dither algorithm"
        );
        Ok(algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_white() -> Arc<Palette> {
        Arc::new(Palette::opaque(&[0xFF00_0000, 0xFFFF_FFFF]).unwrap())
    }

    #[test]
    fn test_builds_every_algorithm() {
        for algorithm in Algorithm::ALL {
            let built = DitherBuilder::new()
                .palette(black_white())
                .algorithm(algorithm)
                .seed(1)
                .build()
                .unwrap();
            assert_eq!(built.algorithm(), algorithm);
            assert_eq!(built.as_parallel().is_some(), !algorithm.is_error_diffusion());
        }
    }

    #[test]
    fn test_algorithm_name() {
        let builder = DitherBuilder::new().algorithm_name("burkes").unwrap();
        assert_eq!(builder.algorithm, Algorithm::Burkes);
        assert!(matches!(
            DitherBuilder::new().algorithm_name("nope"),
            Err(DitherError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_strength() {
        let result = DitherBuilder::new()
            .palette(black_white())
            .algorithm(Algorithm::Ordered)
            .strength(2.5)
            .build();
        assert!(matches!(result, Err(DitherError::InvalidParameter { name: "strength", .. })));
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        for weight in [-1, 256] {
            let result = DitherBuilder::new()
                .palette(black_white())
                .algorithm(Algorithm::Random)
                .weight(weight)
                .build();
            assert!(matches!(result, Err(DitherError::InvalidParameter { name: "weight", .. })));
        }
    }

    #[test]
    fn test_rejects_out_of_range_temporal_settings() {
        let base = || {
            DitherBuilder::new()
                .palette(black_white())
                .algorithm(Algorithm::TemporalFloydSteinberg)
        };
        assert!(matches!(
            base().temporal_threshold(256).build(),
            Err(DitherError::InvalidParameter { name: "temporal_threshold", .. })
        ));
        assert!(matches!(
            base().error_strength(1.5).build(),
            Err(DitherError::InvalidParameter { name: "error_strength", .. })
        ));
        let built = base().temporal_threshold(12).error_threshold(0).error_strength(0.5).build().unwrap();
        assert_eq!(built.algorithm(), Algorithm::TemporalFloydSteinberg);
    }

    #[test]
    fn test_irrelevant_settings_are_ignored() {
        let built = DitherBuilder::new()
            .palette(black_white())
            .algorithm(Algorithm::Nearest)
            .strength(99.0)
            .weight(-4)
            .build();
        assert!(built.is_ok());
    }

    #[test]
    fn test_palette_is_shared() {
        let palette = black_white();
        let built = DitherBuilder::new()
            .palette(palette.clone())
            .algorithm(Algorithm::Atkinson)
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(built.palette(), &palette));
    }
}

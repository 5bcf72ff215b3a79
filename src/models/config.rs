use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use index_dither::palette::preset;
use index_dither::{
    DitherAlgorithm, DitherBuilder, Palette, PaletteError, Rgb, ThresholdMatrix,
};
use rayon::ThreadPool;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::PlayerOptions;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Preset name or explicit list of hex colors
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Keep index 0 as the transparent slot (explicit color lists only)
    #[serde(default = "default_true")]
    pub reserve_transparent: bool,

    /// Algorithm name, e.g. "floyd-steinberg" or "ordered"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Ordered dithering strength
    #[serde(default = "default_strength")]
    pub strength: f32,

    /// Random dithering noise amplitude
    #[serde(default = "default_weight")]
    pub weight: i32,

    /// Fixed random seed; unset picks a fresh one at startup
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_true")]
    pub serpentine: bool,

    /// Threshold matrix name for ordered dithering
    #[serde(default = "default_matrix")]
    pub matrix: String,

    /// Per-channel drift under which temporal diffusion keeps last frame's index
    #[serde(default = "default_temporal_threshold")]
    pub temporal_threshold: u32,

    /// Error channel sum at or below which temporal diffusion spreads nothing
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,

    /// Fraction of error temporal diffusion spreads
    #[serde(default = "default_error_strength")]
    pub error_strength: f32,

    /// Size of the dedicated dither pool; unset dithers on the player thread
    #[serde(default)]
    pub dither_threads: Option<usize>,

    /// Back-off when the source has no frame ready
    #[serde(default = "default_empty_frame_wait")]
    pub empty_frame_wait_ms: u64,

    /// How long release() waits for the player thread
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_ms: u64,
}

/// Either a preset name or a list of colors.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PaletteConfig {
    Preset(String),
    Colors(Vec<String>),
}

impl Default for PaletteConfig {
    fn default() -> Self {
        PaletteConfig::Preset("default".to_string())
    }
}

fn default_true() -> bool {
    true
}

fn default_algorithm() -> String {
    "floyd-steinberg".to_string()
}

fn default_strength() -> f32 {
    index_dither::dither::NORMAL_STRENGTH
}

fn default_weight() -> i32 {
    index_dither::dither::NORMAL_WEIGHT as i32
}

fn default_matrix() -> String {
    "bayer-4".to_string()
}

fn default_temporal_threshold() -> u32 {
    index_dither::dither::DEFAULT_TEMPORAL_THRESHOLD
}

fn default_error_threshold() -> u32 {
    index_dither::dither::DEFAULT_ERROR_THRESHOLD
}

fn default_error_strength() -> f32 {
    index_dither::dither::DEFAULT_ERROR_STRENGTH
}

fn default_empty_frame_wait() -> u64 {
    50
}

fn default_shutdown_grace() -> u64 {
    5000
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        algorithm = %config.algorithm,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Dedicated rayon pool for palette builds and band-parallel dithering.
    pub fn build_dither_pool(&self) -> Result<Option<Arc<ThreadPool>>, ConfigError> {
        let Some(threads) = self.dither_threads else {
            return Ok(None);
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dither-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;
        Ok(Some(Arc::new(pool)))
    }

    pub fn build_palette(&self, pool: Option<&Arc<ThreadPool>>) -> Result<Arc<Palette>, ConfigError> {
        match &self.palette {
            PaletteConfig::Preset(name) => {
                preset(name).ok_or_else(|| ConfigError::UnknownPalette(name.clone()))
            }
            PaletteConfig::Colors(colors) => {
                let packed = colors
                    .iter()
                    .map(|s| {
                        s.parse::<Rgb>()
                            .map(Rgb::to_packed)
                            .map_err(|source| PaletteError::InvalidColor {
                                input: s.clone(),
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut builder = Palette::builder(packed).reserve_transparent(self.reserve_transparent);
                if let Some(pool) = pool {
                    builder = builder.pool(Arc::clone(pool));
                }
                Ok(Arc::new(builder.build()?))
            }
        }
    }

    pub fn build_dither(&self, palette: Arc<Palette>) -> Result<Arc<dyn DitherAlgorithm>, ConfigError> {
        let matrix: ThresholdMatrix = self.matrix.parse()?;
        let mut builder = DitherBuilder::new()
            .palette(palette)
            .algorithm_name(&self.algorithm)?
            .strength(self.strength)
            .matrix(matrix)
            .weight(self.weight)
            .serpentine(self.serpentine)
            .temporal_threshold(self.temporal_threshold)
            .error_threshold(self.error_threshold)
            .error_strength(self.error_strength);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        Ok(builder.build()?)
    }

    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            empty_frame_wait: Duration::from_millis(self.empty_frame_wait_ms),
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
            ..PlayerOptions::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: PaletteConfig::default(),
            reserve_transparent: true,
            algorithm: default_algorithm(),
            strength: default_strength(),
            weight: default_weight(),
            seed: None,
            serpentine: true,
            matrix: default_matrix(),
            temporal_threshold: default_temporal_threshold(),
            error_threshold: default_error_threshold(),
            error_strength: default_error_strength(),
            dither_threads: None,
            empty_frame_wait_ms: default_empty_frame_wait(),
            shutdown_grace_ms: default_shutdown_grace(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_dither::Algorithm;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.palette, PaletteConfig::Preset("default".to_string()));
        assert_eq!(config.algorithm, "floyd-steinberg");
        assert_eq!(config.matrix, "bayer-4");
        assert_eq!(config.empty_frame_wait_ms, 50);
        assert_eq!(config.shutdown_grace_ms, 5000);
        assert!(config.serpentine);
        assert!(config.dither_threads.is_none());
    }

    #[test]
    fn test_empty_yaml_matches_default() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.palette, default.palette);
        assert_eq!(config.algorithm, default.algorithm);
        assert_eq!(config.weight, default.weight);
        assert_eq!(config.shutdown_grace_ms, default.shutdown_grace_ms);
    }

    #[test]
    fn test_parse_color_list() {
        let yaml = r##"
palette: ["#000000", "#FFFFFF", "#FF0000"]
reserve_transparent: false
algorithm: ordered
strength: 1.5
matrix: bayer-8
"##;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        let palette = config.build_palette(None).unwrap();
        assert_eq!(palette.len(), 3);
        assert!(!palette.reserves_transparent());
        assert_eq!(palette.color(2), 0xFFFF_0000);

        let dither = config.build_dither(palette).unwrap();
        assert_eq!(dither.algorithm(), Algorithm::Ordered);
    }

    #[test]
    fn test_preset_palette() {
        let config = AppConfig::from_yaml_str("palette: eight-bit").unwrap();
        let palette = config.build_palette(None).unwrap();
        assert_eq!(palette.len(), 8);
    }

    #[test]
    fn test_unknown_preset() {
        let config = AppConfig::from_yaml_str("palette: sepia").unwrap();
        assert!(matches!(
            config.build_palette(None),
            Err(ConfigError::UnknownPalette(name)) if name == "sepia"
        ));
    }

    #[test]
    fn test_bad_color_is_reported() {
        let config = AppConfig::from_yaml_str(r##"palette: ["#000000", "#GG0000"]"##).unwrap();
        let err = config.build_palette(None).unwrap_err();
        assert!(err.to_string().contains("#GG0000"), "{err}");
    }

    #[test]
    fn test_temporal_settings() {
        let yaml = "algorithm: temporal-floyd-steinberg\ntemporal_threshold: 300\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.error_threshold, 4);
        assert_eq!(config.error_strength, 1.0);
        let palette = config.build_palette(None).unwrap();
        assert!(matches!(config.build_dither(palette.clone()), Err(ConfigError::Dither(_))));

        let config = AppConfig::from_yaml_str("algorithm: temporal-floyd-steinberg\nerror_strength: 0.5").unwrap();
        let dither = config.build_dither(palette).unwrap();
        assert_eq!(dither.algorithm(), Algorithm::TemporalFloydSteinberg);
    }

    #[test]
    fn test_unknown_algorithm() {
        let config = AppConfig::from_yaml_str("algorithm: sparkle").unwrap();
        let palette = config.build_palette(None).unwrap();
        assert!(matches!(config.build_dither(palette), Err(ConfigError::Dither(_))));
    }

    #[test]
    fn test_dither_pool() {
        let config = AppConfig::from_yaml_str("dither_threads: 2").unwrap();
        let pool = config.build_dither_pool().unwrap().unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        assert!(AppConfig::default().build_dither_pool().unwrap().is_none());
    }

    #[test]
    fn test_player_options() {
        let config = AppConfig::from_yaml_str("empty_frame_wait_ms: 10\nshutdown_grace_ms: 250").unwrap();
        let options = config.player_options();
        assert_eq!(options.empty_frame_wait, Duration::from_millis(10));
        assert_eq!(options.shutdown_grace, Duration::from_millis(250));
    }
}

//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unload threshold as a multiple of the tile size when not set explicitly.
const UNLOAD_DISTANCE_FACTOR: f64 = 1.8;
/// Load threshold as a multiple of the tile size when not set explicitly.
const MIN_DISPLAY_DISTANCE_FACTOR: f64 = 0.9;
/// Smallest heightmap resolution a world layout accepts.
const MIN_HEIGHTMAP_RESOLUTION: u32 = 32;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shape of the tiled world and its heightfields.
    pub world: WorldConfig,
    /// Load/unload thresholds and tile source selection.
    pub streaming: StreamingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World layout and heightfield synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Playable tiles per world side.
    pub dimension: u32,
    /// Surround the playable area with a one-tile ring of ridge tiles.
    pub border_ring: bool,
    /// World units per tile side.
    pub grid_size: f64,
    /// Heightfield samples per tile side.
    pub heightmap_resolution: u32,
    /// Splat map texels per tile side.
    pub alphamap_resolution: u32,
    /// World units corresponding to a heightfield sample of 1.0.
    pub max_height: f64,
    /// Noise frequency multiplier over the whole world.
    pub noise_scale: f64,
    /// Noise seed.
    pub seed: u32,
}

/// Where loaded tiles get their heightfields from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Generate on the ticking thread when the load starts.
    Procedural,
    /// Generate on a background worker; the load completes on a later tick.
    ProceduralBackground,
    /// Load prebuilt `Map_{x}-{y}` assets from `asset_dir`.
    Assets,
}

/// Streaming thresholds and source selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Loaded tiles farther than this are unloaded. `None` derives it from the tile size.
    pub unload_distance: Option<f64>,
    /// Unloaded tiles closer than this are loaded. `None` derives it from the tile size.
    pub min_display_distance: Option<f64>,
    /// Keep heightfields across unloads so reloading skips regeneration.
    pub retain_heightfields: bool,
    /// Heightfield source.
    pub source: SourceKind,
    /// Directory holding prebuilt tile assets for [`SourceKind::Assets`].
    pub asset_dir: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimension: 8,
            border_ring: true,
            grid_size: 500.0,
            heightmap_resolution: 129,
            alphamap_resolution: 128,
            max_height: 600.0,
            noise_scale: 10.0,
            seed: 0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            unload_distance: None,
            min_display_distance: None,
            retain_heightfields: false,
            source: SourceKind::Procedural,
            asset_dir: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Derived values ---

impl Config {
    /// Effective unload distance in world units.
    pub fn unload_distance(&self) -> f64 {
        self.streaming
            .unload_distance
            .unwrap_or(self.world.grid_size * UNLOAD_DISTANCE_FACTOR)
    }

    /// Effective minimum display (load) distance in world units.
    pub fn min_display_distance(&self) -> f64 {
        self.streaming
            .min_display_distance
            .unwrap_or(self.world.grid_size * MIN_DISPLAY_DISTANCE_FACTOR)
    }

    /// Tiles per world side, including the border ring when enabled.
    pub fn world_width(&self) -> u32 {
        if self.world.border_ring {
            self.world.dimension + 2
        } else {
            self.world.dimension
        }
    }

    /// Reject configurations the streamer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.dimension == 0 {
            return Err(ConfigError::Invalid("dimension must be at least 1".into()));
        }
        if self.world.grid_size.is_nan() || self.world.grid_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be positive, got {}",
                self.world.grid_size
            )));
        }
        if self.world.heightmap_resolution < MIN_HEIGHTMAP_RESOLUTION {
            return Err(ConfigError::Invalid(format!(
                "heightmap_resolution must be at least {MIN_HEIGHTMAP_RESOLUTION}, got {}",
                self.world.heightmap_resolution
            )));
        }
        if self.world.alphamap_resolution == 0 {
            return Err(ConfigError::Invalid("alphamap_resolution must be at least 1".into()));
        }
        let unload = self.unload_distance();
        let display = self.min_display_distance();
        if display <= 0.0 || unload <= display {
            return Err(ConfigError::Invalid(format!(
                "unload_distance ({unload}) must exceed min_display_distance ({display}) > 0"
            )));
        }
        if self.streaming.source == SourceKind::Assets && self.streaming.asset_dir.is_none() {
            return Err(ConfigError::Invalid(
                "asset source selected without an asset_dir".into(),
            ));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

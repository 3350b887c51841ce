//! Command-line argument parsing for Terrastream.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, SourceKind};

/// Terrastream command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(
    name = "terrastream",
    about = "Streams a tiled heightfield world around a walking observer"
)]
pub struct CliArgs {
    /// Playable tiles per world side.
    #[arg(long)]
    pub dimension: Option<u32>,

    /// World units per tile side.
    #[arg(long)]
    pub grid_size: Option<f64>,

    /// Heightfield samples per tile side.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Unload tiles farther than this many world units.
    #[arg(long)]
    pub unload_distance: Option<f64>,

    /// Load tiles closer than this many world units.
    #[arg(long)]
    pub min_display_distance: Option<f64>,

    /// Heightfield source.
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Directory of prebuilt `Map_{x}-{y}.ron` tile assets.
    #[arg(long)]
    pub asset_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of fixed-rate simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    pub ticks: u64,

    /// Observer walking speed in world units per second.
    #[arg(long, default_value_t = 120.0)]
    pub speed: f64,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(d) = args.dimension {
            self.world.dimension = d;
        }
        if let Some(g) = args.grid_size {
            self.world.grid_size = g;
        }
        if let Some(r) = args.resolution {
            self.world.heightmap_resolution = r;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(u) = args.unload_distance {
            self.streaming.unload_distance = Some(u);
        }
        if let Some(m) = args.min_display_distance {
            self.streaming.min_display_distance = Some(m);
        }
        if let Some(source) = args.source {
            self.streaming.source = source;
        }
        if let Some(ref dir) = args.asset_dir {
            self.streaming.asset_dir = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            dimension: None,
            grid_size: None,
            resolution: None,
            seed: None,
            unload_distance: None,
            min_display_distance: None,
            source: None,
            asset_dir: None,
            log_level: None,
            config: None,
            ticks: 600,
            speed: 120.0,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            dimension: Some(3),
            seed: Some(7),
            source: Some(SourceKind::ProceduralBackground),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.dimension, 3);
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.streaming.source, SourceKind::ProceduralBackground);
        // Non-overridden fields retain defaults
        assert_eq!(config.world.heightmap_resolution, 129);
        assert_eq!(config.streaming.unload_distance, None);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "terrastream",
            "--grid-size",
            "10",
            "--source",
            "assets",
            "--asset-dir",
            "tiles",
            "--ticks",
            "30",
        ]);
        assert_eq!(args.grid_size, Some(10.0));
        assert_eq!(args.source, Some(SourceKind::Assets));
        assert_eq!(args.ticks, 30);
        assert_eq!(args.speed, 120.0);
    }
}

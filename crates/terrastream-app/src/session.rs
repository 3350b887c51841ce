//! A headless streaming session: an observer walking across the world while
//! zones stream in and out around it.

use std::sync::Arc;

use glam::DVec3;
use terrastream_config::{Config, SourceKind};
use terrastream_terrain::{HeightfieldGenerator, TerrainError, WorldLayout};
use terrastream_zones::{
    AssetError, AssetSource, BackgroundSource, DirectoryLoader, DistanceScheduler,
    HeadlessBackend, HeightfieldSource, ProceduralSource, SourceError, ZoneLifecycle,
    ZoneStreamer, spawn_position,
};
use tracing::info;

use crate::game_loop::{FIXED_DT, GameLoop};

/// Simulated frame length; two fixed steps per frame.
const FRAME_TIME: f64 = 2.0 * FIXED_DT;

/// Fatal session setup failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid world layout: {0}")]
    Layout(#[from] TerrainError),
    #[error("failed to start heightfield source: {0}")]
    Source(#[from] SourceError),
    #[error("failed to start asset loader: {0}")]
    Assets(#[from] AssetError),
    #[error("asset source selected without an asset directory")]
    NoAssetDir,
}

/// Totals gathered over a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub ticks: u64,
    /// Fixed simulation steps, including any past the last tick.
    pub sim_steps: u64,
    pub loads_completed: u64,
    pub loads_failed: u64,
    pub loads_rejected: u64,
    pub unloads: u64,
    pub loaded_zones: usize,
    pub live_surfaces: usize,
    pub final_position: DVec3,
}

/// World layout described by the config.
pub fn build_layout(config: &Config) -> Result<WorldLayout, TerrainError> {
    let world = &config.world;
    WorldLayout::new(
        world.dimension,
        world.border_ring,
        world.heightmap_resolution,
        world.grid_size,
        world.max_height,
        world.noise_scale,
    )
}

/// The heightfield source selected in the config.
pub fn build_source(
    config: &Config,
    generator: Arc<HeightfieldGenerator>,
) -> Result<Box<dyn HeightfieldSource>, SessionError> {
    Ok(match config.streaming.source {
        SourceKind::Procedural => Box::new(ProceduralSource::new(generator)),
        SourceKind::ProceduralBackground => Box::new(BackgroundSource::spawn(generator)?),
        SourceKind::Assets => {
            let dir = config
                .streaming
                .asset_dir
                .clone()
                .ok_or(SessionError::NoAssetDir)?;
            Box::new(AssetSource::new(DirectoryLoader::spawn(dir)?))
        }
    })
}

/// Observer walking diagonally at constant speed, turning back at the world edge.
#[derive(Clone, Copy, Debug)]
struct Walker {
    position: DVec3,
    velocity: DVec3,
    extent: f64,
}

impl Walker {
    fn new(start: DVec3, speed: f64, extent: f64) -> Self {
        let step = speed / std::f64::consts::SQRT_2;
        Self {
            position: start,
            velocity: DVec3::new(step, 0.0, step),
            extent,
        }
    }

    fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        if self.position.x >= self.extent || self.position.x <= 0.0 {
            self.velocity.x = -self.velocity.x;
            self.position.x = self.position.x.clamp(0.0, self.extent);
        }
        if self.position.z >= self.extent || self.position.z <= 0.0 {
            self.velocity.z = -self.velocity.z;
            self.position.z = self.position.z.clamp(0.0, self.extent);
        }
    }
}

/// Run `ticks` fixed-rate streaming ticks with the observer walking at `speed`.
pub fn run(config: &Config, ticks: u64, speed: f64) -> Result<SessionSummary, SessionError> {
    let layout = build_layout(config)?;
    let generator = Arc::new(HeightfieldGenerator::new(layout.clone(), config.world.seed));
    let source = build_source(config, Arc::clone(&generator))?;

    let lifecycle = ZoneLifecycle::new(layout.clone(), HeadlessBackend::new(), source)
        .with_retained_heightfields(config.streaming.retain_heightfields)
        .with_alphamap_resolution(config.world.alphamap_resolution as usize);
    let scheduler = DistanceScheduler::new(
        layout.grid_size(),
        config.unload_distance(),
        config.min_display_distance(),
    );
    let mut streamer = ZoneStreamer::new(lifecycle, scheduler);

    let extent = f64::from(layout.width()) * layout.grid_size();
    let mut walker = Walker::new(spawn_position(&generator), speed, extent);
    info!(
        width = layout.width(),
        resolution = layout.resolution(),
        source = ?config.streaming.source,
        x = walker.position.x,
        y = walker.position.y,
        z = walker.position.z,
        "starting streaming session"
    );

    let mut summary = SessionSummary::default();
    let mut game_loop = GameLoop::new();
    while summary.ticks < ticks {
        game_loop.advance(FRAME_TIME, |dt, _| {
            if summary.ticks >= ticks {
                return;
            }
            walker.advance(dt);
            let report = streamer.tick(&walker.position);
            summary.ticks += 1;
            summary.loads_completed += report.load_completed.len() as u64;
            summary.loads_failed += report.load_failed.len() as u64;
            summary.loads_rejected += u64::from(report.rejected.is_some());
            summary.unloads += u64::from(report.unloaded.is_some());
        });
    }

    summary.sim_steps = game_loop.update_count();
    summary.loaded_zones = streamer.loaded_count();
    summary.live_surfaces = streamer.lifecycle().backend().live_count();
    summary.final_position = walker.position;
    info!(
        sim_seconds = game_loop.total_sim_time(),
        frames = game_loop.frame_count(),
        "streaming session finished"
    );
    Ok(summary)
}

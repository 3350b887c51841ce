//! Per-tick driver tying the scheduler to the lifecycle.

use glam::DVec3;
use terrastream_terrain::HeightfieldGenerator;

use crate::backend::TerrainBackend;
use crate::coord::TileCoord;
use crate::error::ZoneError;
use crate::grid::ZoneGrid;
use crate::lifecycle::{LoadProgress, ZoneLifecycle};
use crate::scheduler::DistanceScheduler;
use crate::source::HeightfieldSource;
use crate::zone::ZoneState;

/// Supplies the observer position once per tick.
pub trait PositionSource {
    fn current_position(&self) -> DVec3;
}

impl PositionSource for DVec3 {
    fn current_position(&self) -> DVec3 {
        *self
    }
}

/// Sample (row and column) whose height places the spawn point.
const SPAWN_SAMPLE: usize = 10;

/// Where an observer starts: just inside the first playable tile, standing on
/// its terrain.
pub fn spawn_position(generator: &HeightfieldGenerator) -> DVec3 {
    let layout = generator.layout();
    let first = u32::from(layout.has_border_ring());
    let sample = SPAWN_SAMPLE.min(layout.resolution() as usize - 1);
    let height = generator.sample(first, first, sample, sample) * layout.max_height();
    let offset = (f64::from(first) + 0.1) * layout.grid_size();
    DVec3::new(offset, height, offset)
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub unloaded: Option<TileCoord>,
    pub load_started: Option<TileCoord>,
    pub load_completed: Vec<TileCoord>,
    pub load_failed: Vec<TileCoord>,
    /// A load the scheduler wanted but the single-flight token refused.
    pub rejected: Option<TileCoord>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        *self == TickReport::default()
    }

    fn record(&mut self, progress: &LoadProgress) {
        match progress {
            LoadProgress::Pending(_) => {}
            LoadProgress::Loaded(coord) => self.load_completed.push(*coord),
            LoadProgress::Failed { coord, .. } => self.load_failed.push(*coord),
        }
    }
}

/// Streams zones in and out around a moving observer.
pub struct ZoneStreamer<B: TerrainBackend, S> {
    lifecycle: ZoneLifecycle<B, S>,
    scheduler: DistanceScheduler,
    ticks: u64,
}

impl<B: TerrainBackend, S: HeightfieldSource> ZoneStreamer<B, S> {
    pub fn new(lifecycle: ZoneLifecycle<B, S>, scheduler: DistanceScheduler) -> Self {
        Self {
            lifecycle,
            scheduler,
            ticks: 0,
        }
    }

    pub fn lifecycle(&self) -> &ZoneLifecycle<B, S> {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut ZoneLifecycle<B, S> {
        &mut self.lifecycle
    }

    pub fn scheduler(&self) -> &DistanceScheduler {
        &self.scheduler
    }

    pub fn grid(&self) -> &ZoneGrid<B::Surface> {
        self.lifecycle.grid()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn loaded_count(&self) -> usize {
        self.grid().count_in_state(ZoneState::Loaded)
    }

    /// Run one tick: drive the in-flight load, then unload at most one
    /// far zone or start loading the nearest eligible one.
    pub fn tick(&mut self, observer: &impl PositionSource) -> TickReport {
        self.ticks += 1;
        self.lifecycle.swap_events();
        let mut report = TickReport::default();

        if let Some(progress) = self.lifecycle.poll() {
            report.record(&progress);
        }

        let position = observer.current_position();
        let plan = self.scheduler.plan(self.lifecycle.grid(), position);

        if let Some(coord) = plan.unload {
            match self.lifecycle.unload(coord) {
                Ok(true) => report.unloaded = Some(coord),
                Ok(false) => {}
                Err(err) => tracing::warn!(x = coord.x, y = coord.y, %err, "unload refused"),
            }
        }

        if let Some(coord) = plan.load {
            match self.lifecycle.start_load(coord) {
                Ok(progress) => {
                    report.load_started = Some(coord);
                    report.record(&progress);
                }
                Err(ZoneError::LoadInFlight { .. }) => report.rejected = Some(coord),
                Err(ZoneError::Source { .. }) => report.load_failed.push(coord),
                Err(err) => tracing::warn!(x = coord.x, y = coord.y, %err, "load refused"),
            }
        }

        if !report.is_idle() {
            tracing::debug!(
                tick = self.ticks,
                x = position.x,
                z = position.z,
                ?report,
                "streaming tick"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::task::Poll;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rustc_hash::FxHashMap;
    use terrastream_terrain::{Heightfield, WorldLayout};

    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::error::SourceError;
    use crate::source::ProceduralSource;

    const GRID: f64 = 10.0;

    fn layout(dimension: u32, border: bool) -> WorldLayout {
        WorldLayout::new(dimension, border, 33, GRID, 100.0, 3.0).unwrap()
    }

    fn procedural_streamer(dimension: u32) -> ZoneStreamer<HeadlessBackend, ProceduralSource> {
        let layout = layout(dimension, false);
        let generator = Arc::new(HeightfieldGenerator::new(layout.clone(), 21));
        let lifecycle =
            ZoneLifecycle::new(layout, HeadlessBackend::new(), ProceduralSource::new(generator));
        ZoneStreamer::new(lifecycle, DistanceScheduler::new(GRID, 18.0, 9.0))
    }

    /// Each request completes after a random number of pending polls.
    struct DelayedSource {
        rng: ChaCha8Rng,
        delays: std::ops::Range<u32>,
        pending: FxHashMap<TileCoord, u32>,
    }

    impl DelayedSource {
        fn new(seed: u64, delays: std::ops::Range<u32>) -> Self {
            Self {
                rng: ChaCha8Rng::seed_from_u64(seed),
                delays,
                pending: FxHashMap::default(),
            }
        }
    }

    impl HeightfieldSource for DelayedSource {
        fn request(&mut self, coord: TileCoord) -> Result<(), SourceError> {
            let delay = self.rng.random_range(self.delays.clone());
            self.pending.insert(coord, delay);
            Ok(())
        }

        fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>> {
            let Some(left) = self.pending.get_mut(&coord) else {
                return Poll::Ready(Err(SourceError::NotRequested(coord)));
            };
            if *left > 0 {
                *left -= 1;
                return Poll::Pending;
            }
            self.pending.remove(&coord);
            Poll::Ready(Ok(Heightfield::new(4, 4)))
        }
    }

    #[test]
    fn test_first_tick_loads_observer_tile() {
        let mut streamer = procedural_streamer(3);
        let report = streamer.tick(&DVec3::new(15.0, 0.0, 15.0));
        assert_eq!(report.load_started, Some(TileCoord::new(1, 1)));
        assert_eq!(report.load_completed, vec![TileCoord::new(1, 1)]);
        assert_eq!(streamer.loaded_count(), 1);
        assert_eq!(streamer.ticks(), 1);
    }

    #[test]
    fn test_walk_away_unloads_far_tiles() {
        let mut streamer = procedural_streamer(4);
        let start = DVec3::new(5.0, 0.0, 5.0);
        for _ in 0..10 {
            streamer.tick(&start);
        }
        let near = streamer.loaded_count();
        assert!(near >= 3, "expected the start tile and its neighbours, got {near}");
        assert!(streamer.grid().get(TileCoord::new(0, 0)).unwrap().is_loaded());

        let far = DVec3::new(35.0, 0.0, 35.0);
        let mut unloaded = Vec::new();
        for _ in 0..20 {
            let report = streamer.tick(&far);
            if report.unloaded.is_some() {
                assert!(report.load_started.is_none(), "unloading tick must not load");
            }
            unloaded.extend(report.unloaded);
        }
        assert!(unloaded.contains(&TileCoord::new(0, 0)), "unloaded {unloaded:?}");
        assert!(!streamer.grid().get(TileCoord::new(0, 0)).unwrap().is_loaded());
        assert!(streamer.grid().get(TileCoord::new(3, 3)).unwrap().is_loaded());
    }

    #[test]
    fn test_one_unload_per_tick() {
        let mut streamer = procedural_streamer(4);
        for position in [
            DVec3::new(5.0, 0.0, 5.0),
            DVec3::new(15.0, 0.0, 5.0),
            DVec3::new(5.0, 0.0, 15.0),
        ] {
            for _ in 0..4 {
                streamer.tick(&position);
            }
        }
        let loaded_before = streamer.loaded_count();
        assert!(loaded_before >= 3);

        let report = streamer.tick(&DVec3::new(1000.0, 0.0, 1000.0));
        assert!(report.unloaded.is_some());
        assert_eq!(streamer.loaded_count(), loaded_before - 1);
    }

    #[test]
    fn test_rejection_reported_while_loading() {
        let source = DelayedSource::new(1, 5..6);
        let lifecycle = ZoneLifecycle::new(layout(3, false), HeadlessBackend::new(), source);
        let mut streamer = ZoneStreamer::new(lifecycle, DistanceScheduler::new(GRID, 18.0, 9.0));

        // On the shared edge of (0,0) and (1,0): both are at distance zero.
        let observer = DVec3::new(10.0, 0.0, 5.0);
        let first = streamer.tick(&observer);
        assert_eq!(first.load_started, Some(TileCoord::new(0, 0)));
        assert!(first.load_completed.is_empty());

        let second = streamer.tick(&observer);
        assert_eq!(second.rejected, Some(TileCoord::new(1, 0)), "report {second:?}");
        assert_eq!(streamer.lifecycle().in_flight(), Some(TileCoord::new(0, 0)));
        assert_eq!(
            streamer.grid().get(TileCoord::new(1, 0)).unwrap().state(),
            ZoneState::Unloaded
        );
    }

    #[test]
    fn test_single_flight_across_random_walk() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let source = DelayedSource::new(7, 0..4);
        let lifecycle = ZoneLifecycle::new(layout(6, true), HeadlessBackend::new(), source);
        let mut streamer = ZoneStreamer::new(lifecycle, DistanceScheduler::new(GRID, 18.0, 9.0));

        let mut position = DVec3::new(15.0, 0.0, 15.0);
        for tick in 0..3000 {
            position.x = (position.x + rng.random_range(-4.0..4.0)).clamp(0.0, 80.0);
            position.z = (position.z + rng.random_range(-4.0..4.0)).clamp(0.0, 80.0);
            streamer.tick(&position);

            let loading = streamer.grid().count_in_state(ZoneState::Loading);
            assert!(loading <= 1, "tick {tick}: {loading} zones loading");
            assert_eq!(
                streamer.lifecycle().backend().live_count(),
                streamer.loaded_count(),
                "tick {tick}: surfaces leaked"
            );
        }
        assert!(streamer.lifecycle().backend().created_count() > 10);
    }

    #[test]
    fn test_spawn_position_sits_inside_first_playable_tile() {
        let with_border = HeightfieldGenerator::new(layout(4, true), 9);
        let p = spawn_position(&with_border);
        assert!((p.x - 11.0).abs() < 1e-9 && (p.z - 11.0).abs() < 1e-9, "got {p:?}");
        let expected = with_border.sample(1, 1, 10, 10) * 100.0;
        assert!((p.y - expected).abs() < 1e-9, "height {} vs {expected}", p.y);

        let without = HeightfieldGenerator::new(layout(4, false), 9);
        let p = spawn_position(&without);
        assert!((p.x - 1.0).abs() < 1e-9, "got {p:?}");
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec3;
use terrastream_terrain::{HeightfieldGenerator, WorldLayout};
use terrastream_zones::{
    AssetNode, AssetSource, DirectoryLoader, DistanceScheduler, HeadlessBackend, ProceduralSource,
    TileAsset, TileCoord, ZoneEvent, ZoneLifecycle, ZoneState, ZoneStreamer, asset_name,
    spawn_position, sqr_distance,
};

const GRID: f64 = 50.0;

fn layout() -> WorldLayout {
    WorldLayout::new(4, true, 33, GRID, 200.0, 4.0).unwrap()
}

#[test]
fn test_diagonal_walk_streams_whole_world() {
    let layout = layout();
    let generator = Arc::new(HeightfieldGenerator::new(layout.clone(), 1234));
    let lifecycle = ZoneLifecycle::new(
        layout.clone(),
        HeadlessBackend::new(),
        ProceduralSource::new(Arc::clone(&generator)),
    );
    let scheduler = DistanceScheduler::new(GRID, GRID * 1.8, GRID * 0.9);
    let mut streamer = ZoneStreamer::new(lifecycle, scheduler);

    let mut position = spawn_position(&generator);
    let mut ever_loaded = Vec::new();
    let far = f64::from(layout.width()) * GRID - 1.0;
    while position.x < far {
        let report = streamer.tick(&position);
        ever_loaded.extend(report.load_completed);

        assert!(streamer.grid().count_in_state(ZoneState::Loading) <= 1);
        if let Some(coord) = report.unloaded {
            let d = sqr_distance(position, coord, GRID);
            assert!(d > (GRID * 1.8).powi(2), "unloaded {coord} at squared distance {d}");
        }

        position += DVec3::new(2.0, 0.0, 2.0);
    }

    for i in 0..layout.width() as i32 {
        assert!(
            ever_loaded.contains(&TileCoord::new(i, i)),
            "diagonal tile ({i}, {i}) never loaded"
        );
    }
    let backend = streamer.lifecycle().backend();
    assert_eq!(backend.live_count(), streamer.loaded_count());
    assert!(backend.destroyed_count() > 0, "walking across the world should unload tiles");
}

fn write_asset(dir: &std::path::Path, asset: &TileAsset) {
    let text = ron::ser::to_string(asset).unwrap();
    std::fs::write(dir.join(format!("{}.ron", asset.name)), text).unwrap();
}

#[test]
fn test_asset_directory_streaming() {
    let layout = WorldLayout::new(2, false, 33, GRID, 200.0, 4.0).unwrap();
    let generator = HeightfieldGenerator::new(layout.clone(), 99);
    let dir = tempfile::tempdir().unwrap();

    for y in 0..2 {
        for x in 0..2 {
            let coord = TileCoord::new(x, y);
            let name = asset_name(coord);
            let asset = if coord == TileCoord::new(1, 1) {
                // Exported without its terrain object.
                TileAsset {
                    name,
                    children: vec![AssetNode {
                        name: "Props".into(),
                        terrain: None,
                    }],
                }
            } else {
                TileAsset::with_terrain(name, generator.generate(x as u32, y as u32))
            };
            write_asset(dir.path(), &asset);
        }
    }

    let source = AssetSource::new(DirectoryLoader::spawn(dir.path()).unwrap());
    let lifecycle = ZoneLifecycle::new(layout, HeadlessBackend::new(), source);
    let scheduler = DistanceScheduler::new(GRID, 1000.0, 200.0);
    let mut streamer = ZoneStreamer::new(lifecycle, scheduler);

    // The corner shared by all four tiles: every tile is at distance zero.
    let observer = DVec3::new(50.0, 0.0, 50.0);
    let broken = TileCoord::new(1, 1);
    let mut failures = 0;
    let mut failure_events = 0;
    let deadline = Instant::now() + Duration::from_secs(20);
    while streamer.loaded_count() < 3 || failures == 0 {
        let report = streamer.tick(&observer);
        failures += report.load_failed.len();
        failure_events += streamer
            .lifecycle()
            .events()
            .current()
            .iter()
            .filter(|e| matches!(e, ZoneEvent::LoadFailed { coord, .. } if *coord == broken))
            .count();
        assert!(streamer.grid().count_in_state(ZoneState::Loading) <= 1);
        assert!(Instant::now() < deadline, "assets did not stream within 20s");
        std::thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(failures, failure_events, "every failed load is reported as an event");
    let zone = streamer.grid().get(broken).unwrap();
    assert_ne!(zone.state(), ZoneState::Loaded);
    assert!(zone.surface().is_none());

    let center = streamer.grid().get(TileCoord::new(0, 0)).unwrap();
    assert!(center.is_loaded());
    assert!(center.neighbors().east.is_some());
    assert!(center.neighbors().north.is_some());
    assert_eq!(center.neighbors().count(), 2);
}

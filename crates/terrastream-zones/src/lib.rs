//! Distance-driven streaming of terrain zones.
//!
//! A fixed [`ZoneGrid`] holds one [`Zone`] per tile. Each tick the
//! [`DistanceScheduler`] picks at most one far zone to unload and, failing
//! that, the nearest eligible zone to load. [`ZoneLifecycle`] carries out the
//! transition with a single in-flight load, builds surfaces through a
//! [`TerrainBackend`] and re-stitches neighbour links around every change.
//! [`ZoneStreamer`] runs the whole loop for a moving observer.

mod assets;
mod backend;
mod coord;
mod error;
mod events;
mod grid;
mod lifecycle;
mod scheduler;
mod source;
mod streamer;
mod zone;

pub use assets::{
    AssetNode, DirectoryLoader, ResourceLoader, TERRAIN_NODE, TileAsset, asset_name,
};
pub use backend::{
    HeadlessBackend, HeadlessSurface, Neighbors, SurfaceId, SurfaceRequest, TerrainBackend,
};
pub use coord::{Direction, TileCoord};
pub use error::{AssetError, GridError, SourceError, ZoneError};
pub use events::{ZoneEvent, ZoneEventBuffer};
pub use grid::ZoneGrid;
pub use lifecycle::{DEFAULT_ALPHAMAP_RESOLUTION, LoadProgress, ZoneLifecycle};
pub use scheduler::{DistanceScheduler, TickPlan, sqr_distance};
pub use source::{AssetSource, BackgroundSource, HeightfieldSource, ProceduralSource};
pub use streamer::{PositionSource, TickReport, ZoneStreamer, spawn_position};
pub use zone::{Zone, ZoneState};

//! Error types for the zone grid, lifecycle and tile sources.

use terrastream_terrain::TerrainError;

use crate::coord::TileCoord;
use crate::zone::ZoneState;

/// Raised by bounds-checked grid access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The coordinate lies outside `0..width` on either axis.
    #[error("tile {coord} is outside the {width}x{width} zone grid")]
    OutOfRange { coord: TileCoord, width: u32 },
}

/// Reasons a load or unload request was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error(transparent)]
    OutOfRange(#[from] GridError),

    /// Another zone is still loading; loads are single-flight.
    #[error("cannot load {requested}: zone {in_flight} is already loading")]
    LoadInFlight {
        requested: TileCoord,
        in_flight: TileCoord,
    },

    /// The zone is flagged as never loadable.
    #[error("zone {0} is not loadable")]
    NotLoadable(TileCoord),

    /// The zone is not in a state the transition starts from.
    #[error("zone {coord} is {state:?}")]
    InvalidState { coord: TileCoord, state: ZoneState },

    /// The heightfield source refused the request.
    #[error("source rejected {coord}: {source}")]
    Source {
        coord: TileCoord,
        #[source]
        source: SourceError,
    },
}

/// Failures while producing a tile's heightfield.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The loaded asset contains no terrain surface.
    #[error("{0} could not be found after loading")]
    MissingTerrain(String),

    /// A poll arrived for a tile that was never requested.
    #[error("no request outstanding for {0}")]
    NotRequested(TileCoord),

    /// The coordinate cannot be mapped onto the world.
    #[error("tile {0} is outside the world")]
    OutsideWorld(TileCoord),
}

/// Failures of the resource loader.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset {0} not found")]
    NotFound(String),

    #[error("failed to read asset {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse asset {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The loader thread is gone or its queue is full.
    #[error("asset loader is unavailable")]
    Unavailable,

    #[error("failed to start asset loader thread: {0}")]
    Spawn(#[source] std::io::Error),
}

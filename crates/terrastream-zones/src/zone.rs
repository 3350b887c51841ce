//! Per-tile record and its lifecycle state.

use terrastream_terrain::Heightfield;

use crate::backend::Neighbors;
use crate::coord::TileCoord;

/// Lifecycle state of a zone.
///
/// `Unloaded → Loading → Loaded → Unloading → Unloaded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneState {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

/// One tile of the world.
///
/// Zones are allocated once for the whole grid; only their state, heightfield,
/// surface and neighbour links change, and only through the lifecycle.
#[derive(Clone, Debug)]
pub struct Zone<S> {
    pub(crate) coord: TileCoord,
    pub(crate) state: ZoneState,
    pub(crate) heightfield: Option<Heightfield>,
    pub(crate) surface: Option<S>,
    pub(crate) neighbors: Neighbors<S>,
    pub(crate) border: bool,
    pub(crate) loadable: bool,
}

impl<S> Zone<S> {
    pub(crate) fn new(coord: TileCoord, border: bool) -> Self {
        Self {
            coord,
            state: ZoneState::Unloaded,
            heightfield: None,
            surface: None,
            neighbors: Neighbors::none(),
            border,
            loadable: true,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ZoneState::Loaded
    }

    /// The tile's heightfield, present while loaded (and after unload when retained).
    pub fn heightfield(&self) -> Option<&Heightfield> {
        self.heightfield.as_ref()
    }

    /// The backend surface, present only while loaded.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Current neighbour links; all absent unless loaded.
    pub fn neighbors(&self) -> &Neighbors<S> {
        &self.neighbors
    }

    /// True on the non-playable outer ring.
    pub fn is_border(&self) -> bool {
        self.border
    }

    /// Whether the scheduler may pick this zone for loading.
    pub fn is_loadable(&self) -> bool {
        self.loadable
    }

    /// Playable zones get interactable (teleportable) surfaces.
    pub fn is_interactable(&self) -> bool {
        !self.border
    }
}

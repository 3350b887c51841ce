//! Fixed-size arena of zones addressed by tile coordinate.

use terrastream_terrain::WorldLayout;

use crate::coord::TileCoord;
use crate::error::GridError;
use crate::zone::{Zone, ZoneState};

/// All zones of the world, allocated once at startup.
///
/// Zones live in one `Vec` indexed `y * width + x`. Every access is bounds
/// checked and out-of-range coordinates fail with [`GridError::OutOfRange`]
/// rather than being clamped.
#[derive(Clone, Debug)]
pub struct ZoneGrid<S> {
    width: u32,
    zones: Vec<Zone<S>>,
}

impl<S> ZoneGrid<S> {
    /// Allocate one `Unloaded` zone per tile of `layout`.
    pub fn new(layout: &WorldLayout) -> Self {
        let width = layout.width();
        let mut zones = Vec::with_capacity((width * width) as usize);
        for y in 0..width {
            for x in 0..width {
                let coord = TileCoord::new(x as i32, y as i32);
                zones.push(Zone::new(coord, layout.is_border(x, y)));
            }
        }
        Self { width, zones }
    }

    /// Tiles per side.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index(coord).is_ok()
    }

    fn index(&self, coord: TileCoord) -> Result<usize, GridError> {
        match coord.to_tile() {
            Some((x, y)) if x < self.width && y < self.width => {
                Ok(y as usize * self.width as usize + x as usize)
            }
            _ => Err(GridError::OutOfRange {
                coord,
                width: self.width,
            }),
        }
    }

    pub fn get(&self, coord: TileCoord) -> Result<&Zone<S>, GridError> {
        let index = self.index(coord)?;
        Ok(&self.zones[index])
    }

    pub(crate) fn get_mut(&mut self, coord: TileCoord) -> Result<&mut Zone<S>, GridError> {
        let index = self.index(coord)?;
        Ok(&mut self.zones[index])
    }

    /// The surface of the zone at `coord` if that zone is `Loaded`.
    ///
    /// Unlike [`get`](Self::get) this is total: out-of-range coordinates are
    /// simply "no neighbour".
    pub fn loaded_terrain_at(&self, coord: TileCoord) -> Option<&S> {
        let zone = self.get(coord).ok()?;
        if zone.state == ZoneState::Loaded {
            zone.surface.as_ref()
        } else {
            None
        }
    }

    /// Zones in row-major order: `y` outer, `x` inner.
    pub fn iter(&self) -> impl Iterator<Item = &Zone<S>> {
        self.zones.iter()
    }

    pub fn count_in_state(&self, state: ZoneState) -> usize {
        self.zones.iter().filter(|z| z.state == state).count()
    }

    /// Allow or forbid the scheduler from ever loading a zone.
    pub fn set_loadable(&mut self, coord: TileCoord, loadable: bool) -> Result<(), GridError> {
        self.get_mut(coord)?.loadable = loadable;
        Ok(())
    }
}

//! Load/unload transitions, single-flight loading and neighbour stitching.
//!
//! [`ZoneLifecycle`] owns the zone grid together with the surface backend and
//! the heightfield source, and is the only place zone state changes. At most
//! one load is in flight at any time; the token for it lives here and is
//! released when the load completes or fails. Unloads finish within the call.

use std::task::Poll;
use std::time::Instant;

use terrastream_terrain::{Heightfield, WorldLayout, splat_weights};

use crate::backend::{Neighbors, SurfaceRequest, TerrainBackend};
use crate::coord::{Direction, TileCoord};
use crate::error::{GridError, ZoneError};
use crate::events::{ZoneEvent, ZoneEventBuffer};
use crate::grid::ZoneGrid;
use crate::source::HeightfieldSource;
use crate::zone::ZoneState;

/// Texels per side of a surface's splat map unless configured otherwise.
pub const DEFAULT_ALPHAMAP_RESOLUTION: usize = 64;

/// The single in-flight load.
#[derive(Clone, Copy, Debug)]
struct LoadToken {
    coord: TileCoord,
    started: Instant,
}

/// Outcome of driving the in-flight load.
#[derive(Debug)]
pub enum LoadProgress {
    /// Still waiting on the source.
    Pending(TileCoord),
    /// The zone is `Loaded` and stitched.
    Loaded(TileCoord),
    /// The load failed and the zone is back to `Unloaded`.
    Failed { coord: TileCoord, error: ZoneError },
}

impl LoadProgress {
    pub fn coord(&self) -> TileCoord {
        match self {
            LoadProgress::Pending(coord) | LoadProgress::Loaded(coord) => *coord,
            LoadProgress::Failed { coord, .. } => *coord,
        }
    }
}

/// Drives zones through `Unloaded → Loading → Loaded → Unloading → Unloaded`.
pub struct ZoneLifecycle<B: TerrainBackend, S> {
    layout: WorldLayout,
    grid: ZoneGrid<B::Surface>,
    backend: B,
    source: S,
    retain_heightfields: bool,
    alphamap_resolution: usize,
    in_flight: Option<LoadToken>,
    events: ZoneEventBuffer,
}

impl<B: TerrainBackend, S: HeightfieldSource> ZoneLifecycle<B, S> {
    pub fn new(layout: WorldLayout, backend: B, source: S) -> Self {
        let grid = ZoneGrid::new(&layout);
        tracing::debug!(
            width = grid.width(),
            zones = grid.len(),
            "zone grid allocated"
        );
        Self {
            layout,
            grid,
            backend,
            source,
            retain_heightfields: false,
            alphamap_resolution: DEFAULT_ALPHAMAP_RESOLUTION,
            in_flight: None,
            events: ZoneEventBuffer::new(),
        }
    }

    /// Keep heightfields across unload so a reload skips the source.
    pub fn with_retained_heightfields(mut self, retain: bool) -> Self {
        self.retain_heightfields = retain;
        self
    }

    /// Texels per side of the splat map built for each surface.
    pub fn with_alphamap_resolution(mut self, resolution: usize) -> Self {
        self.alphamap_resolution = resolution.max(1);
        self
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn grid(&self) -> &ZoneGrid<B::Surface> {
        &self.grid
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn events(&self) -> &ZoneEventBuffer {
        &self.events
    }

    /// Advance the event buffer by one tick.
    pub fn swap_events(&mut self) {
        self.events.swap();
    }

    /// The zone currently loading, if any.
    pub fn in_flight(&self) -> Option<TileCoord> {
        self.in_flight.map(|token| token.coord)
    }

    pub fn set_loadable(&mut self, coord: TileCoord, loadable: bool) -> Result<(), GridError> {
        self.grid.set_loadable(coord, loadable)
    }

    /// Begin loading `coord`.
    ///
    /// Refused without any state change while another load is in flight, or
    /// when the zone is not loadable or not `Unloaded`. Sources that answer
    /// immediately (and retained heightfields) complete within this call.
    pub fn start_load(&mut self, coord: TileCoord) -> Result<LoadProgress, ZoneError> {
        if let Some(token) = self.in_flight {
            tracing::warn!(
                x = coord.x,
                y = coord.y,
                in_flight_x = token.coord.x,
                in_flight_y = token.coord.y,
                "already loading a zone"
            );
            self.events.send(ZoneEvent::LoadRejected {
                requested: coord,
                in_flight: token.coord,
            });
            return Err(ZoneError::LoadInFlight {
                requested: coord,
                in_flight: token.coord,
            });
        }

        let zone = self.grid.get_mut(coord)?;
        if !zone.loadable {
            return Err(ZoneError::NotLoadable(coord));
        }
        if zone.state != ZoneState::Unloaded {
            return Err(ZoneError::InvalidState {
                coord,
                state: zone.state,
            });
        }

        let started = Instant::now();
        if let Some(heightfield) = zone.heightfield.take() {
            tracing::debug!(x = coord.x, y = coord.y, "reusing retained heightfield");
            zone.state = ZoneState::Loading;
            return Ok(self.complete(LoadToken { coord, started }, heightfield));
        }

        if let Err(source) = self.source.request(coord) {
            let error = ZoneError::Source { coord, source };
            tracing::error!(x = coord.x, y = coord.y, %error, "zone load could not start");
            self.events.send(ZoneEvent::LoadFailed {
                coord,
                reason: error.to_string(),
            });
            return Err(error);
        }

        zone.state = ZoneState::Loading;
        self.in_flight = Some(LoadToken { coord, started });
        tracing::debug!(x = coord.x, y = coord.y, "zone loading");

        Ok(self.poll().unwrap_or(LoadProgress::Pending(coord)))
    }

    /// Drive the in-flight load one step. `None` when nothing is loading.
    pub fn poll(&mut self) -> Option<LoadProgress> {
        let token = self.in_flight?;
        let progress = match self.source.poll(token.coord) {
            Poll::Pending => LoadProgress::Pending(token.coord),
            Poll::Ready(Ok(heightfield)) => {
                self.in_flight = None;
                self.complete(token, heightfield)
            }
            Poll::Ready(Err(source)) => {
                self.in_flight = None;
                self.fail(
                    token.coord,
                    ZoneError::Source {
                        coord: token.coord,
                        source,
                    },
                )
            }
        };
        Some(progress)
    }

    fn complete(&mut self, token: LoadToken, heightfield: Heightfield) -> LoadProgress {
        let coord = token.coord;
        let interactable = match self.grid.get(coord).map(|zone| zone.is_interactable()) {
            Ok(interactable) => interactable,
            Err(err) => return self.fail(coord, err.into()),
        };

        let splat = splat_weights(&heightfield, &self.layout, self.alphamap_resolution);
        let request = SurfaceRequest {
            coord,
            heightfield: &heightfield,
            origin: self.layout.tile_origin(coord.x as u32, coord.y as u32),
            size: self.layout.grid_size(),
            max_height: self.layout.max_height(),
            interactable,
            splat: &splat,
        };
        let surface = self.backend.create_surface(request);

        if let Ok(zone) = self.grid.get_mut(coord) {
            zone.surface = Some(surface);
            zone.heightfield = Some(heightfield);
            zone.state = ZoneState::Loaded;
        }

        self.stitch(coord);
        self.events.send(ZoneEvent::Loaded(coord));
        tracing::info!(
            x = coord.x,
            y = coord.y,
            elapsed_ms = token.started.elapsed().as_secs_f64() * 1000.0,
            "zone loaded"
        );
        LoadProgress::Loaded(coord)
    }

    fn fail(&mut self, coord: TileCoord, error: ZoneError) -> LoadProgress {
        if let Ok(zone) = self.grid.get_mut(coord) {
            zone.state = ZoneState::Unloaded;
            zone.heightfield = None;
            zone.surface = None;
            zone.neighbors = Neighbors::none();
        }
        tracing::error!(x = coord.x, y = coord.y, %error, "zone load failed");
        self.events.send(ZoneEvent::LoadFailed {
            coord,
            reason: error.to_string(),
        });
        LoadProgress::Failed { coord, error }
    }

    /// Unload `coord`, releasing its surface.
    ///
    /// Returns `Ok(false)` without touching anything when the zone is already
    /// `Unloaded`. A zone that is still loading cannot be unloaded.
    pub fn unload(&mut self, coord: TileCoord) -> Result<bool, ZoneError> {
        let zone = self.grid.get_mut(coord)?;
        match zone.state {
            ZoneState::Unloaded => {
                tracing::debug!(x = coord.x, y = coord.y, "zone already unloaded");
                return Ok(false);
            }
            ZoneState::Loading | ZoneState::Unloading => {
                return Err(ZoneError::InvalidState {
                    coord,
                    state: zone.state,
                });
            }
            ZoneState::Loaded => {}
        }

        zone.state = ZoneState::Unloading;
        zone.neighbors = Neighbors::none();
        if !self.retain_heightfields {
            zone.heightfield = None;
        }
        match zone.surface.take() {
            Some(surface) if self.backend.is_alive(&surface) => {
                self.backend.destroy_surface(surface);
            }
            _ => {
                tracing::error!(
                    x = coord.x,
                    y = coord.y,
                    "zone surface was already released; treating as unloaded"
                );
            }
        }
        zone.state = ZoneState::Unloaded;

        self.stitch(coord);
        self.events.send(ZoneEvent::Unloaded(coord));
        tracing::info!(x = coord.x, y = coord.y, "zone unloaded");
        Ok(true)
    }

    /// Recompute neighbour links for every loaded zone in the 3×3
    /// neighbourhood around `center`.
    pub fn stitch(&mut self, center: TileCoord) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let coord = center.offset(dx, dy);
                let Some(surface) = self.grid.loaded_terrain_at(coord).cloned() else {
                    continue;
                };
                let link = |direction| {
                    self.grid
                        .loaded_terrain_at(coord.neighbor(direction))
                        .cloned()
                };
                let links = Neighbors {
                    north: link(Direction::North),
                    south: link(Direction::South),
                    east: link(Direction::East),
                    west: link(Direction::West),
                };
                self.backend.set_neighbors(&surface, &links);
                if let Ok(zone) = self.grid.get_mut(coord) {
                    zone.neighbors = links;
                }
            }
        }
    }
}

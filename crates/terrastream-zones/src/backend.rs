//! Boundary to the engine that renders and collides tile surfaces.
//!
//! The streamer only ever talks to a surface through [`TerrainBackend`]:
//! create it from a heightfield, hand it its current neighbours, destroy it.
//! [`HeadlessBackend`] is a bookkeeping implementation for tools and tests.

use std::fmt;

use glam::DVec3;
use rustc_hash::FxHashMap;
use terrastream_terrain::{Heightfield, SplatMap};

use crate::coord::{Direction, TileCoord};

/// Directional links to adjacent loaded surfaces. Any subset may be absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighbors<S> {
    pub north: Option<S>,
    pub south: Option<S>,
    pub east: Option<S>,
    pub west: Option<S>,
}

impl<S> Neighbors<S> {
    pub fn none() -> Self {
        Self {
            north: None,
            south: None,
            east: None,
            west: None,
        }
    }

    pub fn get(&self, direction: Direction) -> Option<&S> {
        match direction {
            Direction::North => self.north.as_ref(),
            Direction::South => self.south.as_ref(),
            Direction::East => self.east.as_ref(),
            Direction::West => self.west.as_ref(),
        }
    }

    /// Number of present links.
    pub fn count(&self) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&d| self.get(d).is_some())
            .count()
    }
}

impl<S> Default for Neighbors<S> {
    fn default() -> Self {
        Self::none()
    }
}

/// Everything a backend needs to build one tile surface.
#[derive(Debug)]
pub struct SurfaceRequest<'a> {
    pub coord: TileCoord,
    pub heightfield: &'a Heightfield,
    /// World-space corner of the tile.
    pub origin: DVec3,
    /// World units per tile side.
    pub size: f64,
    /// World units per unit of heightfield sample.
    pub max_height: f64,
    /// Whether the observer may teleport onto / interact with the surface.
    pub interactable: bool,
    /// Texture layer weights painted over the surface.
    pub splat: &'a SplatMap,
}

/// A renderer/physics engine hosting tile surfaces.
pub trait TerrainBackend {
    /// Opaque handle to a live surface.
    type Surface: Clone + PartialEq + fmt::Debug;

    /// Build the surface for a tile.
    fn create_surface(&mut self, request: SurfaceRequest<'_>) -> Self::Surface;

    /// Replace a surface's neighbour links for seam-free level-of-detail blending.
    fn set_neighbors(&mut self, surface: &Self::Surface, neighbors: &Neighbors<Self::Surface>);

    /// Release a surface and all resources the backend holds for it.
    fn destroy_surface(&mut self, surface: Self::Surface);

    /// Whether the backend still holds `surface`. Hosts that can tear a
    /// surface down on their own report `false` once it is gone.
    fn is_alive(&self, _surface: &Self::Surface) -> bool {
        true
    }
}

/// Handle issued by [`HeadlessBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// What [`HeadlessBackend`] remembers about a live surface.
#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    pub coord: TileCoord,
    pub origin: DVec3,
    pub interactable: bool,
    /// Highest point of the surface in world units.
    pub peak: f64,
    pub splat: SplatMap,
    pub neighbors: Neighbors<SurfaceId>,
}

/// A backend with no renderer: tracks live surfaces and their links.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    surfaces: FxHashMap<SurfaceId, HeadlessSurface>,
    created: u64,
    destroyed: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(&id)
    }

    /// Number of surfaces currently alive.
    pub fn live_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    /// Live surfaces sorted by id.
    pub fn surfaces(&self) -> Vec<(SurfaceId, &HeadlessSurface)> {
        let mut all: Vec<_> = self.surfaces.iter().map(|(id, s)| (*id, s)).collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }
}

impl TerrainBackend for HeadlessBackend {
    type Surface = SurfaceId;

    fn create_surface(&mut self, request: SurfaceRequest<'_>) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.created += 1;

        let peak = request
            .heightfield
            .samples()
            .iter()
            .copied()
            .fold(f32::MIN, f32::max);

        self.surfaces.insert(
            id,
            HeadlessSurface {
                coord: request.coord,
                origin: request.origin,
                interactable: request.interactable,
                peak: f64::from(peak) * request.max_height,
                splat: request.splat.clone(),
                neighbors: Neighbors::none(),
            },
        );
        id
    }

    fn set_neighbors(&mut self, surface: &SurfaceId, neighbors: &Neighbors<SurfaceId>) {
        match self.surfaces.get_mut(surface) {
            Some(s) => s.neighbors = neighbors.clone(),
            None => tracing::warn!(?surface, "set_neighbors on unknown surface"),
        }
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        if self.surfaces.remove(&surface).is_some() {
            self.destroyed += 1;
        } else {
            tracing::warn!(?surface, "destroy_surface on unknown surface");
        }
    }

    fn is_alive(&self, surface: &SurfaceId) -> bool {
        self.surfaces.contains_key(surface)
    }
}

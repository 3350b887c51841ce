//! Where a loading zone's heightfield comes from.
//!
//! A load is split into `request` (issued once when the zone enters
//! `Loading`) and `poll` (called every tick until it returns `Ready`), so an
//! inline generator, a worker thread and an asset loader all drive the same
//! state machine.

use std::sync::Arc;
use std::task::Poll;

use rustc_hash::{FxHashMap, FxHashSet};
use terrastream_terrain::{GenerationWorker, Heightfield, HeightfieldGenerator};

use crate::assets::{ResourceLoader, asset_name};
use crate::coord::TileCoord;
use crate::error::SourceError;

/// Produces heightfields for tiles on request.
pub trait HeightfieldSource {
    /// Begin producing the heightfield for `coord`.
    fn request(&mut self, coord: TileCoord) -> Result<(), SourceError>;

    /// Check whether the heightfield for a requested `coord` is ready.
    fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>>;
}

/// Map a coordinate onto the generator's world or fail with `OutsideWorld`.
fn world_tile(
    generator: &HeightfieldGenerator,
    coord: TileCoord,
) -> Result<(u32, u32), SourceError> {
    let width = generator.layout().width();
    match coord.to_tile() {
        Some((x, y)) if x < width && y < width => Ok((x, y)),
        _ => Err(SourceError::OutsideWorld(coord)),
    }
}

/// Generates on the ticking thread; every request is ready on the first poll.
pub struct ProceduralSource {
    generator: Arc<HeightfieldGenerator>,
    requested: FxHashSet<TileCoord>,
}

impl ProceduralSource {
    pub fn new(generator: Arc<HeightfieldGenerator>) -> Self {
        Self {
            generator,
            requested: FxHashSet::default(),
        }
    }

    pub fn generator(&self) -> &Arc<HeightfieldGenerator> {
        &self.generator
    }
}

impl HeightfieldSource for ProceduralSource {
    fn request(&mut self, coord: TileCoord) -> Result<(), SourceError> {
        world_tile(&self.generator, coord)?;
        self.requested.insert(coord);
        Ok(())
    }

    fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>> {
        if !self.requested.remove(&coord) {
            return Poll::Ready(Err(SourceError::NotRequested(coord)));
        }
        Poll::Ready(world_tile(&self.generator, coord).map(|(x, y)| self.generator.generate(x, y)))
    }
}

/// Generates on a [`GenerationWorker`] thread; loads span several ticks.
pub struct BackgroundSource {
    generator: Arc<HeightfieldGenerator>,
    worker: GenerationWorker,
    outstanding: FxHashSet<TileCoord>,
    ready: FxHashMap<TileCoord, Heightfield>,
}

impl BackgroundSource {
    pub fn spawn(generator: Arc<HeightfieldGenerator>) -> Result<Self, SourceError> {
        let worker = GenerationWorker::spawn(Arc::clone(&generator))?;
        Ok(Self {
            generator,
            worker,
            outstanding: FxHashSet::default(),
            ready: FxHashMap::default(),
        })
    }
}

impl HeightfieldSource for BackgroundSource {
    fn request(&mut self, coord: TileCoord) -> Result<(), SourceError> {
        let (x, y) = world_tile(&self.generator, coord)?;
        if self.outstanding.contains(&coord) || self.ready.contains_key(&coord) {
            return Ok(());
        }
        self.worker.submit(x, y)?;
        self.outstanding.insert(coord);
        Ok(())
    }

    fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>> {
        loop {
            match self.worker.try_recv() {
                Ok(Some(tile)) => {
                    let done = TileCoord::new(tile.tile_x as i32, tile.tile_y as i32);
                    tracing::trace!(
                        x = done.x,
                        y = done.y,
                        us = tile.generation_time_us,
                        "heightfield generated"
                    );
                    self.outstanding.remove(&done);
                    self.ready.insert(done, tile.heightfield);
                }
                Ok(None) => break,
                Err(err) => {
                    if let Some(heightfield) = self.ready.remove(&coord) {
                        return Poll::Ready(Ok(heightfield));
                    }
                    self.outstanding.remove(&coord);
                    return Poll::Ready(Err(err.into()));
                }
            }
        }

        if let Some(heightfield) = self.ready.remove(&coord) {
            Poll::Ready(Ok(heightfield))
        } else if self.outstanding.contains(&coord) {
            Poll::Pending
        } else {
            Poll::Ready(Err(SourceError::NotRequested(coord)))
        }
    }
}

/// Fetches prebuilt `Map_{x}-{y}` assets through a [`ResourceLoader`].
pub struct AssetSource<L> {
    loader: L,
}

impl<L: ResourceLoader> AssetSource<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }
}

impl<L: ResourceLoader> HeightfieldSource for AssetSource<L> {
    fn request(&mut self, coord: TileCoord) -> Result<(), SourceError> {
        Ok(self.loader.load_named(&asset_name(coord))?)
    }

    fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>> {
        let name = asset_name(coord);
        match self.loader.poll(&name) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(err)) => Poll::Ready(Err(err.into())),
            Poll::Ready(Ok(asset)) => Poll::Ready(
                asset
                    .into_terrain()
                    .ok_or(SourceError::MissingTerrain(name)),
            ),
        }
    }
}

impl<T: HeightfieldSource + ?Sized> HeightfieldSource for Box<T> {
    fn request(&mut self, coord: TileCoord) -> Result<(), SourceError> {
        (**self).request(coord)
    }

    fn poll(&mut self, coord: TileCoord) -> Poll<Result<Heightfield, SourceError>> {
        (**self).poll(coord)
    }
}

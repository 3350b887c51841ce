//! Background heightfield generation.
//!
//! A single named worker thread runs the [`HeightfieldGenerator`] so a tile
//! load can span several ticks without stalling the ticking thread. Requests
//! and results travel through bounded channels; the thread exits once the
//! worker is dropped.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

use crate::error::TerrainError;
use crate::generator::HeightfieldGenerator;
use crate::heightfield::Heightfield;

/// Requests that may wait in the queue before `submit` starts refusing.
const QUEUE_CAPACITY: usize = 4;

/// A finished tile handed back to the ticking thread.
#[derive(Debug)]
pub struct GeneratedTile {
    pub tile_x: u32,
    pub tile_y: u32,
    pub heightfield: Heightfield,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

#[derive(Debug)]
struct GenerationRequest {
    tile_x: u32,
    tile_y: u32,
}

/// Owns the generation thread and both ends of its channels.
pub struct GenerationWorker {
    request_sender: Sender<GenerationRequest>,
    result_receiver: Receiver<GeneratedTile>,
}

impl GenerationWorker {
    /// Start the worker thread.
    pub fn spawn(generator: Arc<HeightfieldGenerator>) -> Result<Self, TerrainError> {
        let (request_sender, request_receiver) = bounded::<GenerationRequest>(QUEUE_CAPACITY);
        let (result_sender, result_receiver) = bounded::<GeneratedTile>(QUEUE_CAPACITY);

        std::thread::Builder::new()
            .name("heightfield-gen".into())
            .spawn(move || {
                while let Ok(request) = request_receiver.recv() {
                    let start = Instant::now();
                    let heightfield = generator.generate(request.tile_x, request.tile_y);
                    let tile = GeneratedTile {
                        tile_x: request.tile_x,
                        tile_y: request.tile_y,
                        heightfield,
                        generation_time_us: start.elapsed().as_micros() as u64,
                    };
                    if result_sender.send(tile).is_err() {
                        break;
                    }
                }
                tracing::debug!("heightfield worker shutting down");
            })
            .map_err(TerrainError::WorkerSpawn)?;

        Ok(Self {
            request_sender,
            result_receiver,
        })
    }

    /// Queue a tile for generation.
    pub fn submit(&self, tile_x: u32, tile_y: u32) -> Result<(), TerrainError> {
        self.request_sender
            .try_send(GenerationRequest { tile_x, tile_y })
            .map_err(|_| TerrainError::WorkerUnavailable)
    }

    /// Take one finished tile, if any.
    pub fn try_recv(&self) -> Result<Option<GeneratedTile>, TerrainError> {
        match self.result_receiver.try_recv() {
            Ok(tile) => Ok(Some(tile)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TerrainError::WorkerUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::WorldLayout;

    fn worker() -> (GenerationWorker, Arc<HeightfieldGenerator>) {
        let layout = WorldLayout::new(3, true, 33, 10.0, 10.0, 3.0).unwrap();
        let generator = Arc::new(HeightfieldGenerator::new(layout, 77));
        (GenerationWorker::spawn(Arc::clone(&generator)).unwrap(), generator)
    }

    fn wait_for(worker: &GenerationWorker) -> GeneratedTile {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(tile) = worker.try_recv().unwrap() {
                return tile;
            }
            assert!(Instant::now() < deadline, "worker produced nothing within 10s");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_worker_matches_inline_generation() {
        let (worker, generator) = worker();
        worker.submit(2, 1).unwrap();
        let tile = wait_for(&worker);
        assert_eq!((tile.tile_x, tile.tile_y), (2, 1));
        assert_eq!(tile.heightfield, generator.generate(2, 1));
    }

    #[test]
    fn test_results_arrive_in_request_order() {
        let (worker, _) = worker();
        worker.submit(0, 0).unwrap();
        worker.submit(4, 4).unwrap();
        let first = wait_for(&worker);
        let second = wait_for(&worker);
        assert_eq!((first.tile_x, first.tile_y), (0, 0));
        assert_eq!((second.tile_x, second.tile_y), (4, 4));
    }

    #[test]
    fn test_empty_queue_yields_none() {
        let (worker, _) = worker();
        assert!(worker.try_recv().unwrap().is_none());
    }
}

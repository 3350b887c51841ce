/// Errors raised while building terrain generators and workers.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The heightmap resolution cannot hold a ridge band.
    #[error("heightmap resolution {0} is below the minimum of 32 samples")]
    InvalidResolution(u32),

    /// The world has no tiles.
    #[error("world must contain at least one tile per side")]
    EmptyWorld,

    /// Tile size must be a positive finite number.
    #[error("grid size {0} is not a positive finite number")]
    InvalidGridSize(f64),

    /// The background generation thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The generation queue is full or its thread has exited.
    #[error("generation worker is unavailable")]
    WorkerUnavailable,
}

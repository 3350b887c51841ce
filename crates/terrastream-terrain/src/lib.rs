//! Procedural heightfields for a tiled world: coherent noise sampling, world-wide
//! seamless tile synthesis, ridge walls around the playable area, texture
//! weighting, and a background generation worker.

mod error;
mod generator;
mod heightfield;
mod layout;
mod noise_field;
mod worker;

pub mod splat;

pub use error::TerrainError;
pub use generator::{HeightfieldGenerator, RIDGE_STEP};
pub use heightfield::Heightfield;
pub use layout::{EdgeSide, WorldLayout};
pub use noise_field::NoiseField;
pub use splat::{SPLAT_LAYERS, SplatMap, splat_weights};
pub use worker::{GeneratedTile, GenerationWorker};

//! Coherent 2D noise in `[0, 1)`.

use noise::{NoiseFn, Perlin};

/// Largest value [`NoiseField::sample`] returns.
const MAX_SAMPLE: f64 = 1.0 - f64::EPSILON;

/// Seeded Perlin noise remapped from `[-1, 1]` to `[0, 1)`.
///
/// Stateless apart from the seed: the same `(u, v)` always yields the same
/// value, and nearby inputs yield nearby outputs.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
}

impl NoiseField {
    /// Create a noise field for the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// Sample the field at a continuous coordinate.
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        let raw = self.perlin.get([u, v]);
        (raw * 0.5 + 0.5).clamp(0.0, MAX_SAMPLE)
    }

    /// The seed this field was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

//! Four-layer texture weights derived from a tile's heightfield.
//!
//! Layer 0 has constant influence, layer 1 favours low ground, layer 2 favours
//! flat ground and layer 3 grows with altitude on north-facing slopes. Each
//! texel's weights are normalized to sum to one.

use glam::DVec3;

use crate::heightfield::Heightfield;
use crate::layout::WorldLayout;

/// Number of texture layers in a [`SplatMap`].
pub const SPLAT_LAYERS: usize = 4;

const BASE_WEIGHT: f64 = 0.1;

/// Row-major grid of per-texel layer weights.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatMap {
    resolution: usize,
    weights: Vec<[f32; SPLAT_LAYERS]>,
}

impl SplatMap {
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Weights at texel `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<[f32; SPLAT_LAYERS]> {
        (row < self.resolution && col < self.resolution)
            .then(|| self.weights[row * self.resolution + col])
    }

    pub fn weights(&self) -> &[[f32; SPLAT_LAYERS]] {
        &self.weights
    }
}

/// Compute a `alphamap_resolution²` splat map for one heightfield.
pub fn splat_weights(
    heights: &Heightfield,
    layout: &WorldLayout,
    alphamap_resolution: usize,
) -> SplatMap {
    let res = alphamap_resolution.max(1);
    let rows = heights.rows();
    let cols = heights.cols();
    let heightmap_extent = rows as f64;
    let mut weights = Vec::with_capacity(res * res);

    for i in 0..res {
        for j in 0..res {
            let v = i as f64 / res as f64;
            let u = j as f64 / res as f64;
            let row = (v * rows as f64).round() as usize;
            let col = (u * cols as f64).round() as usize;

            let height = f64::from(heights.get_clamped(row, col)) * layout.max_height();
            let normal = surface_normal(heights, layout, row, col);
            let steepness = normal.dot(DVec3::Y).clamp(-1.0, 1.0).acos().to_degrees();

            let mut layer = [
                BASE_WEIGHT,
                (heightmap_extent - height).clamp(0.0, 1.0),
                1.0 - (steepness * steepness / (heightmap_extent * 10.0)).clamp(0.0, 1.0),
                height * normal.z.clamp(0.0, 1.0),
            ];

            let total: f64 = layer.iter().sum();
            if total > 0.0 {
                for w in &mut layer {
                    *w /= total;
                }
            }
            weights.push(layer.map(|w| w as f32));
        }
    }

    SplatMap {
        resolution: res,
        weights,
    }
}

/// Unit normal from central differences, in world units, `+y` up.
fn surface_normal(heights: &Heightfield, layout: &WorldLayout, row: usize, col: usize) -> DVec3 {
    let spacing = layout.grid_size() / (heights.cols().saturating_sub(1).max(1)) as f64;
    let scale = layout.max_height();

    let east = f64::from(heights.get_clamped(row, col + 1));
    let west = f64::from(heights.get_clamped(row, col.saturating_sub(1)));
    let north = f64::from(heights.get_clamped(row + 1, col));
    let south = f64::from(heights.get_clamped(row.saturating_sub(1), col));

    let dh_dx = (east - west) * scale / (2.0 * spacing);
    let dh_dz = (north - south) * scale / (2.0 * spacing);
    DVec3::new(-dh_dx, 1.0, -dh_dz).normalize()
}

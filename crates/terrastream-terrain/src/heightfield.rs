//! Row-major elevation grid for one tile.

use serde::{Deserialize, Serialize};

/// A `rows × cols` grid of elevation samples.
///
/// Row index runs south to north, column index west to east. Samples are
/// unscaled; multiply by the layout's `max_height` for world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heightfield {
    rows: usize,
    cols: usize,
    samples: Vec<f32>,
}

impl Heightfield {
    /// A zero-filled heightfield.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            samples: vec![0.0; rows * cols],
        }
    }

    /// Build from an existing sample vector. Returns `None` on a size mismatch.
    pub fn from_samples(rows: usize, cols: usize, samples: Vec<f32>) -> Option<Self> {
        (samples.len() == rows * cols).then_some(Self {
            rows,
            cols,
            samples,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sample at `(row, col)`, or `None` out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.samples[row * self.cols + col])
        } else {
            None
        }
    }

    /// Sample with both indices clamped into the grid.
    pub fn get_clamped(&self, row: usize, col: usize) -> f32 {
        let r = row.min(self.rows.saturating_sub(1));
        let c = col.min(self.cols.saturating_sub(1));
        self.samples[r * self.cols + c]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f32) {
        self.samples[row * self.cols + col] = value;
    }

    /// One full row, south to north by index.
    pub fn row(&self, row: usize) -> &[f32] {
        &self.samples[row * self.cols..(row + 1) * self.cols]
    }

    /// One full column, copied out.
    pub fn column(&self, col: usize) -> Vec<f32> {
        (0..self.rows)
            .map(|r| self.samples[r * self.cols + col])
            .collect()
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

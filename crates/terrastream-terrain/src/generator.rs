//! Per-tile heightfield synthesis.
//!
//! Every interior sample is read from one continuous noise field spanning the
//! whole world, so two adjacent tiles evaluate identical coordinates along
//! their shared edge and meet without a seam. Tiles on the outer ring are
//! replaced by a ridge wall that climbs away from the playable area.

use crate::heightfield::Heightfield;
use crate::layout::{EdgeSide, WorldLayout};
use crate::noise_field::NoiseField;

/// Height added per row (or column) moving outward through a ridge tile.
pub const RIDGE_STEP: f32 = 0.05;

/// Builds heightfields for tiles of a [`WorldLayout`].
#[derive(Clone, Debug)]
pub struct HeightfieldGenerator {
    noise: NoiseField,
    layout: WorldLayout,
}

impl HeightfieldGenerator {
    pub fn new(layout: WorldLayout, seed: u32) -> Self {
        Self {
            noise: NoiseField::new(seed),
            layout,
        }
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    /// Generate the heightfield for a tile, choosing the ridge rule on the
    /// border ring and plain noise elsewhere.
    pub fn generate(&self, tile_x: u32, tile_y: u32) -> Heightfield {
        match self.layout.edge_side(tile_x, tile_y) {
            Some(side) => self.ridge(tile_x, tile_y, side),
            None => self.interior(tile_x, tile_y),
        }
    }

    /// Plain noise heightfield.
    pub fn interior(&self, tile_x: u32, tile_y: u32) -> Heightfield {
        let res = self.layout.resolution() as usize;
        let mut heights = Heightfield::new(res, res);
        for row in 0..res {
            for col in 0..res {
                heights.set(row, col, self.sample(tile_x, tile_y, col, row) as f32);
            }
        }
        heights
    }

    /// Ridge heightfield for a tile bounding the world on `side`.
    ///
    /// The innermost 1/32 of rows (or columns), never fewer than one, keep the
    /// interior noise; each step outward adds [`RIDGE_STEP`] to its inner
    /// neighbour.
    pub fn ridge(&self, tile_x: u32, tile_y: u32, side: EdgeSide) -> Heightfield {
        let res = self.layout.resolution() as usize;
        let band = (res / 32).max(1);
        let far_start = res - band;
        let mut heights = Heightfield::new(res, res);

        match side {
            EdgeSide::North => {
                for row in 0..res {
                    for col in 0..res {
                        let value = if row < band {
                            self.sample(tile_x, tile_y, col, row) as f32
                        } else {
                            heights.get_clamped(row - 1, col) + RIDGE_STEP
                        };
                        heights.set(row, col, value);
                    }
                }
            }
            EdgeSide::East => {
                for row in 0..res {
                    for col in 0..res {
                        let value = if col < band {
                            self.sample(tile_x, tile_y, col, row) as f32
                        } else {
                            heights.get_clamped(row, col - 1) + RIDGE_STEP
                        };
                        heights.set(row, col, value);
                    }
                }
            }
            EdgeSide::South => {
                for row in (0..res).rev() {
                    for col in (0..res).rev() {
                        let value = if row >= far_start {
                            self.sample(tile_x, tile_y, col, row) as f32
                        } else {
                            heights.get_clamped(row + 1, col) + RIDGE_STEP
                        };
                        heights.set(row, col, value);
                    }
                }
            }
            EdgeSide::West => {
                for row in (0..res).rev() {
                    for col in (0..res).rev() {
                        let value = if col >= far_start {
                            self.sample(tile_x, tile_y, col, row) as f32
                        } else {
                            heights.get_clamped(row, col + 1) + RIDGE_STEP
                        };
                        heights.set(row, col, value);
                    }
                }
            }
        }
        heights
    }

    /// Noise value for one sample of one tile.
    ///
    /// Adjacent tiles share their edge sample, so the global sample index is
    /// `tile·res + local − tile`, normalized by the whole world's extent.
    pub fn sample(&self, tile_x: u32, tile_y: u32, col: usize, row: usize) -> f64 {
        let res = f64::from(self.layout.resolution());
        let extent = self.layout.world_extent_samples();
        let scale = self.layout.noise_scale();

        let global_row = f64::from(tile_y) * res + row as f64 - f64::from(tile_y);
        let global_col = f64::from(tile_x) * res + col as f64 - f64::from(tile_x);

        let perlin_y = global_row / extent * scale;
        let perlin_x = global_col / extent * scale;
        self.noise.sample(perlin_y, perlin_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: u32 = 65;
    const TOLERANCE: f32 = 1e-5;

    fn generator(border_ring: bool) -> HeightfieldGenerator {
        let layout = WorldLayout::new(4, border_ring, RES, 10.0, 100.0, 6.0).unwrap();
        HeightfieldGenerator::new(layout, 1234)
    }

    #[test]
    fn test_shared_vertical_edges_match() {
        let generator = generator(true);
        for tile_y in 1..5 {
            for tile_x in 1..4 {
                let west = generator.generate(tile_x, tile_y);
                let east = generator.generate(tile_x + 1, tile_y);
                let west_edge = west.column(RES as usize - 1);
                let east_edge = east.column(0);
                for (row, (a, b)) in west_edge.iter().zip(&east_edge).enumerate() {
                    assert!(
                        (a - b).abs() <= TOLERANCE,
                        "east seam of ({tile_x},{tile_y}) at row {row}: {a} vs {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_shared_horizontal_edges_match() {
        let generator = generator(true);
        for tile_y in 1..4 {
            for tile_x in 1..5 {
                let south = generator.generate(tile_x, tile_y);
                let north = generator.generate(tile_x, tile_y + 1);
                let south_edge = south.row(RES as usize - 1);
                let north_edge = north.row(0);
                for (col, (a, b)) in south_edge.iter().zip(north_edge).enumerate() {
                    assert!(
                        (a - b).abs() <= TOLERANCE,
                        "north seam of ({tile_x},{tile_y}) at col {col}: {a} vs {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_ridge_band_meets_interior_neighbour() {
        let generator = generator(true);
        // Tile (2, 5) is the north ridge; its row 0 lies on the interior tile's top edge.
        let interior = generator.generate(2, 4);
        let ridge = generator.generate(2, 5);
        for col in 0..RES as usize {
            let a = interior.get(RES as usize - 1, col).unwrap();
            let b = ridge.get(0, col).unwrap();
            assert!((a - b).abs() <= TOLERANCE, "ridge seam at col {col}: {a} vs {b}");
        }
    }

    fn assert_rises_outward(outward: &[f32], band: usize, label: &str) {
        // Pairs inside the noise band carry no ordering guarantee.
        for (i, pair) in outward.windows(2).enumerate().skip(band.saturating_sub(1)) {
            assert!(pair[1] >= pair[0], "{label}: height fell at step {i}: {pair:?}");
            let step = pair[1] - pair[0];
            assert!(
                (step - RIDGE_STEP).abs() < 1e-4,
                "{label}: step {i} is {step}, expected {RIDGE_STEP}"
            );
        }
    }

    #[test]
    fn test_north_and_east_ridges_rise_with_index() {
        let generator = generator(true);
        let band = RES as usize / 32;

        let north = generator.generate(2, 5);
        for col in [0, 17, RES as usize - 1] {
            assert_rises_outward(&north.column(col), band, "north");
        }

        let east = generator.generate(5, 2);
        for row in [0, 30, RES as usize - 1] {
            assert_rises_outward(east.row(row), band, "east");
        }
    }

    #[test]
    fn test_south_and_west_ridges_rise_toward_index_zero() {
        let generator = generator(true);
        let res = RES as usize;
        let band = res / 32;

        let south = generator.generate(2, 0);
        for col in [0, 9, res - 1] {
            let mut outward = south.column(col);
            outward.reverse();
            assert_rises_outward(&outward, band, "south");
        }

        let west = generator.generate(0, 2);
        for row in [0, 40, res - 1] {
            let mut outward = west.row(row).to_vec();
            outward.reverse();
            assert_rises_outward(&outward, band, "west");
        }
    }

    #[test]
    fn test_minimum_resolution_ridges_meet_interior() {
        let res = 32;
        let layout = WorldLayout::new(2, true, res as u32, 10.0, 100.0, 6.0).unwrap();
        let generator = HeightfieldGenerator::new(layout, 1234);
        let interior = generator.generate(1, 1);
        let north_interior = generator.generate(1, 2);
        let east_interior = generator.generate(2, 1);

        let south = generator.generate(1, 0);
        let west = generator.generate(0, 1);
        let north = generator.generate(1, 3);
        let east = generator.generate(3, 1);
        for i in 0..res {
            let pairs = [
                ("south", south.get(res - 1, i), interior.get(0, i)),
                ("west", west.get(i, res - 1), interior.get(i, 0)),
                ("north", north.get(0, i), north_interior.get(res - 1, i)),
                ("east", east.get(i, 0), east_interior.get(i, res - 1)),
            ];
            for (label, ridge, inner) in pairs {
                let (ridge, inner) = (ridge.unwrap(), inner.unwrap());
                assert!(
                    (ridge - inner).abs() <= TOLERANCE,
                    "{label} ridge seam at {i}: {ridge} vs {inner}"
                );
            }
        }

        let mut outward = south.column(5);
        outward.reverse();
        assert_rises_outward(&outward, 1, "south");
    }

    #[test]
    fn test_ridge_band_uses_interior_noise() {
        let generator = generator(true);
        let north = generator.generate(1, 5);
        let expected = generator.sample(1, 5, 7, 0) as f32;
        assert_eq!(north.get(0, 7), Some(expected));
    }

    #[test]
    fn test_without_ring_all_tiles_are_noise() {
        let generator = generator(false);
        let corner = generator.generate(0, 0);
        assert_eq!(corner, generator.interior(0, 0));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generator(true).generate(3, 2);
        let b = generator(true).generate(3, 2);
        assert_eq!(a, b);
    }
}

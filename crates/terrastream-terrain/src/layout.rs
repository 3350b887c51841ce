//! Tile-to-world geometry of the streamed world.

use glam::DVec3;

use crate::error::TerrainError;

/// Minimum samples per tile side.
const MIN_RESOLUTION: u32 = 32;

/// Which side of the world a ridge tile bounds.
///
/// North is `+y` in tile space (`+z` in world space), east is `+x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    North,
    South,
    East,
    West,
}

impl EdgeSide {
    /// Edge side for a tile on the outer ring of a `width × width` world.
    ///
    /// Corner tiles belong to the east/west edge. Returns `None` for tiles
    /// off the ring.
    pub fn for_tile(tile_x: u32, tile_y: u32, width: u32) -> Option<Self> {
        let last = width.checked_sub(1)?;
        if tile_x == 0 {
            Some(Self::West)
        } else if tile_x == last {
            Some(Self::East)
        } else if tile_y == 0 {
            Some(Self::South)
        } else if tile_y == last {
            Some(Self::North)
        } else {
            None
        }
    }
}

/// Fixed geometry shared by the generator, scheduler and backends.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldLayout {
    width: u32,
    border_ring: bool,
    resolution: u32,
    grid_size: f64,
    max_height: f64,
    noise_scale: f64,
}

impl WorldLayout {
    /// Build a layout of `dimension` playable tiles per side, plus a one-tile
    /// ridge ring when `border_ring` is set.
    pub fn new(
        dimension: u32,
        border_ring: bool,
        resolution: u32,
        grid_size: f64,
        max_height: f64,
        noise_scale: f64,
    ) -> Result<Self, TerrainError> {
        if dimension == 0 {
            return Err(TerrainError::EmptyWorld);
        }
        if resolution < MIN_RESOLUTION {
            return Err(TerrainError::InvalidResolution(resolution));
        }
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return Err(TerrainError::InvalidGridSize(grid_size));
        }
        let width = if border_ring { dimension + 2 } else { dimension };
        Ok(Self {
            width,
            border_ring,
            resolution,
            grid_size,
            max_height,
            noise_scale,
        })
    }

    /// Tiles per world side, border ring included.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether the outer ring is made of ridge tiles.
    pub fn has_border_ring(&self) -> bool {
        self.border_ring
    }

    /// Heightfield samples per tile side.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// World units per tile side.
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// World units per unit of heightfield sample.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Noise frequency multiplier across the whole world.
    pub fn noise_scale(&self) -> f64 {
        self.noise_scale
    }

    /// Ridge side of a tile, or `None` for playable tiles.
    pub fn edge_side(&self, tile_x: u32, tile_y: u32) -> Option<EdgeSide> {
        if !self.border_ring {
            return None;
        }
        EdgeSide::for_tile(tile_x, tile_y, self.width)
    }

    /// True when the tile lies on the non-playable outer ring.
    pub fn is_border(&self, tile_x: u32, tile_y: u32) -> bool {
        self.edge_side(tile_x, tile_y).is_some()
    }

    /// World-space corner of a tile: `(x·grid, 0, y·grid)`.
    pub fn tile_origin(&self, tile_x: u32, tile_y: u32) -> DVec3 {
        DVec3::new(
            f64::from(tile_x) * self.grid_size,
            0.0,
            f64::from(tile_y) * self.grid_size,
        )
    }

    /// Total samples across the world along one axis, used to normalize noise input.
    pub fn world_extent_samples(&self) -> f64 {
        f64::from(self.resolution) * f64::from(self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(dimension: u32, border_ring: bool) -> WorldLayout {
        WorldLayout::new(dimension, border_ring, 33, 10.0, 50.0, 4.0).unwrap()
    }

    #[test]
    fn test_border_ring_adds_two_tiles() {
        assert_eq!(layout(4, true).width(), 6);
        assert_eq!(layout(4, false).width(), 4);
    }

    #[test]
    fn test_edge_sides_on_ring() {
        let l = layout(3, true);
        assert_eq!(l.edge_side(0, 2), Some(EdgeSide::West));
        assert_eq!(l.edge_side(4, 2), Some(EdgeSide::East));
        assert_eq!(l.edge_side(2, 0), Some(EdgeSide::South));
        assert_eq!(l.edge_side(2, 4), Some(EdgeSide::North));
        assert_eq!(l.edge_side(2, 2), None);
    }

    #[test]
    fn test_corners_belong_to_east_west() {
        let l = layout(3, true);
        assert_eq!(l.edge_side(0, 0), Some(EdgeSide::West));
        assert_eq!(l.edge_side(4, 4), Some(EdgeSide::East));
        assert_eq!(l.edge_side(0, 4), Some(EdgeSide::West));
    }

    #[test]
    fn test_no_edges_without_ring() {
        let l = layout(3, false);
        assert!(!l.is_border(0, 0));
        assert!(!l.is_border(2, 1));
    }

    #[test]
    fn test_tile_origin_is_affine() {
        let l = layout(3, true);
        assert_eq!(l.tile_origin(2, 3), DVec3::new(20.0, 0.0, 30.0));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            WorldLayout::new(0, true, 33, 10.0, 1.0, 1.0),
            Err(TerrainError::EmptyWorld)
        ));
        assert!(matches!(
            WorldLayout::new(2, true, 16, 10.0, 1.0, 1.0),
            Err(TerrainError::InvalidResolution(16))
        ));
        assert!(matches!(
            WorldLayout::new(2, true, 33, -1.0, 1.0, 1.0),
            Err(TerrainError::InvalidGridSize(_))
        ));
    }
}

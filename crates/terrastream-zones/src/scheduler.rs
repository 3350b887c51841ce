//! Distance-driven choice of which zone to load or unload next.
//!
//! Each tick the scheduler makes at most one decision of each kind, and only
//! when nothing is being unloaded does it look for something to load. Scans
//! run in row-major order, so ties always resolve the same way.

use glam::DVec3;

use crate::coord::TileCoord;
use crate::grid::ZoneGrid;
use crate::zone::ZoneState;

/// Squared distance on the ground plane from `position` to the tile rectangle
/// `[x·g, (x+1)·g] × [y·g, (y+1)·g]`. Zero when the position is inside.
///
/// World `x` maps to tile `x` and world `z` to tile `y`; height is ignored.
pub fn sqr_distance(position: DVec3, coord: TileCoord, grid_size: f64) -> f64 {
    let min_x = f64::from(coord.x) * grid_size;
    let max_x = min_x + grid_size;
    let min_z = f64::from(coord.y) * grid_size;
    let max_z = min_z + grid_size;

    let dx = axis_gap(position.x, min_x, max_x);
    let dz = axis_gap(position.z, min_z, max_z);
    dx * dx + dz * dz
}

fn axis_gap(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// Decisions for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickPlan {
    pub unload: Option<TileCoord>,
    pub load: Option<TileCoord>,
}

impl TickPlan {
    pub fn is_idle(&self) -> bool {
        self.unload.is_none() && self.load.is_none()
    }
}

/// Picks the first loaded zone (row-major) past the unload distance to drop,
/// and the nearest eligible zone to bring in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceScheduler {
    grid_size: f64,
    unload_distance: f64,
    min_display_distance: f64,
}

impl DistanceScheduler {
    pub fn new(grid_size: f64, unload_distance: f64, min_display_distance: f64) -> Self {
        Self {
            grid_size,
            unload_distance,
            min_display_distance,
        }
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn unload_distance(&self) -> f64 {
        self.unload_distance
    }

    pub fn min_display_distance(&self) -> f64 {
        self.min_display_distance
    }

    /// Plan one tick. A tick that unloads does not also load.
    pub fn plan<S>(&self, grid: &ZoneGrid<S>, position: DVec3) -> TickPlan {
        if let Some(unload) = self.unload_candidate(grid, position) {
            return TickPlan {
                unload: Some(unload),
                load: None,
            };
        }
        TickPlan {
            unload: None,
            load: self.load_candidate(grid, position),
        }
    }

    /// First `Loaded` zone, row-major, farther than the unload distance.
    pub fn unload_candidate<S>(&self, grid: &ZoneGrid<S>, position: DVec3) -> Option<TileCoord> {
        let threshold = self.unload_distance * self.unload_distance;
        let (coord, d) = grid
            .iter()
            .filter(|zone| zone.state() == ZoneState::Loaded)
            .map(|zone| (zone.coord(), sqr_distance(position, zone.coord(), self.grid_size)))
            .find(|&(_, d)| d > threshold)?;
        tracing::debug!(x = coord.x, y = coord.y, sqr_distance = d, "unload candidate");
        Some(coord)
    }

    /// Nearest `Unloaded`, loadable zone strictly inside the display distance.
    /// Ties keep the first zone met in row-major order.
    pub fn load_candidate<S>(&self, grid: &ZoneGrid<S>, position: DVec3) -> Option<TileCoord> {
        let mut best: Option<(TileCoord, f64)> = None;
        let mut closest = self.min_display_distance * self.min_display_distance;
        for zone in grid.iter() {
            if zone.state() != ZoneState::Unloaded || !zone.is_loadable() {
                continue;
            }
            let d = sqr_distance(position, zone.coord(), self.grid_size);
            if d < closest {
                closest = d;
                best = Some((zone.coord(), d));
            }
        }
        if let Some((coord, d)) = best {
            tracing::debug!(x = coord.x, y = coord.y, sqr_distance = d, "load candidate");
        }
        best.map(|(coord, _)| coord)
    }
}

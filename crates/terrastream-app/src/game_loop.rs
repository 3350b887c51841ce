//! Fixed-timestep simulation clock.
//!
//! Frame time is fed in by the caller and consumed in whole [`FIXED_DT`]
//! steps; the remainder carries over to the next frame. A headless run feeds
//! simulated frame times, so the same inputs always produce the same sequence
//! of streaming ticks.

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame accepted before clamping, so a stall does not turn into a
/// burst of catch-up steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator-based fixed-timestep loop.
#[derive(Debug, Default)]
pub struct GameLoop {
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `frame_time` seconds, calling `update_fn(FIXED_DT, sim_time)`
    /// once per whole step. Returns the number of steps run.
    pub fn advance(&mut self, frame_time: f64, mut update_fn: impl FnMut(f64, f64)) -> u32 {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time.max(0.0)
        };

        self.accumulator += frame_time;
        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
            steps += 1;
        }
        self.frame_count += 1;
        steps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Fixed steps run so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Simulated seconds elapsed.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

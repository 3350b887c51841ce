//! Terrastream application: platform directories, the fixed-timestep clock
//! and the headless streaming session driven by the `terrastream` binary.

pub mod game_loop;
pub mod platform;
pub mod session;

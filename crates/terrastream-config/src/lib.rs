//! Configuration system for Terrastream.
//!
//! Provides world and streaming settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, validation of the
//! streaming distances, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SourceKind, StreamingConfig, WorldConfig};
pub use error::ConfigError;

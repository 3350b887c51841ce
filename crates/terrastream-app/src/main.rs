//! The `terrastream` binary.
//!
//! Loads `config.ron` (created with defaults on first run), applies CLI
//! overrides, then walks an observer across the world for `--ticks` fixed
//! steps while zones stream in and out.
//!
//! Run with `cargo run -p terrastream-app -- --dimension 4 --ticks 1200`.

use std::process::ExitCode;

use clap::Parser;
use terrastream_app::platform::PlatformDirs;
use terrastream_app::session;
use terrastream_config::{CliArgs, Config};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match args.config.as_deref() {
        Some(root) => PlatformDirs::with_root(root),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create platform directories: {e}");
        return ExitCode::FAILURE;
    }

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if config.streaming.asset_dir.is_none() {
        config.streaming.asset_dir = Some(dirs.data_dir.join("tiles"));
    }

    terrastream_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    info!(
        config = %dirs.config_dir.display(),
        logs = %dirs.log_dir.display(),
        ticks = args.ticks,
        speed = args.speed,
        "terrastream starting"
    );

    match session::run(&config, args.ticks, args.speed) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                sim_steps = summary.sim_steps,
                loads = summary.loads_completed,
                failed = summary.loads_failed,
                rejected = summary.loads_rejected,
                unloads = summary.unloads,
                loaded_zones = summary.loaded_zones,
                live_surfaces = summary.live_surfaces,
                "session complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("streaming session failed: {e}");
            ExitCode::FAILURE
        }
    }
}

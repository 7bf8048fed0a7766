//! The `caustica` binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p caustica-app -- --resolution 256 --seed 7`.

use std::path::PathBuf;
use std::process::ExitCode;

use caustica_config::{CliArgs, Config};
use clap::Parser;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let (mut config, load_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs::data_local_dir().map(|dir| dir.join("caustica").join("logs"));
    caustica_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        warn!(error = %e, dir = %config_dir.display(), "using default config");
    }

    match caustica_app::run(&config) {
        Ok(path) => {
            info!(path = %path.display(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "caustic generation failed");
            ExitCode::FAILURE
        }
    }
}

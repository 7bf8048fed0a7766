//! Configuration for the caustic generator.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line via clap. Every section tolerates missing and unknown fields,
//! so config files written by older or newer builds still load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, HeightLayerConfig, LightConfig, OutputConfig, SurfaceConfig,
};
pub use error::ConfigError;

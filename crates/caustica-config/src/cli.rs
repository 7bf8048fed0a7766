//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Caustic texture generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "caustica", about = "Generate caustic light textures")]
pub struct CliArgs {
    /// Output image size in pixels (square).
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Number of jittered supersampling passes.
    #[arg(long)]
    pub passes: Option<u32>,

    /// Box blur window size in pixels.
    #[arg(long)]
    pub blur_size: Option<u32>,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory generated images are written to.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(resolution) = args.resolution {
            self.light.resolution = resolution;
        }
        if let Some(passes) = args.passes {
            self.light.passes = passes;
        }
        if let Some(blur_size) = args.blur_size {
            self.light.blur_size = blur_size;
        }
        if let Some(seed) = args.seed {
            self.light.seed = Some(seed);
        }
        if let Some(ref dir) = args.output_dir {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

//! Caustic texture generator: builds the water and terrain surfaces, casts
//! light through them, and writes the result as a PNG.

pub mod error;
pub mod generator;
pub mod output;

use std::path::PathBuf;

use caustica_config::Config;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

pub use error::{GeneratorError, OutputError};
pub use generator::{CausticGenerator, CausticTexture, TERRAIN_ID, WATER_ID};
pub use output::OutputWriter;

/// Generate one caustic texture from `config` and write it to the configured
/// output directory. Returns the path of the written image.
pub fn run(config: &Config) -> Result<PathBuf, GeneratorError> {
    let seed = config.light.seed.unwrap_or_else(rand::random);
    info!(seed, "starting caustic generation");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut generator = CausticGenerator::new();
    let texture =
        generator.cast_light_or_generate(&config.water, &config.terrain, &config.light, &mut rng)?;

    let writer = OutputWriter::from_config(&config.output);
    let path = writer.write(&texture.raster.to_rgba_image())?;
    Ok(path)
}

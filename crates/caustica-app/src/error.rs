//! Driver error types.

use std::path::PathBuf;

use caustica_light::LightError;
use caustica_mesh::MeshError;

/// Errors raised while generating surfaces or casting light.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Light was cast before the water and terrain meshes were generated.
    #[error("water and terrain surfaces must be generated before casting light")]
    MissingSurface,

    /// A surface could not be built from its settings.
    #[error("invalid {surface} surface: {source}")]
    InvalidConfiguration {
        /// Which surface was rejected.
        surface: &'static str,
        #[source]
        source: MeshError,
    },

    /// Light settings cannot produce an image.
    #[error("invalid light settings: {0}")]
    InvalidLightSettings(#[from] LightError),

    /// The image could not be written.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Errors raised while writing a generated image.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Filesystem failure under the output directory.
    #[error("failed to write image under {}: {source}", directory.display())]
    Io {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// Every candidate file name was taken by a concurrent writer.
    #[error("no free output file name under {}", directory.display())]
    NameExhausted { directory: PathBuf },
}

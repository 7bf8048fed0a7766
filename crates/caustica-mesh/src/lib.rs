//! Heightfield meshes: regular triangulated grids whose heights are perturbed by
//! gradient noise, sine waves, and uniform jitter.

mod error;
mod heightfield;
mod layers;
mod noise_field;

pub use error::MeshError;
pub use heightfield::{HeightfieldMesh, coord_to_index};
pub use layers::HeightLayer;
pub use noise_field::SurfaceNoise;

//! Caustic light simulation: refracts vertical light through a water surface
//! onto terrain and composites the arrivals into an RGBA raster.

mod compositor;
mod error;
mod refraction;
mod simulator;

pub use compositor::{
    BASE_INTENSITY, HIT_INTENSITY, Raster, accumulate, block_overwrite_blur, composite,
};
pub use error::LightError;
pub use refraction::refract;
pub use simulator::{CastParams, CastStats, LightHit, RefractionSimulator};

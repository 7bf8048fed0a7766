//! Seeded 2D gradient noise remapped into `[0, 1]`.

use noise::{NoiseFn, Perlin};

/// Smooth, deterministic 2D noise used by Perlin height layers.
///
/// The seed is fixed at construction, so the same `(x, z)` always yields the
/// same value for a given instance. Values lie in `[0, 1]`; integer lattice
/// points sample to exactly `0.5`.
#[derive(Clone, Debug)]
pub struct SurfaceNoise {
    perlin: Perlin,
    seed: u32,
}

impl SurfaceNoise {
    /// Create a noise field with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// Sample the field at a continuous 2D coordinate.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let raw = self.perlin.get([x, z]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// The seed this field was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for SurfaceNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

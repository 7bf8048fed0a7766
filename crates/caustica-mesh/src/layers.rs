//! Height perturbation layers applied to a mesh in caller-chosen order.

use glam::Vec2;
use rand::Rng;

use crate::heightfield::HeightfieldMesh;
use crate::noise_field::SurfaceNoise;

/// One additive height perturbation.
#[derive(Clone, Debug, PartialEq)]
pub enum HeightLayer {
    /// Gradient noise sampled at `origin + (x, z) * sample_step`.
    Perlin {
        origin: Vec2,
        amplitude: f32,
        sample_step_x: f32,
        sample_step_z: f32,
    },
    /// Sine ripples over grid indices.
    Sine { amplitude: f32, frequency: f32 },
    /// Uniform random offset per vertex in `[min, max)`.
    Jitter { min: f32, max: f32 },
}

impl HeightLayer {
    /// Apply this layer to `mesh`.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        mesh: &mut HeightfieldMesh,
        noise: &SurfaceNoise,
        rng: &mut R,
    ) {
        match *self {
            HeightLayer::Perlin {
                origin,
                amplitude,
                sample_step_x,
                sample_step_z,
            } => mesh.apply_perlin(noise, origin, amplitude, sample_step_x, sample_step_z),
            HeightLayer::Sine {
                amplitude,
                frequency,
            } => mesh.apply_sine(amplitude, frequency),
            HeightLayer::Jitter { min, max } => mesh.apply_jitter(min, max, rng),
        }
    }
}

impl HeightfieldMesh {
    /// Apply `layers` in order. Layers compose by addition.
    pub fn apply_layers<R: Rng + ?Sized>(
        &mut self,
        layers: &[HeightLayer],
        noise: &SurfaceNoise,
        rng: &mut R,
    ) {
        for layer in layers {
            layer.apply(self, noise, rng);
        }
        let (lo, hi) = self.height_range();
        tracing::debug!(
            layers = layers.len(),
            min_height = lo,
            max_height = hi,
            "applied height layers"
        );
    }
}

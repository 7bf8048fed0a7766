//! Holds the generated water and terrain surfaces and drives light casts.

use caustica_config::{HeightLayerConfig, LightConfig, SurfaceConfig};
use caustica_light::{CastParams, CastStats, Raster, RefractionSimulator, composite};
use caustica_mesh::{HeightLayer, HeightfieldMesh, MeshError, SurfaceNoise};
use caustica_raycast::{Surface, SurfaceId};
use rand::Rng;
use tracing::{debug, info};

use crate::error::GeneratorError;

/// Identity of the generated water surface.
pub const WATER_ID: SurfaceId = SurfaceId(0);

/// Identity of the generated terrain surface.
pub const TERRAIN_ID: SurfaceId = SurfaceId(1);

/// Result of one light cast.
#[derive(Clone, Debug)]
pub struct CausticTexture {
    /// Blurred light raster.
    pub raster: Raster,
    /// Counters gathered while casting.
    pub stats: CastStats,
}

/// Owns the water and terrain surfaces between generate, cast, and clear.
#[derive(Debug, Default)]
pub struct CausticGenerator {
    water: Option<Surface>,
    terrain: Option<Surface>,
}

impl CausticGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn water(&self) -> Option<&Surface> {
        self.water.as_ref()
    }

    pub fn terrain(&self) -> Option<&Surface> {
        self.terrain.as_ref()
    }

    /// Whether both surfaces are present.
    pub fn is_generated(&self) -> bool {
        self.water.is_some() && self.terrain.is_some()
    }

    /// Build both surfaces, replacing any held ones.
    ///
    /// Jitter layers draw from `rng`, water first. Nothing is replaced if
    /// either surface is rejected.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        water: &SurfaceConfig,
        terrain: &SurfaceConfig,
        rng: &mut R,
    ) -> Result<(), GeneratorError> {
        let water = build_surface(WATER_ID, water, rng).map_err(|source| {
            GeneratorError::InvalidConfiguration {
                surface: "water",
                source,
            }
        })?;
        let terrain = build_surface(TERRAIN_ID, terrain, rng).map_err(|source| {
            GeneratorError::InvalidConfiguration {
                surface: "terrain",
                source,
            }
        })?;

        info!(
            water_vertices = water.mesh().vertex_count(),
            terrain_vertices = terrain.mesh().vertex_count(),
            "generated surfaces"
        );
        self.water = Some(water);
        self.terrain = Some(terrain);
        Ok(())
    }

    /// Drop both surfaces.
    pub fn clear(&mut self) {
        if self.is_generated() {
            debug!("cleared surfaces");
        }
        self.water = None;
        self.terrain = None;
    }

    /// Cast light through the held surfaces and composite the result.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::MissingSurface`] if [`generate`](Self::generate) has
    /// not run since creation or the last [`clear`](Self::clear), and
    /// [`GeneratorError::InvalidLightSettings`] for unusable light settings.
    pub fn cast_light<R: Rng + ?Sized>(
        &self,
        light: &LightConfig,
        rng: &mut R,
    ) -> Result<CausticTexture, GeneratorError> {
        let (Some(water), Some(terrain)) = (&self.water, &self.terrain) else {
            return Err(GeneratorError::MissingSurface);
        };

        let params = cast_params(light);
        let simulator = RefractionSimulator::new(water, terrain, params)?;
        let (hits, stats) = simulator.cast(rng);
        let raster = composite(light.resolution, &hits, light.blur_size)?;
        Ok(CausticTexture { raster, stats })
    }

    /// Like [`cast_light`](Self::cast_light), generating the surfaces first
    /// if they are missing. Held surfaces are reused as they are.
    pub fn cast_light_or_generate<R: Rng + ?Sized>(
        &mut self,
        water: &SurfaceConfig,
        terrain: &SurfaceConfig,
        light: &LightConfig,
        rng: &mut R,
    ) -> Result<CausticTexture, GeneratorError> {
        if !self.is_generated() {
            self.generate(water, terrain, rng)?;
        }
        self.cast_light(light, rng)
    }
}

/// Build a surface mesh from its settings.
pub fn build_surface<R: Rng + ?Sized>(
    id: SurfaceId,
    config: &SurfaceConfig,
    rng: &mut R,
) -> Result<Surface, MeshError> {
    let mut mesh = HeightfieldMesh::from_extent(
        config.width_segments,
        config.depth_segments,
        config.width,
        config.depth,
    )?;
    let layers: Vec<HeightLayer> = config.layers.iter().map(height_layer).collect();
    mesh.apply_layers(&layers, &SurfaceNoise::new(config.noise_seed), rng);
    Ok(Surface::new(id, config.position, mesh))
}

/// Simulator parameters for the given light settings.
pub fn cast_params(light: &LightConfig) -> CastParams {
    CastParams {
        resolution: light.resolution,
        passes: light.passes,
        jitter_min: light.jitter_min,
        jitter_max: light.jitter_max,
        incident_index: light.incident_index,
        refracting_index: light.refracting_index,
        probe_height: light.probe_height,
        refraction_offset: light.refraction_offset,
        distance_margin: light.distance_margin,
    }
}

fn height_layer(config: &HeightLayerConfig) -> HeightLayer {
    match *config {
        HeightLayerConfig::Perlin {
            origin,
            amplitude,
            sample_step_x,
            sample_step_z,
        } => HeightLayer::Perlin {
            origin,
            amplitude,
            sample_step_x,
            sample_step_z,
        },
        HeightLayerConfig::Sine {
            amplitude,
            frequency,
        } => HeightLayer::Sine {
            amplitude,
            frequency,
        },
        HeightLayerConfig::Jitter { min, max } => HeightLayer::Jitter { min, max },
    }
}

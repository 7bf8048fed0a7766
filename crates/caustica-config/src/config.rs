//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Refracting surface the light passes through.
    pub water: SurfaceConfig,
    /// Receiving surface the light lands on.
    pub terrain: SurfaceConfig,
    /// Light casting and compositing settings.
    pub light: LightConfig,
    /// Where generated images go.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// A heightfield surface placed in the world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// World-space position of the surface center.
    pub position: Vec3,
    /// Grid cells along X.
    pub width_segments: u32,
    /// Grid cells along Z.
    pub depth_segments: u32,
    /// Physical extent along X.
    pub width: f32,
    /// Physical extent along Z.
    pub depth: f32,
    /// Seed of the gradient noise used by Perlin layers.
    pub noise_seed: u32,
    /// Height perturbations, applied in order.
    pub layers: Vec<HeightLayerConfig>,
}

/// One height perturbation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HeightLayerConfig {
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

/// Light casting and compositing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Output image is `resolution x resolution` pixels.
    pub resolution: u32,
    /// Supersampling passes.
    pub passes: u32,
    /// Lower bound of the per-pass probe shift.
    pub jitter_min: f32,
    /// Upper bound (exclusive) of the per-pass probe shift.
    pub jitter_max: f32,
    /// Refractive index of the medium above the water (air).
    pub incident_index: f32,
    /// Refractive index of the water.
    pub refracting_index: f32,
    /// Box blur window size in pixels.
    pub blur_size: u32,
    /// Height of probe ray origins above the water surface.
    pub probe_height: f32,
    /// How far refracted rays start past the water hit point.
    pub refraction_offset: f32,
    /// Added to the water/terrain gap to bound ray distances.
    pub distance_margin: f32,
    /// RNG seed for jitter. `None` draws a fresh seed every run.
    pub seed: Option<u64>,
}

/// Output image settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory images are written to, created on demand.
    pub directory: PathBuf,
    /// Images are named `<file_prefix><n>.png`.
    pub file_prefix: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            water: SurfaceConfig::water(),
            terrain: SurfaceConfig::terrain(),
            light: LightConfig::default(),
            output: OutputConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl SurfaceConfig {
    /// Wavy water surface six units up, shaped by two octaves of noise.
    pub fn water() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 0.0),
            width: 2.25,
            depth: 2.25,
            layers: vec![
                HeightLayerConfig::Perlin {
                    origin: Vec2::ZERO,
                    amplitude: 0.25,
                    sample_step_x: 0.03,
                    sample_step_z: 0.03,
                },
                HeightLayerConfig::Perlin {
                    origin: Vec2::new(100.0, 100.0),
                    amplitude: 0.035,
                    sample_step_x: 0.1,
                    sample_step_z: 0.1,
                },
            ],
            ..Self::default()
        }
    }

    /// Flat terrain half a unit below the water.
    pub fn terrain() -> Self {
        Self {
            position: Vec3::new(0.0, 5.5, 0.0),
            ..Self::default()
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            width_segments: 200,
            depth_segments: 200,
            width: 2.0,
            depth: 2.0,
            noise_seed: 0,
            layers: Vec::new(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            passes: 5,
            jitter_min: 0.0,
            jitter_max: 0.1,
            incident_index: 1.0003,
            refracting_index: 1.33,
            blur_size: 5,
            probe_height: 1.0,
            refraction_offset: 0.001,
            distance_margin: 1.0,
            seed: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("gen-output"),
            file_prefix: "caustic".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Platform config directory for the generator, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("caustica"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

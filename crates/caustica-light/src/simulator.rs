//! Two-stage light raycasting: vertical probe rays onto the water surface,
//! refracted rays from the water onto the terrain.
//!
//! Every pass sweeps an `R x R` grid of probe rays over the water footprint,
//! shifted by a small random offset per pass. Each refracted ray that lands on
//! the terrain is recorded as a [`LightHit`] in terrain texel space.

use std::ops::AddAssign;

use caustica_raycast::{Ray, Surface, nearest_hit};
use glam::Vec3;
use rand::Rng;
use tracing::{debug, info};

use crate::error::LightError;
use crate::refraction::refract;

/// One light arrival on the terrain, in texel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightHit {
    pub x: u32,
    pub y: u32,
}

/// Parameters of a light cast.
#[derive(Clone, Debug, PartialEq)]
pub struct CastParams {
    /// Output raster is `resolution x resolution` texels.
    pub resolution: u32,
    /// Number of supersampling passes.
    pub passes: u32,
    /// Lower bound of the per-pass X/Z shift.
    pub jitter_min: f32,
    /// Upper bound (exclusive) of the per-pass X/Z shift.
    pub jitter_max: f32,
    /// Refractive index of the medium the light arrives from (air).
    pub incident_index: f32,
    /// Refractive index of the medium the light enters (water).
    pub refracting_index: f32,
    /// Height of the probe ray origins above the water surface's base plane.
    pub probe_height: f32,
    /// Distance a refracted ray is advanced before casting, so it does not
    /// re-hit the water surface it started on.
    pub refraction_offset: f32,
    /// Added to the water/terrain vertical gap to bound ray distances.
    pub distance_margin: f32,
}

impl Default for CastParams {
    fn default() -> Self {
        Self {
            resolution: 512,
            passes: 5,
            jitter_min: 0.0,
            jitter_max: 0.1,
            incident_index: 1.0003,
            refracting_index: 1.33,
            probe_height: 1.0,
            refraction_offset: 0.001,
            distance_margin: 1.0,
        }
    }
}

impl CastParams {
    /// Check the parameters can drive a cast.
    ///
    /// # Errors
    ///
    /// Returns [`LightError`] for a zero resolution, zero passes, or a
    /// non-positive refractive index.
    pub fn validate(&self) -> Result<(), LightError> {
        if self.resolution == 0 {
            return Err(LightError::InvalidResolution);
        }
        if self.passes == 0 {
            return Err(LightError::InvalidPassCount);
        }
        let valid_index = |n: f32| n > 0.0 && n.is_finite();
        if !valid_index(self.incident_index) || !valid_index(self.refracting_index) {
            return Err(LightError::InvalidRefractiveIndex {
                incident: self.incident_index,
                refracting: self.refracting_index,
            });
        }
        Ok(())
    }
}

/// Counters gathered while casting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastStats {
    /// Probe rays fired.
    pub probes: u64,
    /// Probe rays that hit the water.
    pub water_hits: u64,
    /// Refractions dropped because the radicand went negative.
    pub internal_reflections: u64,
    /// Refracted rays that hit the terrain or an occluder.
    pub terrain_hits: u64,
    /// Refracted rays stopped by a surface other than the terrain.
    pub foreign_hits: u64,
    /// Light hits recorded.
    pub light_hits: u64,
}

impl AddAssign for CastStats {
    fn add_assign(&mut self, rhs: Self) {
        self.probes += rhs.probes;
        self.water_hits += rhs.water_hits;
        self.internal_reflections += rhs.internal_reflections;
        self.terrain_hits += rhs.terrain_hits;
        self.foreign_hits += rhs.foreign_hits;
        self.light_hits += rhs.light_hits;
    }
}

/// Casts light through a water surface onto a terrain surface.
///
/// Refracted rays are tested against the terrain and any occluders; only
/// arrivals on the terrain itself are recorded.
pub struct RefractionSimulator<'a> {
    water: &'a Surface,
    terrain: &'a Surface,
    occluders: Vec<&'a Surface>,
    params: CastParams,
}

impl<'a> RefractionSimulator<'a> {
    /// Create a simulator over two surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`LightError`] if `params` fail [`CastParams::validate`].
    pub fn new(
        water: &'a Surface,
        terrain: &'a Surface,
        params: CastParams,
    ) -> Result<Self, LightError> {
        params.validate()?;
        Ok(Self {
            water,
            terrain,
            occluders: Vec::new(),
            params,
        })
    }

    /// Add surfaces that block refracted light before it reaches the terrain.
    pub fn with_occluders(mut self, occluders: impl IntoIterator<Item = &'a Surface>) -> Self {
        self.occluders.extend(occluders);
        self
    }

    pub fn params(&self) -> &CastParams {
        &self.params
    }

    /// Run every pass, drawing one jitter shift per pass from `rng`.
    ///
    /// Hits are returned pass by pass, and within a pass in x-major,
    /// y-minor texel order.
    pub fn cast<R: Rng + ?Sized>(&self, rng: &mut R) -> (Vec<LightHit>, CastStats) {
        let mut hits = Vec::new();
        let mut stats = CastStats::default();

        for pass in 0..self.params.passes {
            let shift = Vec3::new(
                sample_range(rng, self.params.jitter_min, self.params.jitter_max),
                0.0,
                sample_range(rng, self.params.jitter_min, self.params.jitter_max),
            );
            let (pass_hits, pass_stats) = self.sweep(shift);
            debug!(
                pass,
                shift_x = shift.x,
                shift_z = shift.z,
                water_hits = pass_stats.water_hits,
                light_hits = pass_stats.light_hits,
                "light pass complete"
            );
            hits.extend(pass_hits);
            stats += pass_stats;
        }

        info!(
            passes = self.params.passes,
            resolution = self.params.resolution,
            probes = stats.probes,
            water_hits = stats.water_hits,
            terrain_hits = stats.terrain_hits,
            internal_reflections = stats.internal_reflections,
            foreign_hits = stats.foreign_hits,
            light_hits = stats.light_hits,
            "light cast complete"
        );
        (hits, stats)
    }

    /// One pass over all texels with a fixed probe shift.
    ///
    /// Columns are split across worker threads; results are concatenated in
    /// column order, so the output matches a sequential sweep.
    pub fn sweep(&self, shift: Vec3) -> (Vec<LightHit>, CastStats) {
        let resolution = self.params.resolution;
        let workers = (num_cpus::get() as u32).clamp(1, resolution);
        let columns_per_worker = resolution.div_ceil(workers);

        let results: Vec<(Vec<LightHit>, CastStats)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let start = worker * columns_per_worker;
                    let end = (start + columns_per_worker).min(resolution);
                    scope.spawn(move || self.sweep_columns(start..end, shift))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut hits = Vec::new();
        let mut stats = CastStats::default();
        for (column_hits, column_stats) in results {
            hits.extend(column_hits);
            stats += column_stats;
        }
        (hits, stats)
    }

    fn sweep_columns(
        &self,
        columns: std::ops::Range<u32>,
        shift: Vec3,
    ) -> (Vec<LightHit>, CastStats) {
        let mut hits = Vec::new();
        let mut stats = CastStats::default();
        for x in columns {
            for y in 0..self.params.resolution {
                if let Some(hit) = self.trace_texel(x, y, shift, &mut stats) {
                    hits.push(hit);
                }
            }
        }
        (hits, stats)
    }

    /// Follow the light for output coordinate `(x, y)` through both surfaces.
    pub fn trace_texel(&self, x: u32, y: u32, shift: Vec3, stats: &mut CastStats) -> Option<LightHit> {
        let params = &self.params;
        let resolution = params.resolution as f32;
        let water_offset = self.water.mesh().center_offset();

        let sample_x = x as f32 * (2.0 * water_offset.x / resolution);
        let sample_z = (params.resolution - y) as f32 * (2.0 * water_offset.z / resolution);

        let probe = Ray {
            origin: self.water.position() + Vec3::new(sample_x, params.probe_height, sample_z)
                - water_offset
                + shift,
            direction: Vec3::NEG_Y,
        };
        let max_distance =
            self.water.position().y - self.terrain.position().y + params.distance_margin;

        stats.probes += 1;
        let water_hit = self.water.intersect(&probe, max_distance)?;
        stats.water_hits += 1;

        let Some(refracted) = refract(
            probe.direction,
            water_hit.normal,
            params.incident_index,
            params.refracting_index,
        ) else {
            stats.internal_reflections += 1;
            return None;
        };

        let refraction = Ray {
            origin: water_hit.point + refracted * params.refraction_offset,
            direction: refracted,
        };
        let receivers = std::iter::once(self.terrain).chain(self.occluders.iter().copied());
        let terrain_hit = nearest_hit(receivers, &refraction, max_distance)?;
        stats.terrain_hits += 1;

        if terrain_hit.surface != self.terrain.id() {
            stats.foreign_hits += 1;
            return None;
        }

        stats.light_hits += 1;
        Some(self.terrain_texel(terrain_hit.point))
    }

    /// Map a world-space point on the terrain to its texel.
    ///
    /// Coordinates round half to even and are clamped to `[0, R]`; the far
    /// edge `R` wraps around to texel `0`.
    pub fn terrain_texel(&self, point: Vec3) -> LightHit {
        let resolution = self.params.resolution;
        let terrain_offset = self.terrain.mesh().center_offset();
        let local = point - self.terrain.position() + terrain_offset;

        let u = local.x / (terrain_offset.x * 2.0) * resolution as f32;
        let v = local.z / (terrain_offset.z * 2.0) * resolution as f32;
        LightHit {
            x: address_texel(u, resolution),
            y: address_texel(v, resolution),
        }
    }
}

fn address_texel(coordinate: f32, resolution: u32) -> u32 {
    let texel = coordinate.round_ties_even().clamp(0.0, resolution as f32) as u32;
    if texel >= resolution { 0 } else { texel }
}

fn sample_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

//! Rectangular heightfield mesh: a flat vertex grid centered on the origin,
//! triangulated into two triangles per cell, with additive height operators.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::error::MeshError;
use crate::noise_field::SurfaceNoise;

/// Buffer position of grid vertex `(x, z)` in a mesh with `depth_segments` cells along Z.
///
/// Vertices are laid out x-major: every column of `depth_segments + 1`
/// vertices is contiguous.
#[inline]
pub fn coord_to_index(depth_segments: u32, x: u32, z: u32) -> usize {
    x as usize * (depth_segments as usize + 1) + z as usize
}

/// A triangulated grid of `(width_segments + 1) * (depth_segments + 1)` vertices.
///
/// The grid spans `width_segments * step_x` along X and `depth_segments * step_z`
/// along Z and is centered on the local origin. Heights start at zero and are
/// only ever changed by adding to them.
#[derive(Clone, Debug)]
pub struct HeightfieldMesh {
    width_segments: u32,
    depth_segments: u32,
    step_x: f32,
    step_z: f32,
    center_offset: Vec3,
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl HeightfieldMesh {
    /// Build a flat grid with the given segment counts and vertex spacing.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if a segment count is zero or a step is not
    /// positive and finite.
    pub fn new(
        width_segments: u32,
        depth_segments: u32,
        step_x: f32,
        step_z: f32,
    ) -> Result<Self, MeshError> {
        if width_segments == 0 || depth_segments == 0 {
            return Err(MeshError::InvalidSegments {
                width_segments,
                depth_segments,
            });
        }
        if !(step_x > 0.0 && step_x.is_finite() && step_z > 0.0 && step_z.is_finite()) {
            return Err(MeshError::InvalidStep { step_x, step_z });
        }

        let center_offset = Vec3::new(
            width_segments as f32 * step_x / 2.0,
            0.0,
            depth_segments as f32 * step_z / 2.0,
        );

        let vertex_count = (width_segments as usize + 1) * (depth_segments as usize + 1);
        let mut positions = Vec::with_capacity(vertex_count);
        for x in 0..=width_segments {
            for z in 0..=depth_segments {
                let local = Vec3::new(x as f32 * step_x, 0.0, z as f32 * step_z);
                positions.push(local - center_offset);
            }
        }

        let mut triangles =
            Vec::with_capacity(width_segments as usize * depth_segments as usize * 2);
        for x in 0..width_segments {
            for z in 0..depth_segments {
                let v0 = coord_to_index(depth_segments, x, z) as u32;
                let v1 = coord_to_index(depth_segments, x, z + 1) as u32;
                let v2 = coord_to_index(depth_segments, x + 1, z) as u32;
                let v3 = coord_to_index(depth_segments, x + 1, z + 1) as u32;
                triangles.push([v0, v1, v2]);
                triangles.push([v1, v3, v2]);
            }
        }

        Ok(Self {
            width_segments,
            depth_segments,
            step_x,
            step_z,
            center_offset,
            positions,
            triangles,
        })
    }

    /// Build a flat grid covering `width` x `depth` world units.
    ///
    /// # Errors
    ///
    /// Same conditions as [`HeightfieldMesh::new`], applied to the derived steps.
    pub fn from_extent(
        width_segments: u32,
        depth_segments: u32,
        width: f32,
        depth: f32,
    ) -> Result<Self, MeshError> {
        if width_segments == 0 || depth_segments == 0 {
            return Err(MeshError::InvalidSegments {
                width_segments,
                depth_segments,
            });
        }
        Self::new(
            width_segments,
            depth_segments,
            width / width_segments as f32,
            depth / depth_segments as f32,
        )
    }

    /// Add `amplitude * noise(origin + (x * sample_step_x, z * sample_step_z))`
    /// to every vertex height.
    pub fn apply_perlin(
        &mut self,
        noise: &SurfaceNoise,
        origin: Vec2,
        amplitude: f32,
        sample_step_x: f32,
        sample_step_z: f32,
    ) {
        if amplitude == 0.0 {
            return;
        }
        self.add_heights(|x, z| {
            let sample_x = origin.x as f64 + x as f64 * sample_step_x as f64;
            let sample_z = origin.y as f64 + z as f64 * sample_step_z as f64;
            amplitude * noise.sample(sample_x, sample_z) as f32
        });
    }

    /// Add a pair of sine waves over the grid indices:
    /// `0.25 * a * sin(z * f) + 0.75 * a * sin(x * f / 4)`.
    pub fn apply_sine(&mut self, amplitude: f32, frequency: f32) {
        if amplitude == 0.0 {
            return;
        }
        self.add_heights(|x, z| sine_offset(x, z, amplitude, frequency));
    }

    /// Add an independent uniform sample from `[min, max)` to every vertex height.
    ///
    /// An empty range (`max <= min`) adds `min` everywhere.
    pub fn apply_jitter<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        if min == 0.0 && max <= min {
            return;
        }
        self.add_heights(|_, _| {
            if max > min {
                rng.random_range(min..max)
            } else {
                min
            }
        });
    }

    fn add_heights(&mut self, mut delta: impl FnMut(u32, u32) -> f32) {
        for x in 0..=self.width_segments {
            for z in 0..=self.depth_segments {
                let index = coord_to_index(self.depth_segments, x, z);
                self.positions[index].y += delta(x, z);
            }
        }
    }

    /// Buffer position of grid vertex `(x, z)`.
    #[inline]
    pub fn index(&self, x: u32, z: u32) -> usize {
        coord_to_index(self.depth_segments, x, z)
    }

    /// Grid coordinate of buffer position `index`, the inverse of [`Self::index`].
    pub fn coord(&self, index: usize) -> (u32, u32) {
        let column = self.depth_segments as usize + 1;
        ((index / column) as u32, (index % column) as u32)
    }

    /// Height of grid vertex `(x, z)`.
    pub fn height(&self, x: u32, z: u32) -> f32 {
        self.positions[self.index(x, z)].y
    }

    /// Corner positions of triangle `index`, in mesh-local space.
    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Index of the first of the two triangles emitted for cell `(x, z)`.
    #[inline]
    pub fn cell_triangle(&self, x: u32, z: u32) -> usize {
        (x as usize * self.depth_segments as usize + z as usize) * 2
    }

    /// Minimum and maximum vertex heights.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            })
    }

    /// Vertex positions in mesh-local space.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn depth_segments(&self) -> u32 {
        self.depth_segments
    }

    pub fn step_x(&self) -> f32 {
        self.step_x
    }

    pub fn step_z(&self) -> f32 {
        self.step_z
    }

    /// Half the grid extent on X and Z: the translation that centered the grid.
    pub fn center_offset(&self) -> Vec3 {
        self.center_offset
    }
}

fn sine_offset(x: u32, z: u32, amplitude: f32, frequency: f32) -> f32 {
    let sample_z = z as f32 * frequency;
    let sample_x = x as f32 * frequency / 4.0;
    0.25 * amplitude * sample_z.sin() + 0.75 * amplitude * sample_x.sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const EPSILON: f32 = 1e-5;

    fn heights(mesh: &HeightfieldMesh) -> Vec<f32> {
        mesh.positions().iter().map(|p| p.y).collect()
    }

    #[test]
    fn test_buffer_sizes() {
        for (w, d) in [(1, 1), (2, 3), (7, 4), (16, 16)] {
            let mesh = HeightfieldMesh::new(w, d, 0.5, 0.25).unwrap();
            assert_eq!(mesh.vertex_count(), ((w + 1) * (d + 1)) as usize);
            assert_eq!(mesh.triangle_count(), (2 * w * d) as usize);
        }
    }

    #[test]
    fn test_index_is_bijection() {
        let mesh = HeightfieldMesh::new(5, 3, 1.0, 1.0).unwrap();
        let mut seen = HashSet::new();
        for x in 0..=5 {
            for z in 0..=3 {
                let index = mesh.index(x, z);
                assert!(index < mesh.vertex_count());
                assert!(seen.insert(index), "index {index} produced twice");
                assert_eq!(mesh.coord(index), (x, z));
            }
        }
        assert_eq!(seen.len(), mesh.vertex_count());
    }

    #[test]
    fn test_vertex_layout_matches_index() {
        let mesh = HeightfieldMesh::new(4, 2, 0.5, 2.0).unwrap();
        for x in 0..=4 {
            for z in 0..=2 {
                let p = mesh.positions()[mesh.index(x, z)];
                assert!((p.x - (x as f32 * 0.5 - 1.0)).abs() < EPSILON);
                assert!((p.z - (z as f32 * 2.0 - 2.0)).abs() < EPSILON);
                assert_eq!(p.y, 0.0);
            }
        }
    }

    #[test]
    fn test_grid_centered_on_origin() {
        let mesh = HeightfieldMesh::from_extent(13, 7, 2.25, 3.0).unwrap();
        let (min_x, max_x) = mesh
            .positions()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (min_z, max_z) = mesh
            .positions()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.z), hi.max(p.z)));
        assert!((min_x + max_x).abs() < EPSILON, "x extent {min_x}..{max_x}");
        assert!((min_z + max_z).abs() < EPSILON, "z extent {min_z}..{max_z}");
        assert!((mesh.center_offset().x - 1.125).abs() < EPSILON);
        assert!((mesh.center_offset().z - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_triangle_winding() {
        let mesh = HeightfieldMesh::new(2, 2, 1.0, 1.0).unwrap();
        let v0 = mesh.index(0, 0) as u32;
        let v1 = mesh.index(0, 1) as u32;
        let v2 = mesh.index(1, 0) as u32;
        let v3 = mesh.index(1, 1) as u32;
        assert_eq!(mesh.triangles()[0], [v0, v1, v2]);
        assert_eq!(mesh.triangles()[1], [v1, v3, v2]);

        // Winding yields upward-facing normals on a flat grid.
        for i in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(i);
            let n = (b - a).cross(c - a).normalize();
            assert!((n - Vec3::Y).length() < EPSILON);
        }
    }

    #[test]
    fn test_cell_triangle_lookup() {
        let mesh = HeightfieldMesh::new(3, 4, 1.0, 1.0).unwrap();
        let first = mesh.cell_triangle(2, 1);
        let [a, _, _] = mesh.triangles()[first];
        assert_eq!(a as usize, mesh.index(2, 1));
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(matches!(
            HeightfieldMesh::new(0, 4, 1.0, 1.0),
            Err(MeshError::InvalidSegments { .. })
        ));
        assert!(matches!(
            HeightfieldMesh::new(4, 0, 1.0, 1.0),
            Err(MeshError::InvalidSegments { .. })
        ));
        assert!(matches!(
            HeightfieldMesh::new(4, 4, 0.0, 1.0),
            Err(MeshError::InvalidStep { .. })
        ));
        assert!(matches!(
            HeightfieldMesh::new(4, 4, 1.0, -0.5),
            Err(MeshError::InvalidStep { .. })
        ));
        assert!(matches!(
            HeightfieldMesh::from_extent(4, 4, 2.0, f32::NAN),
            Err(MeshError::InvalidStep { .. })
        ));
        assert!(HeightfieldMesh::from_extent(0, 4, 2.0, 2.0).is_err());
    }

    #[test]
    fn test_zero_amplitude_is_noop() {
        let mut mesh = HeightfieldMesh::new(8, 8, 0.1, 0.1).unwrap();
        mesh.apply_sine(0.3, 0.7);
        let before = heights(&mesh);

        mesh.apply_perlin(&SurfaceNoise::new(1), Vec2::new(3.0, 4.0), 0.0, 0.1, 0.1);
        mesh.apply_sine(0.0, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        mesh.apply_jitter(0.0, 0.0, &mut rng);

        assert_eq!(heights(&mesh), before);
    }

    #[test]
    fn test_sine_values_and_determinism() {
        let mut a = HeightfieldMesh::new(6, 6, 1.0, 1.0).unwrap();
        let mut b = HeightfieldMesh::new(6, 6, 1.0, 1.0).unwrap();
        a.apply_sine(2.0, 0.5);
        b.apply_sine(2.0, 0.5);
        assert_eq!(heights(&a), heights(&b));

        let expected = 0.25 * 2.0 * (3.0_f32 * 0.5).sin() + 0.75 * 2.0 * (4.0_f32 * 0.5 / 4.0).sin();
        assert!((a.height(4, 3) - expected).abs() < EPSILON);
        assert_eq!(a.height(0, 0), 0.0);
    }

    #[test]
    fn test_perlin_is_deterministic_and_bounded() {
        let noise = SurfaceNoise::new(0);
        let mut a = HeightfieldMesh::new(20, 20, 0.1, 0.1).unwrap();
        let mut b = HeightfieldMesh::new(20, 20, 0.1, 0.1).unwrap();
        a.apply_perlin(&noise, Vec2::ZERO, 0.25, 0.03, 0.03);
        b.apply_perlin(&noise, Vec2::ZERO, 0.25, 0.03, 0.03);
        assert_eq!(heights(&a), heights(&b));

        let (lo, hi) = a.height_range();
        assert!(lo >= 0.0 && hi <= 0.25, "heights {lo}..{hi} outside [0, amplitude]");
        // Vertex (0, 0) samples the lattice origin.
        assert!((a.height(0, 0) - 0.125).abs() < EPSILON);
    }

    #[test]
    fn test_layers_accumulate() {
        let noise = SurfaceNoise::new(9);
        let mut combined = HeightfieldMesh::new(10, 10, 0.2, 0.2).unwrap();
        combined.apply_perlin(&noise, Vec2::new(100.0, 100.0), 0.035, 0.1, 0.1);
        combined.apply_sine(0.1, 0.3);

        let mut perlin_only = HeightfieldMesh::new(10, 10, 0.2, 0.2).unwrap();
        perlin_only.apply_perlin(&noise, Vec2::new(100.0, 100.0), 0.035, 0.1, 0.1);
        let mut sine_only = HeightfieldMesh::new(10, 10, 0.2, 0.2).unwrap();
        sine_only.apply_sine(0.1, 0.3);

        for i in 0..combined.vertex_count() {
            let sum = perlin_only.positions()[i].y + sine_only.positions()[i].y;
            assert!((combined.positions()[i].y - sum).abs() < EPSILON);
        }
    }

    #[test]
    fn test_jitter_seeded_and_in_range() {
        let mut a = HeightfieldMesh::new(12, 12, 0.1, 0.1).unwrap();
        let mut b = HeightfieldMesh::new(12, 12, 0.1, 0.1).unwrap();
        a.apply_jitter(-0.02, 0.05, &mut ChaCha8Rng::seed_from_u64(42));
        b.apply_jitter(-0.02, 0.05, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(heights(&a), heights(&b));

        for h in heights(&a) {
            assert!((-0.02..0.05).contains(&h), "jitter {h} out of range");
        }
        let distinct: HashSet<u32> = heights(&a).iter().map(|h| h.to_bits()).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_jitter_empty_range_adds_min() {
        let mut mesh = HeightfieldMesh::new(2, 2, 1.0, 1.0).unwrap();
        mesh.apply_jitter(0.5, 0.5, &mut ChaCha8Rng::seed_from_u64(0));
        assert!(heights(&mesh).iter().all(|&h| h == 0.5));
    }
}

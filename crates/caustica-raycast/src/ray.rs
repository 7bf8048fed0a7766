//! Rays and ray hit records.

use glam::Vec3;

/// Identity tag of a surface placed in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// A half-line with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start point in world space.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    ///
    /// # Panics
    ///
    /// Panics if `direction` has near-zero length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let len = direction.length();
        assert!(len > 1e-6, "ray direction must not be zero");
        Self {
            origin,
            direction: direction / len,
        }
    }

    /// Point at parametric distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// The nearest hit of a ray against a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Hit point in world space.
    pub point: Vec3,
    /// Unit face normal, oriented against the incoming ray.
    pub normal: Vec3,
    /// Surface that owns the hit triangle.
    pub surface: SurfaceId,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    /// Index of the hit triangle in the owning mesh.
    pub triangle: usize,
}

//! Two-sided Möller–Trumbore ray/triangle test.

use glam::Vec3;

/// Below this determinant magnitude the ray is treated as parallel to the
/// triangle plane (or the triangle as degenerate).
const DET_EPSILON: f32 = 1e-12;

/// A ray/triangle hit in the triangle's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    /// Parametric distance along the (unit) ray direction.
    pub distance: f32,
    /// Unit face normal from the triangle winding, flipped to face the ray.
    pub normal: Vec3,
}

/// Intersect a ray with triangle `[v0, v1, v2]`, accepting hits from either side.
///
/// Edges and corners count as inside. Degenerate (zero-area) triangles never
/// report a hit, nor do hits behind the origin.
pub fn ray_triangle(origin: Vec3, direction: Vec3, [v0, v1, v2]: [Vec3; 3]) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < DET_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t < 0.0 {
        return None;
    }

    let face = edge1.cross(edge2).try_normalize()?;
    let normal = if face.dot(direction) > 0.0 { -face } else { face };

    Some(TriangleHit {
        distance: t,
        normal,
    })
}

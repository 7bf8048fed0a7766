//! Vector-form Snell refraction.

use glam::Vec3;

/// Refract unit direction `incident` through a surface with unit `normal`
/// (facing against the incident light), going from index `n1` into `n2`.
///
/// Computes
/// `normalize(r * (N x (-N x I)) - N * sqrt(1 - dot((N x I) * r^2, N x I)))`
/// with `r = n1 / n2`.
///
/// Returns `None` when the radicand is negative (total internal reflection);
/// the light is then dropped rather than bent along an invalid direction.
pub fn refract(incident: Vec3, normal: Vec3, n1: f32, n2: f32) -> Option<Vec3> {
    let ratio = n1 / n2;
    let n_cross_i = normal.cross(incident);
    let radicand = 1.0 - (n_cross_i * (ratio * ratio)).dot(n_cross_i);
    if radicand < 0.0 {
        return None;
    }

    let tangential = ratio * normal.cross((-normal).cross(incident));
    (tangential - normal * radicand.sqrt()).try_normalize()
}

//! A heightfield mesh placed in the world under an identity tag.

use caustica_mesh::HeightfieldMesh;
use glam::Vec3;

use crate::ray::{Intersection, Ray, SurfaceId};
use crate::triangle::ray_triangle;

/// A mesh together with its world offset and identity.
///
/// The mesh is fixed once the surface is built; regenerate the surface
/// rather than mutating it.
#[derive(Clone, Debug)]
pub struct Surface {
    id: SurfaceId,
    position: Vec3,
    mesh: HeightfieldMesh,
}

impl Surface {
    pub fn new(id: SurfaceId, position: Vec3, mesh: HeightfieldMesh) -> Self {
        Self { id, position, mesh }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// World-space translation applied to every mesh vertex.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn mesh(&self) -> &HeightfieldMesh {
        &self.mesh
    }

    /// Nearest hit of `ray` against this surface within `[0, max_distance]`.
    ///
    /// Only grid cells whose XZ footprint can overlap the ray segment are
    /// tested (plus a one-cell margin so shared edges resolve as in a full
    /// scan), visited in triangle buffer order.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        if max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }

        let mesh = &self.mesh;
        let origin = ray.origin - self.position;
        let direction = ray.direction;
        let offset = mesh.center_offset();

        let (x_cells, z_cells) = if max_distance.is_finite() {
            let end = origin + direction * max_distance;
            (
                cell_span(
                    origin.x.min(end.x),
                    origin.x.max(end.x),
                    offset.x,
                    mesh.step_x(),
                    mesh.width_segments(),
                )?,
                cell_span(
                    origin.z.min(end.z),
                    origin.z.max(end.z),
                    offset.z,
                    mesh.step_z(),
                    mesh.depth_segments(),
                )?,
            )
        } else {
            (
                (0, mesh.width_segments() - 1),
                (0, mesh.depth_segments() - 1),
            )
        };

        let mut best: Option<(usize, f32, Vec3)> = None;
        for x in x_cells.0..=x_cells.1 {
            for z in z_cells.0..=z_cells.1 {
                let first = mesh.cell_triangle(x, z);
                for triangle in first..first + 2 {
                    let Some(hit) = ray_triangle(origin, direction, mesh.triangle(triangle))
                    else {
                        continue;
                    };
                    if hit.distance > max_distance {
                        continue;
                    }
                    if best.is_none_or(|(_, distance, _)| hit.distance < distance) {
                        best = Some((triangle, hit.distance, hit.normal));
                    }
                }
            }
        }

        best.map(|(triangle, distance, normal)| Intersection {
            point: ray.at(distance),
            normal,
            surface: self.id,
            distance,
            triangle,
        })
    }
}

/// Nearest hit of `ray` across several surfaces within `[0, max_distance]`.
///
/// Equal distances resolve to the surface that comes first.
pub fn nearest_hit<'s>(
    surfaces: impl IntoIterator<Item = &'s Surface>,
    ray: &Ray,
    max_distance: f32,
) -> Option<Intersection> {
    surfaces
        .into_iter()
        .filter_map(|surface| surface.intersect(ray, max_distance))
        .fold(None, |best: Option<Intersection>, hit| match best {
            Some(b) if b.distance <= hit.distance => Some(b),
            _ => Some(hit),
        })
}

/// Inclusive range of cells along one axis that a segment spanning local
/// coordinates `[lo, hi]` may touch, or `None` if it lies off the grid.
fn cell_span(lo: f32, hi: f32, offset: f32, step: f32, segments: u32) -> Option<(u32, u32)> {
    let first = ((lo + offset) / step).floor() as i64 - 1;
    let last = ((hi + offset) / step).floor() as i64 + 1;
    let first = first.max(0);
    let last = last.min(segments as i64 - 1);
    (first <= last).then_some((first as u32, last as u32))
}

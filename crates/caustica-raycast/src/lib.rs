//! Ray queries against heightfield meshes placed in the world.
//!
//! Intersection semantics match a brute-force scan over every triangle of the
//! mesh: the nearest hit within `[0, max_distance]` wins, with ties going to
//! the triangle that comes first in the mesh's triangle buffer.

mod ray;
mod surface;
mod triangle;

pub use ray::{Intersection, Ray, SurfaceId};
pub use surface::{Surface, nearest_hit};
pub use triangle::{TriangleHit, ray_triangle};

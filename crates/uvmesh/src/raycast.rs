//! Ray-mesh intersection and barycentric transforms.
//!
//! Ray-triangle tests use the Moller-Trumbore algorithm. Polygons are
//! fan-triangulated from their first corner.

use glam::{Vec2, Vec3};

use crate::mesh::{FaceId, UvMesh};
use crate::projection::Ray;

/// Epsilon for floating point comparisons in ray intersection
pub const EPSILON: f32 = 1e-6;

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Closest intersection of a ray with a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Hit point in the ray's space
    pub position: Vec3,
    pub face: FaceId,
    /// Distance along the ray
    pub distance: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Returns the hit distance and barycentric coordinates if the ray intersects
/// the triangle. Both windings are hit.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;

    // Only accept hits in front of the ray
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Barycentric coordinates `(u, v)` of `point` relative to triangle
/// `(p0, p1, p2)`, with the point projected onto the triangle's plane
///
/// Returns `None` for degenerate triangles.
pub fn barycentric_coords(point: Vec3, p0: Vec3, p1: Vec3, p2: Vec3) -> Option<(f32, f32)> {
    let e0 = p1 - p0;
    let e1 = p2 - p0;
    let e2 = point - p0;

    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);
    let d20 = e2.dot(e0);
    let d21 = e2.dot(e1);

    let denom = d00 * d11 - d01 * d01;
    // Zero or near-collinear edges
    if denom.abs() <= EPSILON * d00 * d11 {
        return None;
    }

    let u = (d11 * d20 - d01 * d21) / denom;
    let v = (d00 * d21 - d01 * d20) / denom;
    Some((u, v))
}

/// Map a 3D point from triangle `(p0, p1, p2)` onto triangle `(t0, t1, t2)`
/// in 2D, by its barycentric weights
pub fn barycentric_transform(
    point: Vec3,
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    t0: Vec2,
    t1: Vec2,
    t2: Vec2,
) -> Option<Vec2> {
    let (u, v) = barycentric_coords(point, p0, p1, p2)?;
    Some(interpolate_vec2(t0, t1, t2, u, v))
}

/// Intersect a ray with one face, fan-triangulated from its first corner
pub fn ray_face_intersection(mesh: &UvMesh, face: FaceId, ray: &Ray) -> Option<f32> {
    let face = mesh.face(face)?;
    let positions: Vec<Vec3> = face
        .loops
        .iter()
        .filter_map(|l| mesh.vertex(l.vertex).map(|v| v.position))
        .collect();
    if positions.len() < 3 {
        return None;
    }

    let mut closest: Option<f32> = None;
    for i in 1..positions.len() - 1 {
        let hit = ray_triangle_intersection(
            ray.origin,
            ray.direction,
            positions[0],
            positions[i],
            positions[i + 1],
        );
        if let Some(hit) = hit {
            if closest.is_none_or(|t| hit.t < t) {
                closest = Some(hit.t);
            }
        }
    }
    closest
}

/// Cast a ray against every face and return the closest hit.
///
/// Brute force; [`crate::bvh::FaceBvh`] answers the same query faster.
pub fn raycast_faces(mesh: &UvMesh, ray: &Ray) -> Option<MeshHit> {
    let mut closest: Option<(f32, FaceId)> = None;

    for face in mesh.faces() {
        if let Some(t) = ray_face_intersection(mesh, face.id, ray) {
            let dominated = match closest {
                Some((prev, _)) => t >= prev,
                None => false,
            };
            if !dominated {
                closest = Some((t, face.id));
            }
        }
    }

    closest.map(|(t, face)| MeshHit {
        position: ray.at(t),
        face,
        distance: t,
    })
}

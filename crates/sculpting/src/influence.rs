//! Influence selection: which loops the brush reaches, and how strongly.

use glam::{Vec2, Vec3};
use tracing::trace;
use uvmesh::{FaceId, LoopRef, UvLayerId, UvMesh, ViewProjection};

use crate::brush::falloff_strength;

/// A loop inside the brush circle, captured when selected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceRecord {
    pub face: FaceId,
    /// Corner index within the face
    pub corner: usize,
    /// Object-space vertex position at selection time
    pub initial_position: Vec3,
    /// Region position of the vertex at selection time
    pub initial_region: Vec2,
    /// UV at selection time
    pub initial_uv: Vec2,
    /// Falloff weight, zero at the rim
    pub strength: f32,
}

impl InfluenceRecord {
    pub fn loop_ref(&self) -> LoopRef {
        LoopRef::new(self.face, self.corner)
    }
}

/// Collect every loop of every selected face whose vertex projects strictly
/// inside the brush circle around `center`.
///
/// Loops whose vertex does not project (behind the view) are skipped.
pub fn select_influenced(
    mesh: &UvMesh,
    view: &ViewProjection,
    layer: UvLayerId,
    center: Vec2,
    radius: f32,
    factor: f32,
) -> Vec<InfluenceRecord> {
    let mut records = Vec::new();

    for face in mesh.faces().iter().filter(|f| f.selected) {
        for (corner, l) in face.loops.iter().enumerate() {
            let Some(vertex) = mesh.vertex(l.vertex) else {
                continue;
            };
            let Some(region) = view.object_to_region(vertex.position) else {
                continue;
            };
            let distance = region.distance(center);
            if distance >= radius {
                continue;
            }
            let Some(uv) = l.uvs.get(layer.0) else {
                continue;
            };
            records.push(InfluenceRecord {
                face: face.id,
                corner,
                initial_position: vertex.position,
                initial_region: region,
                initial_uv: uv.uv,
                strength: falloff_strength(distance, radius, factor),
            });
        }
    }

    trace!(
        "select_influenced: {} loops within {} of {:?}",
        records.len(),
        radius,
        center
    );
    records
}

//! Face/loop mesh with per-loop UV layers
//!
//! Faces own an ordered list of loops (corners). Each loop points at a shared
//! vertex and at the edge leading to the next corner, and carries its own UV
//! data per layer, so UV seams can give one vertex different UVs in different
//! faces.

mod construction;
mod topology;
mod types;
mod uv;

use std::collections::HashMap;

pub use construction::{FaceDescription, MeshDescription};
pub use topology::VertexLoopIndex;
pub use types::{Edge, EdgeId, Face, FaceId, Loop, LoopRef, LoopUv, UvLayerId, Vertex, VertexId};

/// Mesh with face/loop topology and UV layers
#[derive(Debug, Clone, Default)]
pub struct UvMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    /// Map from (min, max) vertex pair to edge
    pub(crate) edge_map: HashMap<(VertexId, VertexId), EdgeId>,
    pub(crate) uv_layers: Vec<String>,
    pub(crate) active_uv_layer: Option<usize>,
    /// Faces in the order they were selected
    pub(crate) select_history: Vec<FaceId>,
    /// Bumped whenever faces, loops or edges are added
    pub(crate) topology_generation: u64,
    /// Bumped on topology changes and vertex moves
    pub(crate) geometry_generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    /// Two triangles sharing the diagonal of a unit square
    fn two_triangles() -> UvMesh {
        let mut mesh = UvMesh::new();
        let v0 = mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        let v2 = mesh.add_vertex(Vec3::new(1.0, 1.0, 0.0));
        let v3 = mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
        mesh.add_face(&[v0, v1, v2]).unwrap();
        mesh.add_face(&[v0, v2, v3]).unwrap();
        mesh
    }

    #[test]
    fn test_counts() {
        let mesh = two_triangles();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        // 4 boundary edges + 1 shared diagonal
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn test_shared_edge() {
        let mesh = two_triangles();
        // Loop 2 of face 0 runs v2 -> v0, loop 0 of face 1 runs v0 -> v2
        let a = mesh.loop_at(LoopRef::new(FaceId(0), 2)).unwrap().edge;
        let b = mesh.loop_at(LoopRef::new(FaceId(1), 0)).unwrap().edge;
        assert_eq!(a, b);
    }

    #[test]
    fn test_loops_have_uv_per_layer() {
        let mut mesh = two_triangles();
        assert!(mesh.active_uv_layer().is_none());
        let layer = mesh.add_uv_layer("UVMap");
        let target = LoopRef::new(FaceId(1), 1);
        assert!(mesh.set_loop_uv(layer, target, Vec2::new(0.5, 0.25)));
        assert_eq!(mesh.loop_uv(layer, target), Some(Vec2::new(0.5, 0.25)));
        // Same vertex (v2) seen from the other face keeps its own UV
        assert_eq!(
            mesh.loop_uv(layer, LoopRef::new(FaceId(0), 2)),
            Some(Vec2::ZERO)
        );
    }
}

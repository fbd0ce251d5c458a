//! Mesh indices kept alive across ticks.
//!
//! Both indices are keyed on the mesh's generation counters: the vertex loop
//! index is rebuilt when topology changes, the face BVH when any vertex
//! position (or topology) changes.

use tracing::debug;
use uvmesh::{FaceBvh, UvMesh, VertexLoopIndex};

#[derive(Debug, Default)]
pub struct SculptCaches {
    loop_index: Option<VertexLoopIndex>,
    bvh: Option<FaceBvh>,
}

impl SculptCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex to loops index, rebuilt if stale
    pub fn loop_index(&mut self, mesh: &UvMesh) -> &VertexLoopIndex {
        if !self.loop_index.as_ref().is_some_and(|i| i.is_current(mesh)) {
            debug!(
                "Rebuilding vertex loop index (topology generation {})",
                mesh.topology_generation()
            );
            self.loop_index = Some(VertexLoopIndex::build(mesh));
        }
        self.loop_index.get_or_insert_with(|| VertexLoopIndex::build(mesh))
    }

    /// Face BVH, rebuilt if stale
    pub fn bvh(&mut self, mesh: &UvMesh) -> &FaceBvh {
        if !self.bvh.as_ref().is_some_and(|b| b.is_current(mesh)) {
            debug!(
                "Rebuilding face BVH (geometry generation {})",
                mesh.geometry_generation()
            );
            self.bvh = Some(FaceBvh::build(mesh));
        }
        self.bvh.get_or_insert_with(|| FaceBvh::build(mesh))
    }

    /// Drop both indices
    pub fn clear(&mut self) {
        self.loop_index = None;
        self.bvh = None;
    }
}

//! Topology queries and selection for UvMesh.

use std::collections::BTreeMap;

use tracing::trace;

use super::types::{Edge, EdgeId, Face, FaceId, Loop, LoopRef, Vertex, VertexId};
use super::UvMesh;

impl UvMesh {
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0 as usize)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0 as usize)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Edge joining two vertices, in either order
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.edge_map.get(&key).copied()
    }

    pub fn loop_at(&self, at: LoopRef) -> Option<&Loop> {
        self.faces.get(at.face.0 as usize)?.loops.get(at.corner)
    }

    pub(crate) fn loop_at_mut(&mut self, at: LoopRef) -> Option<&mut Loop> {
        self.faces.get_mut(at.face.0 as usize)?.loops.get_mut(at.corner)
    }

    /// Next loop around the same face, wrapping at the end
    pub fn next_loop(&self, at: LoopRef) -> Option<LoopRef> {
        let n = self.face(at.face)?.len();
        (at.corner < n).then(|| LoopRef::new(at.face, (at.corner + 1) % n))
    }

    /// Previous loop around the same face, wrapping at the start
    pub fn prev_loop(&self, at: LoopRef) -> Option<LoopRef> {
        let n = self.face(at.face)?.len();
        (at.corner < n).then(|| LoopRef::new(at.face, (at.corner + n - 1) % n))
    }

    /// Object-space position of the vertex at a loop
    pub fn loop_position(&self, at: LoopRef) -> Option<glam::Vec3> {
        let l = self.loop_at(at)?;
        self.vertex(l.vertex).map(|v| v.position)
    }

    /// Move a vertex
    pub fn set_vertex_position(&mut self, id: VertexId, position: glam::Vec3) -> bool {
        match self.vertices.get_mut(id.0 as usize) {
            Some(v) => {
                v.position = position;
                self.geometry_generation += 1;
                true
            }
            None => false,
        }
    }

    /// Select or deselect a face
    ///
    /// Selecting appends the face to the selection history; deselecting
    /// removes it.
    pub fn select_face(&mut self, id: FaceId, selected: bool) -> bool {
        let Some(face) = self.faces.get_mut(id.0 as usize) else {
            return false;
        };
        face.selected = selected;
        self.select_history.retain(|&f| f != id);
        if selected {
            self.select_history.push(id);
        }
        trace!("select_face {:?} = {}", id, selected);
        true
    }

    /// Select or deselect every face
    pub fn select_all(&mut self, selected: bool) {
        self.select_history.clear();
        for face in &mut self.faces {
            face.selected = selected;
            if selected {
                self.select_history.push(face.id);
            }
        }
    }

    /// Selected faces, in face order
    pub fn selected_faces(&self) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.id)
            .collect()
    }

    /// Selected faces, in the order they were selected
    pub fn select_history(&self) -> &[FaceId] {
        &self.select_history
    }

    pub fn topology_generation(&self) -> u64 {
        self.topology_generation
    }

    pub fn geometry_generation(&self) -> u64 {
        self.geometry_generation
    }
}

/// Loops grouped by the vertex they sit on
///
/// Built once per topology generation and reused across stroke samples.
#[derive(Debug, Clone, Default)]
pub struct VertexLoopIndex {
    by_vertex: BTreeMap<VertexId, Vec<LoopRef>>,
    generation: u64,
}

impl VertexLoopIndex {
    pub fn build(mesh: &UvMesh) -> Self {
        let mut by_vertex: BTreeMap<VertexId, Vec<LoopRef>> = BTreeMap::new();
        for face in &mesh.faces {
            for (corner, l) in face.loops.iter().enumerate() {
                by_vertex
                    .entry(l.vertex)
                    .or_default()
                    .push(LoopRef::new(face.id, corner));
            }
        }
        trace!("VertexLoopIndex: {} vertices with loops", by_vertex.len());
        Self {
            by_vertex,
            generation: mesh.topology_generation,
        }
    }

    /// Topology generation the index was built from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the index still matches the mesh topology
    pub fn is_current(&self, mesh: &UvMesh) -> bool {
        self.generation == mesh.topology_generation
    }

    /// Loops at a vertex (empty for vertices no face uses)
    pub fn loops(&self, vertex: VertexId) -> &[LoopRef] {
        self.by_vertex.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Vertices with at least one loop, in id order
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &[LoopRef])> {
        self.by_vertex.iter().map(|(v, loops)| (*v, loops.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_vertex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vertex.is_empty()
    }
}

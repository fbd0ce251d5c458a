//! Type definitions for the UV mesh.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Type-safe edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Type-safe face identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

/// Index of a UV layer on the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UvLayerId(pub usize);

/// Address of one loop: a face and the corner index within that face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopRef {
    pub face: FaceId,
    pub corner: usize,
}

impl LoopRef {
    pub fn new(face: FaceId, corner: usize) -> Self {
        Self { face, corner }
    }
}

/// A vertex, shared by every loop around it
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec3,
}

/// An edge, shared by the (at most two manifold) loops running along it
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: (VertexId, VertexId),
    /// UV island boundary marker
    pub seam: bool,
}

/// Per-layer UV data of a loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopUv {
    pub uv: Vec2,
    /// Fixed against automatic unwrapping
    pub pin: bool,
}

/// One corner of a face
#[derive(Debug, Clone)]
pub struct Loop {
    /// Vertex at this corner
    pub vertex: VertexId,
    /// Edge from this corner's vertex to the next corner's vertex
    pub edge: EdgeId,
    /// UV data, one entry per UV layer
    pub uvs: Vec<LoopUv>,
}

/// A polygon; owns its loops positionally (index = corner)
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    pub loops: Vec<Loop>,
    pub selected: bool,
}

impl Face {
    /// Number of corners
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

//! Construction methods for UvMesh.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Edge, EdgeId, Face, FaceId, Loop, LoopRef, LoopUv, Vertex, VertexId};
use super::UvMesh;
use crate::error::MeshError;

/// Name given to the UV layer when a description carries UVs but no layer name
const DEFAULT_UV_LAYER_NAME: &str = "UVMap";

/// Serializable description of a mesh with one UV layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDescription {
    /// Vertex positions in object space
    pub positions: Vec<[f32; 3]>,
    pub faces: Vec<FaceDescription>,
    /// Name of the UV layer holding `FaceDescription::uvs`
    pub uv_layer: Option<String>,
    /// Vertex index pairs of seam edges
    pub seams: Vec<[u32; 2]>,
}

/// Serializable description of one face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDescription {
    /// Vertex indices in corner order
    pub vertices: Vec<u32>,
    /// Per-corner UVs (empty = zero)
    pub uvs: Vec<[f32; 2]>,
    /// Per-corner pin flags (empty = unpinned)
    pub pins: Vec<bool>,
    pub selected: bool,
}

impl UvMesh {
    /// Create an empty mesh with no UV layers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex
    pub fn add_vertex(&mut self, position: Vec3) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex { id, position });
        self.geometry_generation += 1;
        id
    }

    /// Add a face through the given vertices, in corner order
    ///
    /// Edges are shared with existing faces that run along the same vertex
    /// pair. Every loop gets a zero, unpinned UV in each existing layer.
    pub fn add_face(&mut self, corners: &[VertexId]) -> Result<FaceId, MeshError> {
        if corners.len() < 3 {
            return Err(MeshError::InvalidTopology(format!(
                "Face needs at least 3 corners, got {}",
                corners.len()
            )));
        }
        for (i, v) in corners.iter().enumerate() {
            if v.0 as usize >= self.vertices.len() {
                return Err(MeshError::InvalidTopology(format!(
                    "Vertex {} out of range",
                    v.0
                )));
            }
            if corners[..i].contains(v) {
                return Err(MeshError::InvalidTopology(format!(
                    "Vertex {} repeated in face",
                    v.0
                )));
            }
        }

        let id = FaceId(self.faces.len() as u32);
        let layer_count = self.uv_layers.len();
        let mut loops = Vec::with_capacity(corners.len());
        for (i, &vertex) in corners.iter().enumerate() {
            let next = corners[(i + 1) % corners.len()];
            let edge = self.ensure_edge(vertex, next);
            loops.push(Loop {
                vertex,
                edge,
                uvs: vec![LoopUv::default(); layer_count],
            });
        }

        self.faces.push(Face {
            id,
            loops,
            selected: false,
        });
        self.topology_generation += 1;
        self.geometry_generation += 1;
        Ok(id)
    }

    /// Find or create the edge joining two vertices
    fn ensure_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&id) = self.edge_map.get(&key) {
            return id;
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            id,
            vertices: key,
            seam: false,
        });
        self.edge_map.insert(key, id);
        id
    }

    /// Build a mesh from a description
    pub fn from_description(desc: &MeshDescription) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        for p in &desc.positions {
            mesh.add_vertex(Vec3::from(*p));
        }

        let has_uvs = desc.faces.iter().any(|f| !f.uvs.is_empty());
        let layer = if desc.uv_layer.is_some() || has_uvs {
            let name = desc.uv_layer.as_deref().unwrap_or(DEFAULT_UV_LAYER_NAME);
            Some(mesh.add_uv_layer(name))
        } else {
            None
        };

        for face_desc in &desc.faces {
            let corners: Vec<VertexId> = face_desc.vertices.iter().map(|&i| VertexId(i)).collect();
            let face = mesh.add_face(&corners)?;

            for (attr, len) in [("uvs", face_desc.uvs.len()), ("pins", face_desc.pins.len())] {
                if len != 0 && len != corners.len() {
                    return Err(MeshError::InvalidTopology(format!(
                        "Face {} has {} corners but {} {}",
                        face.0,
                        corners.len(),
                        len,
                        attr
                    )));
                }
            }

            if let Some(layer) = layer {
                for (corner, uv) in face_desc.uvs.iter().enumerate() {
                    mesh.set_loop_uv(layer, LoopRef::new(face, corner), Vec2::from(*uv));
                }
                for (corner, &pin) in face_desc.pins.iter().enumerate() {
                    mesh.set_loop_pin(layer, LoopRef::new(face, corner), pin);
                }
            }

            if face_desc.selected {
                mesh.select_face(face, true);
            }
        }

        for [a, b] in &desc.seams {
            let (a, b) = (VertexId(*a), VertexId(*b));
            let edge = mesh.edge_between(a, b).ok_or_else(|| {
                MeshError::InvalidTopology(format!("Seam {}-{} is not an edge", a.0, b.0))
            })?;
            mesh.set_edge_seam(edge, true);
        }

        debug!(
            "from_description: {} vertices, {} faces, {} edges",
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.edge_count()
        );
        Ok(mesh)
    }

    /// Describe the mesh, using the active UV layer for UVs and pins
    pub fn to_description(&self) -> MeshDescription {
        let layer = self.active_uv_layer();
        let faces = self
            .faces
            .iter()
            .map(|face| {
                let (uvs, pins) = match layer {
                    Some(layer) => (
                        face.loops.iter().map(|l| l.uvs[layer.0].uv.to_array()).collect(),
                        face.loops.iter().map(|l| l.uvs[layer.0].pin).collect(),
                    ),
                    None => (Vec::new(), Vec::new()),
                };
                FaceDescription {
                    vertices: face.loops.iter().map(|l| l.vertex.0).collect(),
                    uvs,
                    pins,
                    selected: face.selected,
                }
            })
            .collect();

        MeshDescription {
            positions: self.vertices.iter().map(|v| v.position.to_array()).collect(),
            faces,
            uv_layer: layer.map(|l| self.uv_layers[l.0].clone()),
            seams: self
                .edges
                .iter()
                .filter(|e| e.seam)
                .map(|e| [e.vertices.0.0, e.vertices.1.0])
                .collect(),
        }
    }
}

//! UV layer management and per-loop UV access.

use glam::Vec2;
use tracing::{debug, warn};

use super::types::{EdgeId, LoopRef, LoopUv, UvLayerId};
use super::UvMesh;
use crate::error::MeshError;

impl UvMesh {
    /// Add a UV layer
    ///
    /// The new layer starts as a copy of the active layer, or zeroed when the
    /// mesh has none. The first layer added becomes active.
    pub fn add_uv_layer(&mut self, name: &str) -> UvLayerId {
        let source = self.active_uv_layer;
        for face in &mut self.faces {
            for l in &mut face.loops {
                let init = source.map(|s| l.uvs[s]).unwrap_or_default();
                l.uvs.push(init);
            }
        }
        self.uv_layers.push(name.to_string());
        let id = self.uv_layers.len() - 1;
        if self.active_uv_layer.is_none() {
            self.active_uv_layer = Some(id);
        }
        debug!("add_uv_layer: '{}' as layer {}", name, id);
        UvLayerId(id)
    }

    pub fn uv_layer_count(&self) -> usize {
        self.uv_layers.len()
    }

    pub fn uv_layer_names(&self) -> &[String] {
        &self.uv_layers
    }

    pub fn uv_layer_name(&self, layer: UvLayerId) -> Option<&str> {
        self.uv_layers.get(layer.0).map(String::as_str)
    }

    pub fn uv_layer_by_name(&self, name: &str) -> Option<UvLayerId> {
        self.uv_layers.iter().position(|n| n == name).map(UvLayerId)
    }

    pub fn set_active_uv_layer(&mut self, layer: UvLayerId) -> Result<(), MeshError> {
        if layer.0 >= self.uv_layers.len() {
            return Err(MeshError::UvLayerNotFound(format!("#{}", layer.0)));
        }
        self.active_uv_layer = Some(layer.0);
        Ok(())
    }

    pub fn active_uv_layer(&self) -> Option<UvLayerId> {
        self.active_uv_layer.map(UvLayerId)
    }

    /// Active UV layer, or [`MeshError::NoUvLayer`]
    pub fn require_active_uv_layer(&self) -> Result<UvLayerId, MeshError> {
        self.active_uv_layer().ok_or(MeshError::NoUvLayer)
    }

    fn loop_uv_data(&self, layer: UvLayerId, at: LoopRef) -> Option<&LoopUv> {
        self.loop_at(at)?.uvs.get(layer.0)
    }

    fn loop_uv_data_mut(&mut self, layer: UvLayerId, at: LoopRef) -> Option<&mut LoopUv> {
        self.loop_at_mut(at)?.uvs.get_mut(layer.0)
    }

    pub fn loop_uv(&self, layer: UvLayerId, at: LoopRef) -> Option<Vec2> {
        self.loop_uv_data(layer, at).map(|d| d.uv)
    }

    /// Write the UV of one loop
    ///
    /// Returns false when the loop or layer does not exist, or when the UV is
    /// not finite (the stored value is left unchanged).
    pub fn set_loop_uv(&mut self, layer: UvLayerId, at: LoopRef, uv: Vec2) -> bool {
        if !uv.is_finite() {
            warn!("Refusing non-finite UV {:?} for {:?}", uv, at);
            return false;
        }
        match self.loop_uv_data_mut(layer, at) {
            Some(d) => {
                d.uv = uv;
                true
            }
            None => false,
        }
    }

    pub fn loop_pin(&self, layer: UvLayerId, at: LoopRef) -> Option<bool> {
        self.loop_uv_data(layer, at).map(|d| d.pin)
    }

    pub fn set_loop_pin(&mut self, layer: UvLayerId, at: LoopRef, pin: bool) -> bool {
        match self.loop_uv_data_mut(layer, at) {
            Some(d) => {
                d.pin = pin;
                true
            }
            None => false,
        }
    }

    /// Seam flag of the edge leaving this loop
    pub fn loop_edge_seam(&self, at: LoopRef) -> Option<bool> {
        let edge = self.loop_at(at)?.edge;
        self.edge(edge).map(|e| e.seam)
    }

    pub fn set_edge_seam(&mut self, edge: EdgeId, seam: bool) -> bool {
        match self.edges.get_mut(edge.0 as usize) {
            Some(e) => {
                e.seam = seam;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{FaceId, VertexId};
    use glam::Vec3;

    fn triangle() -> UvMesh {
        let mut mesh = UvMesh::new();
        let a = mesh.add_vertex(Vec3::ZERO);
        let b = mesh.add_vertex(Vec3::X);
        let c = mesh.add_vertex(Vec3::Y);
        mesh.add_face(&[a, b, c]).unwrap();
        mesh
    }

    #[test]
    fn test_new_layer_copies_active() {
        let mut mesh = triangle();
        let first = mesh.add_uv_layer("UVMap");
        let at = LoopRef::new(FaceId(0), 1);
        mesh.set_loop_uv(first, at, Vec2::new(0.7, 0.2));
        mesh.set_loop_pin(first, at, true);

        let second = mesh.add_uv_layer("Copy");
        assert_eq!(mesh.uv_layer_names(), ["UVMap", "Copy"]);
        assert_eq!(mesh.active_uv_layer(), Some(first));
        assert_eq!(mesh.loop_uv(second, at), Some(Vec2::new(0.7, 0.2)));
        assert_eq!(mesh.loop_pin(second, at), Some(true));

        // Layers are independent afterwards
        mesh.set_loop_uv(second, at, Vec2::ONE);
        assert_eq!(mesh.loop_uv(first, at), Some(Vec2::new(0.7, 0.2)));
    }

    #[test]
    fn test_faces_added_after_layers_get_uvs() {
        let mut mesh = triangle();
        let layer = mesh.add_uv_layer("UVMap");
        let d = mesh.add_vertex(Vec3::ONE);
        let face = mesh
            .add_face(&[VertexId(1), d, VertexId(2)])
            .unwrap();
        assert_eq!(mesh.loop_uv(layer, LoopRef::new(face, 2)), Some(Vec2::ZERO));
    }

    #[test]
    fn test_set_loop_uv_rejects_non_finite() {
        let mut mesh = triangle();
        let layer = mesh.add_uv_layer("UVMap");
        let at = LoopRef::new(FaceId(0), 0);
        mesh.set_loop_uv(layer, at, Vec2::new(0.1, 0.1));

        assert!(!mesh.set_loop_uv(layer, at, Vec2::new(f32::NAN, 0.0)));
        assert!(!mesh.set_loop_uv(layer, at, Vec2::new(0.0, f32::INFINITY)));
        assert_eq!(mesh.loop_uv(layer, at), Some(Vec2::new(0.1, 0.1)));
        assert!(!mesh.set_loop_uv(UvLayerId(3), at, Vec2::ZERO));
    }

    #[test]
    fn test_require_active_layer() {
        let mut mesh = triangle();
        assert!(matches!(
            mesh.require_active_uv_layer(),
            Err(MeshError::NoUvLayer)
        ));
        let layer = mesh.add_uv_layer("UVMap");
        assert_eq!(mesh.require_active_uv_layer().unwrap(), layer);
        assert!(mesh.set_active_uv_layer(UvLayerId(5)).is_err());
    }
}

//! Copy and paste of per-face UV data.
//!
//! A copy captures, for every source face, the ordered UVs, pin flags and
//! edge seam flags of its loops. A paste writes those sequences onto
//! destination faces, optionally flipped and rotated, after checking that
//! every destination face has the same loop count as its source. All shapes
//! are checked before the first write, so a rejected paste leaves the mesh
//! untouched.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeshError, TransferError};
use crate::mesh::{FaceId, LoopRef, UvLayerId, UvMesh};

/// UVs, pins and seams of one face, in loop order
#[derive(Debug, Clone, PartialEq)]
pub struct FaceUvSnapshot {
    pub uvs: Vec<Vec2>,
    pub pins: Vec<bool>,
    pub seams: Vec<bool>,
}

impl FaceUvSnapshot {
    /// Capture one face from a UV layer
    pub fn capture(mesh: &UvMesh, layer: UvLayerId, face: FaceId) -> Result<Self, MeshError> {
        let f = mesh.face(face).ok_or(MeshError::FaceNotFound(face))?;
        let mut snapshot = Self {
            uvs: Vec::with_capacity(f.len()),
            pins: Vec::with_capacity(f.len()),
            seams: Vec::with_capacity(f.len()),
        };
        for l in &f.loops {
            let data = l
                .uvs
                .get(layer.0)
                .ok_or_else(|| MeshError::UvLayerNotFound(format!("#{}", layer.0)))?;
            snapshot.uvs.push(data.uv);
            snapshot.pins.push(data.pin);
            snapshot
                .seams
                .push(mesh.edge(l.edge).is_some_and(|e| e.seam));
        }
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.uvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uvs.is_empty()
    }

    /// Reverse the loop order
    pub fn flipped(&self) -> Self {
        let mut out = self.clone();
        out.uvs.reverse();
        out.pins.reverse();
        out.seams.reverse();
        out
    }

    /// Rotate right by `steps`: the last entry moves to the front, `steps`
    /// times
    pub fn rotated(&self, steps: usize) -> Self {
        let mut out = self.clone();
        if out.is_empty() {
            return out;
        }
        let k = steps % out.len();
        out.uvs.rotate_right(k);
        out.pins.rotate_right(k);
        out.seams.rotate_right(k);
        out
    }

    /// Flip (if requested) and then rotate
    pub fn arranged(&self, flip: bool, rotate: usize) -> Self {
        if flip {
            self.flipped().rotated(rotate)
        } else {
            self.rotated(rotate)
        }
    }

    /// Write onto a face with the same loop count
    pub fn write_to(
        &self,
        mesh: &mut UvMesh,
        layer: UvLayerId,
        face: FaceId,
        copy_seams: bool,
    ) -> Result<(), TransferError> {
        let dest = mesh.face(face).ok_or(MeshError::FaceNotFound(face))?.len();
        if dest != self.len() {
            return Err(TransferError::LoopCountMismatch {
                face,
                src: self.len(),
                dest,
            });
        }
        for corner in 0..dest {
            let at = LoopRef::new(face, corner);
            mesh.set_loop_uv(layer, at, self.uvs[corner]);
            mesh.set_loop_pin(layer, at, self.pins[corner]);
            if copy_seams {
                if let Some(edge) = mesh.loop_at(at).map(|l| l.edge) {
                    mesh.set_edge_seam(edge, self.seams[corner]);
                }
            }
        }
        Ok(())
    }
}

/// Which faces take part in a copy or paste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceSource {
    /// Selected faces in face order
    #[default]
    Selected,
    /// Selected faces in the order they were selected
    SelectionHistory,
    /// Every face of the mesh
    All,
}

impl FaceSource {
    pub fn faces(self, mesh: &UvMesh) -> Vec<FaceId> {
        match self {
            FaceSource::Selected => mesh.selected_faces(),
            FaceSource::SelectionHistory => mesh.select_history().to_vec(),
            FaceSource::All => mesh.faces().iter().map(|f| f.id).collect(),
        }
    }
}

/// Which UV layers are read or written
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSelection {
    /// The active layer
    #[default]
    Active,
    /// A layer by name
    Named(String),
    /// Every layer; a paste matches copied layers by name
    All,
    /// A freshly added layer (paste only; a copy reads the active layer)
    New,
}

/// How copied faces are matched to destination faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteStrategy {
    /// Face counts must match; face i takes copied face i
    OneToOne,
    /// Face i takes copied face `i % copied`
    #[default]
    Cyclic,
}

/// Paste parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteOptions {
    pub strategy: PasteStrategy,
    /// Reverse each copied sequence before rotating
    pub flip: bool,
    /// Right-rotation steps applied to each copied sequence
    pub rotate: usize,
    /// Also write edge seam flags
    pub copy_seams: bool,
    pub faces: FaceSource,
    pub layers: LayerSelection,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            strategy: PasteStrategy::Cyclic,
            flip: false,
            rotate: 0,
            copy_seams: true,
            faces: FaceSource::Selected,
            layers: LayerSelection::Active,
        }
    }
}

/// Result of a successful paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteSummary {
    /// Number of destination faces written
    pub faces: usize,
    /// Names of the layers written
    pub layers: Vec<String>,
}

/// Copied faces of one UV layer
#[derive(Debug, Clone)]
struct CopiedLayer {
    name: String,
    faces: Vec<FaceUvSnapshot>,
}

/// Holds copied UV data between a copy and any number of pastes
#[derive(Debug, Clone, Default)]
pub struct UvClipboard {
    layers: Vec<CopiedLayer>,
}

/// Destination layer resolved before writing
enum Target {
    Existing(UvLayerId),
    New,
}

impl UvClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of faces copied per layer
    pub fn face_count(&self) -> usize {
        self.layers.first().map_or(0, |l| l.faces.len())
    }

    /// Names of the copied layers
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Copy faces from a mesh, replacing any previous contents
    ///
    /// Returns the number of faces copied per layer.
    pub fn copy(
        &mut self,
        mesh: &UvMesh,
        faces: FaceSource,
        layers: &LayerSelection,
    ) -> Result<usize, TransferError> {
        let layer_ids = match layers {
            LayerSelection::Active | LayerSelection::New => vec![mesh.require_active_uv_layer()?],
            LayerSelection::Named(name) => vec![
                mesh.uv_layer_by_name(name)
                    .ok_or_else(|| MeshError::UvLayerNotFound(name.clone()))?,
            ],
            LayerSelection::All => {
                if mesh.uv_layer_count() == 0 {
                    return Err(MeshError::NoUvLayer.into());
                }
                (0..mesh.uv_layer_count()).map(UvLayerId).collect()
            }
        };

        let face_ids = faces.faces(mesh);
        if face_ids.is_empty() {
            return Err(TransferError::NoFacesSelected);
        }

        let mut copied = Vec::with_capacity(layer_ids.len());
        for layer in layer_ids {
            let snapshots = face_ids
                .iter()
                .map(|&f| FaceUvSnapshot::capture(mesh, layer, f))
                .collect::<Result<Vec<_>, _>>()?;
            copied.push(CopiedLayer {
                name: mesh.uv_layer_name(layer).unwrap_or_default().to_string(),
                faces: snapshots,
            });
        }
        self.layers = copied;
        debug!(
            "UvClipboard::copy: {} face(s) from {} layer(s)",
            face_ids.len(),
            self.layers.len()
        );
        Ok(face_ids.len())
    }

    /// Paste onto a mesh
    ///
    /// Every destination face is checked against its matched copied face
    /// before anything is written; on error the mesh is unchanged.
    pub fn paste(
        &self,
        mesh: &mut UvMesh,
        options: &PasteOptions,
    ) -> Result<PasteSummary, TransferError> {
        let first = self.layers.first().ok_or(TransferError::NothingCopied)?;

        let plan: Vec<(Target, &CopiedLayer)> = match &options.layers {
            LayerSelection::Active => vec![(Target::Existing(mesh.require_active_uv_layer()?), first)],
            LayerSelection::Named(name) => {
                let id = mesh
                    .uv_layer_by_name(name)
                    .ok_or_else(|| MeshError::UvLayerNotFound(name.clone()))?;
                vec![(Target::Existing(id), first)]
            }
            LayerSelection::All => self
                .layers
                .iter()
                .map(|copied| {
                    mesh.uv_layer_by_name(&copied.name)
                        .map(|id| (Target::Existing(id), copied))
                        .ok_or_else(|| MeshError::UvLayerNotFound(copied.name.clone()))
                })
                .collect::<Result<_, _>>()?,
            LayerSelection::New => vec![(Target::New, first)],
        };

        let dest_faces = options.faces.faces(mesh);
        if dest_faces.is_empty() {
            return Err(TransferError::NoFacesSelected);
        }

        for (_, copied) in &plan {
            let src_count = copied.faces.len();
            if options.strategy == PasteStrategy::OneToOne && src_count != dest_faces.len() {
                return Err(TransferError::FaceCountMismatch {
                    src: src_count,
                    dest: dest_faces.len(),
                });
            }
            for (i, &face) in dest_faces.iter().enumerate() {
                let src = copied.faces[i % src_count].len();
                let dest = mesh.face(face).ok_or(MeshError::FaceNotFound(face))?.len();
                if src != dest {
                    return Err(TransferError::LoopCountMismatch { face, src, dest });
                }
            }
        }

        let mut written = Vec::with_capacity(plan.len());
        for (target, copied) in plan {
            let layer = match target {
                Target::Existing(id) => id,
                Target::New => {
                    let name = unique_layer_name(mesh, "UVMap");
                    mesh.add_uv_layer(&name)
                }
            };
            for (i, &face) in dest_faces.iter().enumerate() {
                let snapshot = copied.faces[i % copied.faces.len()]
                    .arranged(options.flip, options.rotate);
                snapshot.write_to(mesh, layer, face, options.copy_seams)?;
            }
            written.push(mesh.uv_layer_name(layer).unwrap_or_default().to_string());
        }

        debug!(
            "UvClipboard::paste: {} face(s) into {:?}",
            dest_faces.len(),
            written
        );
        Ok(PasteSummary {
            faces: dest_faces.len(),
            layers: written,
        })
    }
}

/// `base`, or `base.001`, `base.002`, ... whichever is free first
fn unique_layer_name(mesh: &UvMesh, base: &str) -> String {
    if mesh.uv_layer_by_name(base).is_none() {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}.{n:03}"))
        .find(|name| mesh.uv_layer_by_name(name).is_none())
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use glam::Vec3;

    fn snapshot(n: usize) -> FaceUvSnapshot {
        FaceUvSnapshot {
            uvs: (0..n).map(|i| Vec2::new(i as f32, 0.0)).collect(),
            pins: (0..n).map(|i| i == 0).collect(),
            seams: (0..n).map(|i| i % 2 == 1).collect(),
        }
    }

    /// Grid of quads plus one selected triangle
    fn mixed_mesh() -> (UvMesh, FaceId) {
        let mut mesh = primitives::grid(2, 1, 1.0);
        let a = mesh.add_vertex(Vec3::new(5.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(6.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vec3::new(5.0, 1.0, 0.0));
        let tri = mesh.add_face(&[a, b, c]).unwrap();
        (mesh, tri)
    }

    #[test]
    fn test_rotate_right_semantics() {
        let s = snapshot(4).rotated(1);
        assert_eq!(
            s.uvs,
            vec![
                Vec2::new(3.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0)
            ]
        );
        assert_eq!(s.pins, vec![false, true, false, false]);
    }

    #[test]
    fn test_rotate_and_flip_round_trip() {
        for n in 1..6 {
            let s = snapshot(n);
            assert_eq!(s.rotated(n), s);
            assert_eq!(s.rotated(3 * n), s);
            assert_eq!(s.flipped().flipped(), s);
        }
    }

    #[test]
    fn test_copy_paste_cyclic() {
        let mut mesh = primitives::grid(3, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        mesh.select_all(false);
        mesh.select_face(FaceId(0), true);

        let mut clipboard = UvClipboard::new();
        assert_eq!(
            clipboard
                .copy(&mesh, FaceSource::Selected, &LayerSelection::Active)
                .unwrap(),
            1
        );
        let source = FaceUvSnapshot::capture(&mesh, layer, FaceId(0)).unwrap();

        mesh.select_all(true);
        let summary = clipboard.paste(&mut mesh, &PasteOptions::default()).unwrap();
        assert_eq!(summary.faces, 3);
        for f in 0..3 {
            let got = FaceUvSnapshot::capture(&mesh, layer, FaceId(f)).unwrap();
            assert_eq!(got.uvs, source.uvs);
        }
    }

    #[test]
    fn test_paste_flip_rotate_and_seams() {
        let mut mesh = primitives::grid(2, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let edge = mesh.loop_at(LoopRef::new(FaceId(0), 0)).unwrap().edge;
        mesh.set_edge_seam(edge, true);
        mesh.set_loop_pin(layer, LoopRef::new(FaceId(0), 0), true);

        let original = FaceUvSnapshot::capture(&mesh, layer, FaceId(0)).unwrap();
        let mut clipboard = UvClipboard::new();
        mesh.select_all(false);
        mesh.select_face(FaceId(0), true);
        clipboard
            .copy(&mesh, FaceSource::Selected, &LayerSelection::Active)
            .unwrap();

        mesh.select_all(false);
        mesh.select_face(FaceId(1), true);
        let options = PasteOptions {
            flip: true,
            rotate: 1,
            ..PasteOptions::default()
        };
        clipboard.paste(&mut mesh, &options).unwrap();

        let pasted = FaceUvSnapshot::capture(&mesh, layer, FaceId(1)).unwrap();
        let expected = original.flipped().rotated(1);
        assert_eq!(pasted.uvs, expected.uvs);
        assert_eq!(pasted.pins, expected.pins);
        assert_eq!(pasted.seams, expected.seams);
    }

    #[test]
    fn test_loop_count_mismatch_writes_nothing() {
        for strategy in [PasteStrategy::OneToOne, PasteStrategy::Cyclic] {
            let (mut mesh, tri) = mixed_mesh();
            let layer = mesh.active_uv_layer().unwrap();
            mesh.select_all(false);
            mesh.select_face(FaceId(1), true);
            mesh.select_face(FaceId(0), true);

            let mut clipboard = UvClipboard::new();
            clipboard
                .copy(&mesh, FaceSource::Selected, &LayerSelection::Active)
                .unwrap();

            // Move the quads' UVs so a write would be visible
            for f in 0..2 {
                for c in 0..4 {
                    mesh.set_loop_uv(layer, LoopRef::new(FaceId(f), c), Vec2::splat(9.0));
                }
            }
            // Destination: quad, triangle (second pair mismatches)
            mesh.select_all(false);
            mesh.select_face(FaceId(0), true);
            mesh.select_face(tri, true);
            let before = mesh.to_description();

            let options = PasteOptions {
                strategy,
                ..PasteOptions::default()
            };
            let err = clipboard.paste(&mut mesh, &options).unwrap_err();
            assert!(matches!(
                err,
                TransferError::LoopCountMismatch { src: 4, dest: 3, .. }
            ));
            assert_eq!(mesh.to_description(), before, "{:?}", strategy);
        }
    }

    #[test]
    fn test_one_to_one_face_count_mismatch() {
        let mut mesh = primitives::grid(3, 1, 1.0);
        let mut clipboard = UvClipboard::new();
        clipboard
            .copy(&mesh, FaceSource::Selected, &LayerSelection::Active)
            .unwrap();
        mesh.select_face(FaceId(2), false);

        let options = PasteOptions {
            strategy: PasteStrategy::OneToOne,
            ..PasteOptions::default()
        };
        let err = clipboard.paste(&mut mesh, &options).unwrap_err();
        assert!(matches!(
            err,
            TransferError::FaceCountMismatch { src: 3, dest: 2 }
        ));
        assert_eq!(
            err.to_string(),
            "Number of faces is different from copied (src:3, dest:2)"
        );
    }

    #[test]
    fn test_paste_without_copy_or_selection() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let clipboard = UvClipboard::new();
        assert!(matches!(
            clipboard.paste(&mut mesh, &PasteOptions::default()),
            Err(TransferError::NothingCopied)
        ));

        let mut clipboard = UvClipboard::new();
        mesh.select_all(false);
        assert!(matches!(
            clipboard.copy(&mesh, FaceSource::Selected, &LayerSelection::Active),
            Err(TransferError::NoFacesSelected)
        ));
    }

    #[test]
    fn test_selection_history_order() {
        let mut mesh = primitives::grid(2, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let face1 = FaceUvSnapshot::capture(&mesh, layer, FaceId(1)).unwrap();

        mesh.select_all(false);
        mesh.select_face(FaceId(1), true);
        mesh.select_face(FaceId(0), true);
        let mut clipboard = UvClipboard::new();
        clipboard
            .copy(&mesh, FaceSource::SelectionHistory, &LayerSelection::Active)
            .unwrap();

        // History starts with face 1, so face 0 receives face 1's UVs
        mesh.select_all(false);
        mesh.select_face(FaceId(0), true);
        mesh.select_face(FaceId(1), true);
        let options = PasteOptions {
            strategy: PasteStrategy::OneToOne,
            faces: FaceSource::SelectionHistory,
            ..PasteOptions::default()
        };
        clipboard.paste(&mut mesh, &options).unwrap();
        assert_eq!(
            FaceUvSnapshot::capture(&mesh, layer, FaceId(0)).unwrap().uvs,
            face1.uvs
        );
    }

    #[test]
    fn test_paste_into_new_layer() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let active = mesh.active_uv_layer().unwrap();
        let mut clipboard = UvClipboard::new();
        clipboard
            .copy(&mesh, FaceSource::Selected, &LayerSelection::Active)
            .unwrap();
        let original = FaceUvSnapshot::capture(&mesh, active, FaceId(0)).unwrap();

        let options = PasteOptions {
            layers: LayerSelection::New,
            rotate: 2,
            ..PasteOptions::default()
        };
        let summary = clipboard.paste(&mut mesh, &options).unwrap();
        assert_eq!(summary.layers, vec!["UVMap.001".to_string()]);

        let new_layer = mesh.uv_layer_by_name("UVMap.001").unwrap();
        assert_eq!(
            FaceUvSnapshot::capture(&mesh, new_layer, FaceId(0)).unwrap().uvs,
            original.rotated(2).uvs
        );
        // Active layer untouched
        assert_eq!(
            FaceUvSnapshot::capture(&mesh, active, FaceId(0)).unwrap(),
            original
        );
    }

    #[test]
    fn test_copy_between_meshes_all_layers() {
        let src = primitives::grid(2, 2, 1.0);
        let mut dest = primitives::grid(2, 2, 1.0);
        let layer = dest.active_uv_layer().unwrap();
        for f in 0..4 {
            for c in 0..4 {
                dest.set_loop_uv(layer, LoopRef::new(FaceId(f), c), Vec2::ZERO);
            }
        }
        dest.select_all(false);

        let mut clipboard = UvClipboard::new();
        clipboard
            .copy(&src, FaceSource::All, &LayerSelection::All)
            .unwrap();
        let options = PasteOptions {
            strategy: PasteStrategy::OneToOne,
            faces: FaceSource::All,
            layers: LayerSelection::All,
            ..PasteOptions::default()
        };
        clipboard.paste(&mut dest, &options).unwrap();
        assert_eq!(
            dest.to_description().faces.iter().map(|f| f.uvs.clone()).collect::<Vec<_>>(),
            src.to_description().faces.iter().map(|f| f.uvs.clone()).collect::<Vec<_>>()
        );
    }
}

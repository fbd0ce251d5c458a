//! Small procedural meshes.

use glam::{Vec2, Vec3};

use crate::mesh::{FaceId, LoopRef, UvMesh, VertexId};

/// Planar grid of quads in the XY plane, from the origin to
/// `(cols * cell, rows * cell)`
///
/// Every face is selected and a `UVMap` layer holds the grid position
/// normalized to [0, 1].
pub fn grid(cols: u32, rows: u32, cell: f32) -> UvMesh {
    let mut mesh = UvMesh::new();
    let cols = cols.max(1);
    let rows = rows.max(1);

    for y in 0..=rows {
        for x in 0..=cols {
            mesh.add_vertex(Vec3::new(x as f32 * cell, y as f32 * cell, 0.0));
        }
    }

    let index = |x: u32, y: u32| VertexId(y * (cols + 1) + x);
    let mut faces: Vec<(FaceId, [(u32, u32); 4])> = Vec::new();
    for y in 0..rows {
        for x in 0..cols {
            let corners = [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)];
            let ids = corners.map(|(cx, cy)| index(cx, cy));
            // Corners are distinct and in range by construction
            if let Ok(face) = mesh.add_face(&ids) {
                faces.push((face, corners));
            }
        }
    }

    let layer = mesh.add_uv_layer("UVMap");
    let scale = Vec2::new(cols as f32, rows as f32);
    for (face, corners) in faces {
        for (corner, (cx, cy)) in corners.into_iter().enumerate() {
            let uv = Vec2::new(cx as f32, cy as f32) / scale;
            mesh.set_loop_uv(layer, LoopRef::new(face, corner), uv);
        }
        mesh.select_face(face, true);
    }
    mesh
}

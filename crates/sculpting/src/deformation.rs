//! UV deformation operators.
//!
//! Grab, Pinch and Relax each write new UVs for the loops in an influence
//! set. None of them touch topology or vertex positions. Relax computes every
//! target from an aggregate snapshot before writing anything, so loops never
//! read a neighbor that was already updated in the same tick.

use std::collections::HashMap;

use glam::Vec2;
use tracing::trace;
use uvmesh::{
    FaceBvh, LoopRef, UvLayerId, UvMesh, VertexId, VertexLoopIndex, ViewProjection,
    barycentric_transform,
};
use uvsculpt_config::RelaxMethod;

use crate::influence::InfluenceRecord;

/// Grab divides the cursor offset by this before applying it to UVs
const GRAB_SCALE: f32 = 100.0;

/// Pinch moves each UV this fraction of its weighted offset per tick
const PINCH_SCALE: f32 = 10.0;

/// Translate influenced UVs by the cursor offset, weighted per loop.
///
/// Always starts from the UV captured in the record, so repeated calls with
/// the same cursor give the same result.
pub fn apply_grab(
    mesh: &mut UvMesh,
    layer: UvLayerId,
    records: &[InfluenceRecord],
    cursor_initial: Vec2,
    cursor: Vec2,
) -> usize {
    let offset = cursor - cursor_initial;
    let mut written = 0;
    for record in records {
        let uv = record.initial_uv + offset * record.strength / GRAB_SCALE;
        if mesh.set_loop_uv(layer, record.loop_ref(), uv) {
            written += 1;
        }
    }
    written
}

/// UV under the cursor: the closest hit face's surface point mapped into UV
/// space through its first three loops.
///
/// Returns `None` when the ray misses the mesh or the face is degenerate.
pub fn pinch_target_uv(
    mesh: &UvMesh,
    layer: UvLayerId,
    bvh: &FaceBvh,
    view: &ViewProjection,
    cursor: Vec2,
) -> Option<Vec2> {
    let ray = view.region_to_object_ray(cursor)?;
    let hit = bvh.ray_cast(mesh, &ray)?;

    let corners = [0, 1, 2].map(|c| LoopRef::new(hit.face, c));
    let mut positions = [glam::Vec3::ZERO; 3];
    let mut uvs = [Vec2::ZERO; 3];
    for (i, &corner) in corners.iter().enumerate() {
        positions[i] = mesh.loop_position(corner)?;
        uvs[i] = mesh.loop_uv(layer, corner)?;
    }

    barycentric_transform(
        hit.position,
        positions[0],
        positions[1],
        positions[2],
        uvs[0],
        uvs[1],
        uvs[2],
    )
}

/// Pull influenced UVs toward `target` (or push them away when `invert`)
pub fn apply_pinch(
    mesh: &mut UvMesh,
    layer: UvLayerId,
    records: &[InfluenceRecord],
    target: Vec2,
    invert: bool,
) -> usize {
    let mut written = 0;
    for record in records {
        let at = record.loop_ref();
        let Some(uv) = mesh.loop_uv(layer, at) else {
            continue;
        };
        let delta = if invert {
            (uv - target) * record.strength
        } else {
            (target - uv) * record.strength
        };
        if mesh.set_loop_uv(layer, at, uv + delta / PINCH_SCALE) {
            written += 1;
        }
    }
    written
}

/// Per-vertex aggregates used by Relax
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexRelaxState {
    /// Mean UV of the next and previous loops around every incident face
    pub mean_uv: Vec2,
    /// `mean_uv` minus the UV of the vertex's first loop
    pub bias: Vec2,
    /// Sum of the neighbors' `bias` over the same next/previous relation
    pub bias_sum: Vec2,
    /// Number of neighbor samples (two per incident loop)
    pub neighbor_count: u32,
}

/// Relax aggregates for every vertex with loops
#[derive(Debug, Clone, Default)]
pub struct RelaxState {
    vertices: HashMap<VertexId, VertexRelaxState>,
}

impl RelaxState {
    /// Compute aggregates over the whole mesh from its current UVs
    pub fn compute(mesh: &UvMesh, layer: UvLayerId, index: &VertexLoopIndex) -> Self {
        let mut vertices: HashMap<VertexId, VertexRelaxState> = HashMap::with_capacity(index.len());

        // Pass 1: neighbor mean and bias
        for (vertex, loops) in index.iter() {
            let Some(&first) = loops.first() else {
                continue;
            };
            let Some(first_uv) = mesh.loop_uv(layer, first) else {
                continue;
            };
            let mut sum = Vec2::ZERO;
            let mut count = 0u32;
            for &l in loops {
                for neighbor in [mesh.next_loop(l), mesh.prev_loop(l)].into_iter().flatten() {
                    if let Some(uv) = mesh.loop_uv(layer, neighbor) {
                        sum += uv;
                        count += 1;
                    }
                }
            }
            if count == 0 {
                continue;
            }
            let mean_uv = sum / count as f32;
            vertices.insert(
                vertex,
                VertexRelaxState {
                    mean_uv,
                    bias: mean_uv - first_uv,
                    bias_sum: Vec2::ZERO,
                    neighbor_count: count,
                },
            );
        }

        // Pass 2: sum of neighbor biases, read entirely from pass 1
        let mut bias_sums = Vec::with_capacity(vertices.len());
        for (vertex, loops) in index.iter() {
            if !vertices.contains_key(&vertex) {
                continue;
            }
            let mut bias_sum = Vec2::ZERO;
            for &l in loops {
                for neighbor in [mesh.next_loop(l), mesh.prev_loop(l)].into_iter().flatten() {
                    let neighbor_vertex = mesh.loop_at(neighbor).map(|n| n.vertex);
                    if let Some(state) = neighbor_vertex.and_then(|v| vertices.get(&v)) {
                        bias_sum += state.bias;
                    }
                }
            }
            bias_sums.push((vertex, bias_sum));
        }
        for (vertex, bias_sum) in bias_sums {
            if let Some(state) = vertices.get_mut(&vertex) {
                state.bias_sum = bias_sum;
            }
        }

        trace!("RelaxState: {} vertices", vertices.len());
        Self { vertices }
    }

    pub fn get(&self, vertex: VertexId) -> Option<&VertexRelaxState> {
        self.vertices.get(&vertex)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Relaxed UV for one loop, or `None` for an unsupported method
pub fn relax_target(
    state: &VertexRelaxState,
    uv: Vec2,
    strength: f32,
    method: RelaxMethod,
) -> Option<Vec2> {
    let base = (1.0 - strength) * uv;
    match method {
        RelaxMethod::Hc => {
            let t = 0.5 * (state.bias + state.bias_sum / state.neighbor_count as f32);
            Some(base + strength * (state.mean_uv - t))
        }
        RelaxMethod::Laplacian => Some(base + strength * state.mean_uv),
        RelaxMethod::Unsupported => None,
    }
}

/// Counts from one Relax application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelaxOutcome {
    pub written: usize,
    /// Loops left untouched because the method is unsupported
    pub unsupported: usize,
}

/// Move influenced UVs toward their relaxed targets
pub fn apply_relax(
    mesh: &mut UvMesh,
    layer: UvLayerId,
    records: &[InfluenceRecord],
    state: &RelaxState,
    method: RelaxMethod,
) -> RelaxOutcome {
    let mut outcome = RelaxOutcome::default();
    let mut targets: Vec<(LoopRef, Vec2)> = Vec::with_capacity(records.len());

    for record in records {
        let at = record.loop_ref();
        let Some(vertex) = mesh.loop_at(at).map(|l| l.vertex) else {
            continue;
        };
        let (Some(vertex_state), Some(uv)) = (state.get(vertex), mesh.loop_uv(layer, at)) else {
            continue;
        };
        match relax_target(vertex_state, uv, record.strength, method) {
            Some(target) => targets.push((at, target)),
            None => outcome.unsupported += 1,
        }
    }

    for (at, target) in targets {
        if mesh.set_loop_uv(layer, at, target) {
            outcome.written += 1;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use uvmesh::{FaceId, primitives};

    fn record(face: u32, corner: usize, uv: Vec2, strength: f32) -> InfluenceRecord {
        InfluenceRecord {
            face: FaceId(face),
            corner,
            initial_position: Vec3::ZERO,
            initial_region: Vec2::ZERO,
            initial_uv: uv,
            strength,
        }
    }

    /// Records with the given strength for every loop of interior grid vertices
    fn interior_records(
        mesh: &UvMesh,
        index: &VertexLoopIndex,
        cols: u32,
        strength: f32,
    ) -> Vec<InfluenceRecord> {
        let layer = mesh.active_uv_layer().unwrap();
        let mut records = Vec::new();
        for (vertex, loops) in index.iter() {
            let x = vertex.0 % (cols + 1);
            let y = vertex.0 / (cols + 1);
            if x == 0 || y == 0 || x == cols || y == cols {
                continue;
            }
            for l in loops {
                let uv = mesh.loop_uv(layer, *l).unwrap();
                records.push(record(l.face.0, l.corner, uv, strength));
            }
        }
        records
    }

    fn set_vertex_uv(mesh: &mut UvMesh, index: &VertexLoopIndex, vertex: VertexId, uv: Vec2) {
        let layer = mesh.active_uv_layer().unwrap();
        for &l in index.loops(vertex) {
            mesh.set_loop_uv(layer, l, uv);
        }
    }

    #[test]
    fn test_grab_translates_from_initial() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let records = vec![record(0, 0, Vec2::new(0.2, 0.3), 0.5)];

        apply_grab(&mut mesh, layer, &records, Vec2::ZERO, Vec2::new(10.0, 0.0));
        let uv = mesh.loop_uv(layer, LoopRef::new(FaceId(0), 0)).unwrap();
        assert!((uv - Vec2::new(0.25, 0.3)).length() < 1e-6);

        // Not cumulative
        apply_grab(&mut mesh, layer, &records, Vec2::ZERO, Vec2::new(10.0, 0.0));
        let again = mesh.loop_uv(layer, LoopRef::new(FaceId(0), 0)).unwrap();
        assert_eq!(uv, again);
    }

    #[test]
    fn test_grab_zero_offset_is_exact() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let initial = Vec2::new(0.123_456_7, 0.765_432_1);
        let records = vec![record(0, 1, initial, 0.37)];
        let cursor = Vec2::new(41.3, 17.9);
        apply_grab(&mut mesh, layer, &records, cursor, cursor);
        assert_eq!(mesh.loop_uv(layer, LoopRef::new(FaceId(0), 1)), Some(initial));
    }

    #[test]
    fn test_grab_is_linear() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let at = LoopRef::new(FaceId(0), 2);
        let initial = Vec2::new(0.5, 0.5);
        let offset = Vec2::new(6.0, -4.0);

        let delta_for = |mesh: &mut UvMesh, strength: f32, scale: f32| {
            let records = vec![record(0, 2, initial, strength)];
            apply_grab(mesh, layer, &records, Vec2::ZERO, offset * scale);
            mesh.loop_uv(layer, at).unwrap() - initial
        };

        let base = delta_for(&mut mesh, 0.4, 1.0);
        let double_strength = delta_for(&mut mesh, 0.8, 1.0);
        let double_offset = delta_for(&mut mesh, 0.4, 2.0);
        assert!((double_strength - base * 2.0).length() < 1e-6);
        assert!((double_offset - base * 2.0).length() < 1e-6);
    }

    #[test]
    fn test_pinch_pulls_and_pushes() {
        let mut mesh = primitives::grid(1, 1, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let at = LoopRef::new(FaceId(0), 0);
        let records = vec![record(0, 0, Vec2::ZERO, 1.0)];
        let target = Vec2::new(0.5, 0.5);

        apply_pinch(&mut mesh, layer, &records, target, false);
        let pulled = mesh.loop_uv(layer, at).unwrap();
        assert!((pulled - Vec2::new(0.05, 0.05)).length() < 1e-6);

        apply_pinch(&mut mesh, layer, &records, target, true);
        let pushed = mesh.loop_uv(layer, at).unwrap();
        // 0.05 + (0.05 - 0.5) / 10
        assert!((pushed - Vec2::new(0.005, 0.005)).length() < 1e-6);
    }

    #[test]
    fn test_pinch_target_uv() {
        let mesh = primitives::grid(2, 2, 10.0);
        let layer = mesh.active_uv_layer().unwrap();
        let bvh = FaceBvh::build(&mesh);
        let view = ViewProjection::orthographic_region(100.0, 100.0);

        let uv = pinch_target_uv(&mesh, layer, &bvh, &view, Vec2::new(5.0, 15.0)).unwrap();
        assert!((uv - Vec2::new(0.25, 0.75)).length() < 1e-4);

        assert!(pinch_target_uv(&mesh, layer, &bvh, &view, Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_relax_state_on_regular_grid() {
        let mesh = primitives::grid(2, 2, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let index = VertexLoopIndex::build(&mesh);
        let state = RelaxState::compute(&mesh, layer, &index);

        // Center vertex: 4 loops, 8 samples, mean equals its own UV
        let center = state.get(VertexId(4)).unwrap();
        assert_eq!(center.neighbor_count, 8);
        assert!((center.mean_uv - Vec2::new(0.5, 0.5)).length() < 1e-6);
        assert!(center.bias.length() < 1e-6);

        // Corner vertex: 1 loop, 2 samples
        let corner = state.get(VertexId(0)).unwrap();
        assert_eq!(corner.neighbor_count, 2);
        assert!((corner.mean_uv - Vec2::new(0.25, 0.25)).length() < 1e-6);
        assert_eq!(state.len(), 9);
    }

    #[test]
    fn test_relax_bias_sum_on_perturbed_grid() {
        let mut mesh = primitives::grid(2, 2, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let index = VertexLoopIndex::build(&mesh);
        set_vertex_uv(&mut mesh, &index, VertexId(4), Vec2::new(0.7, 0.5));
        let state = RelaxState::compute(&mesh, layer, &index);

        // Edge vertices see the moved center twice
        let bias = |v: u32| state.get(VertexId(v)).unwrap().bias;
        assert!((bias(1) - Vec2::new(0.1, 0.25)).length() < 1e-6);
        assert!((bias(3) - Vec2::new(0.35, 0.0)).length() < 1e-6);
        assert!((bias(5) - Vec2::new(-0.15, 0.0)).length() < 1e-6);
        assert!((bias(7) - Vec2::new(0.1, -0.25)).length() < 1e-6);

        let center = state.get(VertexId(4)).unwrap();
        assert!((center.bias - Vec2::new(-0.2, 0.0)).length() < 1e-6);
        // 2 * (b1 + b3 + b5 + b7)
        assert!((center.bias_sum - Vec2::new(0.8, 0.0)).length() < 1e-5);

        // Edge vertex 1: center twice plus corners 0 and 2
        let edge = state.get(VertexId(1)).unwrap();
        assert!((edge.bias_sum - Vec2::new(-0.4, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_relax_zero_strength_is_identity() {
        for method in [RelaxMethod::Hc, RelaxMethod::Laplacian] {
            let mut mesh = primitives::grid(4, 4, 1.0);
            let layer = mesh.active_uv_layer().unwrap();
            let index = VertexLoopIndex::build(&mesh);
            set_vertex_uv(&mut mesh, &index, VertexId(6), Vec2::new(0.9, 0.1));
            let before = mesh.to_description();

            let state = RelaxState::compute(&mesh, layer, &index);
            let records = interior_records(&mesh, &index, 4, 0.0);
            let outcome = apply_relax(&mut mesh, layer, &records, &state, method);
            assert_eq!(outcome.written, records.len());
            assert_eq!(mesh.to_description(), before);
        }
    }

    #[test]
    fn test_laplacian_converges_to_mean_value_field() {
        let cols = 4;
        let mut mesh = primitives::grid(cols, cols, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let index = VertexLoopIndex::build(&mesh);

        // Scramble the interior; the boundary keeps the linear field
        for (i, v) in [6u32, 7, 8, 11, 12, 13, 16, 17, 18].into_iter().enumerate() {
            let uv = Vec2::new((i as f32 * 0.37).fract(), (i as f32 * 0.61).fract());
            set_vertex_uv(&mut mesh, &index, VertexId(v), uv);
        }

        for _ in 0..80 {
            let state = RelaxState::compute(&mesh, layer, &index);
            let records = interior_records(&mesh, &index, cols, 1.0);
            apply_relax(&mut mesh, layer, &records, &state, RelaxMethod::Laplacian);
        }

        for (vertex, loops) in index.iter() {
            let expected = Vec2::new(
                (vertex.0 % (cols + 1)) as f32,
                (vertex.0 / (cols + 1)) as f32,
            ) / cols as f32;
            for &l in loops {
                let uv = mesh.loop_uv(layer, l).unwrap();
                assert!((uv - expected).length() < 1e-4, "{:?}: {:?}", vertex, uv);
            }
        }
    }

    #[test]
    fn test_hc_uses_own_neighbor_count() {
        let state = VertexRelaxState {
            mean_uv: Vec2::new(0.5, 0.5),
            bias: Vec2::new(0.1, 0.0),
            bias_sum: Vec2::new(0.4, 0.0),
            neighbor_count: 4,
        };
        let uv = Vec2::new(0.4, 0.5);
        let got = relax_target(&state, uv, 1.0, RelaxMethod::Hc).unwrap();
        // t = 0.5 * (0.1 + 0.4 / 4) = 0.1
        assert!((got - Vec2::new(0.4, 0.5)).length() < 1e-6);
        assert!(relax_target(&state, uv, 1.0, RelaxMethod::Unsupported).is_none());
    }

    #[test]
    fn test_relax_unsupported_is_noop() {
        let mut mesh = primitives::grid(2, 2, 1.0);
        let layer = mesh.active_uv_layer().unwrap();
        let index = VertexLoopIndex::build(&mesh);
        set_vertex_uv(&mut mesh, &index, VertexId(4), Vec2::new(0.9, 0.9));
        let before = mesh.to_description();

        let state = RelaxState::compute(&mesh, layer, &index);
        let records = interior_records(&mesh, &index, 2, 1.0);
        let outcome = apply_relax(&mut mesh, layer, &records, &state, RelaxMethod::Unsupported);
        assert_eq!(outcome.written, 0);
        assert_eq!(outcome.unsupported, 4);
        assert_eq!(mesh.to_description(), before);
    }
}

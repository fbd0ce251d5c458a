//! Bounding volume hierarchy over mesh faces.
//!
//! Answers closest-hit ray casts in object space. The tree is built from face
//! bounds by median splits along the longest centroid axis and remembers the
//! mesh geometry generation it was built for, so callers can cache it between
//! stroke samples and rebuild only after vertices move or faces are added.

use glam::Vec3;
use tracing::debug;

use crate::mesh::{FaceId, UvMesh};
use crate::projection::Ray;
use crate::raycast::{MeshHit, ray_face_intersection};

/// Maximum faces stored in a leaf before it is split
const MAX_FACES_PER_LEAF: usize = 4;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn include_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Entry distance of a ray into the box (slab test)
    ///
    /// Returns `None` when the ray misses or the box lies behind the origin.
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        let mut near = 0.0f32;
        let mut far = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (min, max) = (self.min[axis], self.max[axis]);
            // Parallel to this slab: inside or never
            if direction == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }
            let inv = direction.recip();
            let t0 = (min - origin) * inv;
            let t1 = (max - origin) * inv;
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
        }
        (far >= near).then_some(near)
    }
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bounds: Aabb,
        faces: Vec<FaceId>,
    },
    Internal {
        bounds: Aabb,
        left: usize,
        right: usize,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// Face bounding volume hierarchy for one mesh
#[derive(Debug)]
pub struct FaceBvh {
    nodes: Vec<BvhNode>,
    root: Option<usize>,
    generation: u64,
}

/// Face bounds and centroid used while building
struct FaceEntry {
    face: FaceId,
    bounds: Aabb,
    centroid: Vec3,
}

impl FaceBvh {
    /// Build over every face of the mesh
    pub fn build(mesh: &UvMesh) -> Self {
        let mut entries: Vec<FaceEntry> = mesh
            .faces()
            .iter()
            .filter_map(|face| {
                let mut bounds = Aabb::empty();
                for l in &face.loops {
                    bounds.include_point(mesh.vertex(l.vertex)?.position);
                }
                Some(FaceEntry {
                    face: face.id,
                    bounds,
                    centroid: bounds.center(),
                })
            })
            .collect();

        let mut bvh = Self {
            nodes: Vec::new(),
            root: None,
            generation: mesh.geometry_generation(),
        };
        if !entries.is_empty() {
            bvh.root = Some(bvh.build_node(&mut entries));
        }
        debug!(
            "FaceBvh: {} faces in {} nodes",
            mesh.face_count(),
            bvh.nodes.len()
        );
        bvh
    }

    fn build_node(&mut self, entries: &mut [FaceEntry]) -> usize {
        let mut bounds = Aabb::empty();
        let mut centroids = Aabb::empty();
        for e in entries.iter() {
            bounds.include_aabb(&e.bounds);
            centroids.include_point(e.centroid);
        }

        let extent = centroids.size();
        if entries.len() <= MAX_FACES_PER_LEAF || extent.max_element() <= 0.0 {
            self.nodes.push(BvhNode::Leaf {
                bounds,
                faces: entries.iter().map(|e| e.face).collect(),
            });
            return self.nodes.len() - 1;
        }

        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };
        entries.sort_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
        let mid = entries.len() / 2;
        let (lo, hi) = entries.split_at_mut(mid);
        let left = self.build_node(lo);
        let right = self.build_node(hi);
        self.nodes.push(BvhNode::Internal {
            bounds,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    /// Geometry generation of the mesh this tree was built from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the tree still matches the mesh geometry
    pub fn is_current(&self, mesh: &UvMesh) -> bool {
        self.generation == mesh.geometry_generation()
    }

    /// Closest face hit by an object-space ray
    pub fn ray_cast(&self, mesh: &UvMesh, ray: &Ray) -> Option<MeshHit> {
        let root = self.root?;
        let mut best: Option<(f32, FaceId)> = None;
        let mut stack = vec![root];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let Some(entry) = node.bounds().ray_entry(ray) else {
                continue;
            };
            // Slack keeps nodes that may still tie with the best hit
            if best.is_some_and(|(t, _)| entry > t + 1e-4 * t.max(1.0)) {
                continue;
            }
            match node {
                BvhNode::Leaf { faces, .. } => {
                    for &face in faces {
                        let Some(t) = ray_face_intersection(mesh, face, ray) else {
                            continue;
                        };
                        // Ties go to the lower face id, matching a linear scan
                        let better = match best {
                            Some((bt, bf)) => t < bt || (t == bt && face.0 < bf.0),
                            None => true,
                        };
                        if better {
                            best = Some((t, face));
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        best.map(|(t, face)| MeshHit {
            position: ray.at(t),
            face,
            distance: t,
        })
    }
}

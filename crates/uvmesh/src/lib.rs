//! Mesh data for UV editing
//!
//! This crate provides the mesh-side building blocks of the UV sculpt tool:
//! - [`mesh::UvMesh`] - faces, ordered loops, shared vertices and edges, UV layers
//! - [`projection::ViewProjection`] - object/world to region projection and ray unprojection
//! - [`raycast`] - ray-triangle intersection and barycentric transforms
//! - [`bvh::FaceBvh`] - bounding volume hierarchy for closest-hit ray casts
//! - [`transfer`] - copy/paste of per-face UV, pin and seam data
//! - [`primitives`] - small procedural meshes

pub mod bvh;
pub mod error;
pub mod mesh;
pub mod primitives;
pub mod projection;
pub mod raycast;
pub mod transfer;

pub use bvh::*;
pub use error::*;
pub use mesh::*;
pub use projection::*;
pub use raycast::*;
pub use transfer::*;

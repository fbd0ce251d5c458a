//! Error types for mesh and UV transfer operations.

use crate::mesh::FaceId;

/// Errors that can occur while building or editing a [`crate::UvMesh`]
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh has no UV layer")]
    NoUvLayer,
    #[error("UV layer not found: {0}")]
    UvLayerNotFound(String),
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
    #[error("Face {0:?} does not exist")]
    FaceNotFound(FaceId),
}

/// Errors that can occur while copying or pasting UVs
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("No faces are selected")]
    NoFacesSelected,
    #[error("Need to copy UVs first")]
    NothingCopied,
    #[error("Number of faces is different from copied (src:{src}, dest:{dest})")]
    FaceCountMismatch { src: usize, dest: usize },
    #[error("Face {face:?} has {dest} loops but the copied face has {src}")]
    LoopCountMismatch { face: FaceId, src: usize, dest: usize },
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

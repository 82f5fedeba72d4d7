//! Mesh simplification by progressive vertex collapse
//!
//! This crate computes a greedy, cost-ordered vertex collapse sequence for a
//! triangle mesh and replays part of it to produce level-of-detail meshes:
//! - [`ProgressiveMesh`] builds the ordering
//! - [`CollapseOperations`] stores it and materializes LODs from it
//! - [`ProgressiveMeshSimplifier`] wraps both behind [`MeshSimplifier`]

pub mod lod;
pub mod progressive;
pub mod simplifier;

pub use lod::*;
pub use progressive::*;
pub use simplifier::*;

use meshlod_core::{IndexedMesh, Result};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction ratio (0.0 = no reduction, 1.0 = maximum reduction)
    fn simplify(&self, mesh: &IndexedMesh, reduction_ratio: f32) -> Result<IndexedMesh>;
}

//! Ratio-driven simplification on top of the progressive mesh

use crate::lod::LodTarget;
use crate::progressive::ProgressiveMesh;
use crate::MeshSimplifier;
use meshlod_core::{Error, IndexedMesh, Result};
use std::borrow::Cow;

/// Simplifier that replays a progressive-mesh collapse ordering.
///
/// Polygons with more than three corners are fan-triangulated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressiveMeshSimplifier {
    /// Copy normals, uvs, colors and other vertex attributes into the result
    pub copy_attributes: bool,
}

impl Default for ProgressiveMeshSimplifier {
    fn default() -> Self {
        Self {
            copy_attributes: true,
        }
    }
}

impl ProgressiveMeshSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(copy_attributes: bool) -> Self {
        Self { copy_attributes }
    }
}

impl MeshSimplifier for ProgressiveMeshSimplifier {
    fn simplify(&self, mesh: &IndexedMesh, reduction_ratio: f32) -> Result<IndexedMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reduction_ratio) {
            return Err(Error::InvalidData(
                "Reduction ratio must be between 0.0 and 1.0".to_string(),
            ));
        }
        if reduction_ratio == 0.0 {
            return Ok(mesh.clone());
        }

        let triangles = if mesh.is_triangulated() {
            Cow::Borrowed(mesh)
        } else {
            Cow::Owned(mesh.triangulated())
        };
        let pm = ProgressiveMesh::from_mesh(&triangles)?;
        let target_faces = ((1.0 - reduction_ratio) * pm.face_count() as f32) as usize;
        let source = self.copy_attributes.then_some(triangles.as_ref());
        Ok(pm.generate_lod_mesh(LodTarget::Faces(target_faces), source))
    }
}

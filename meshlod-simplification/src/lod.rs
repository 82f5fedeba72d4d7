//! Level-of-detail generation from a collapse ordering

use crate::progressive::ProgressiveMesh;
use itertools::Itertools;
use meshlod_core::{IndexedMesh, Point3f, VertexAttributes};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Face budget of a generated LOD
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LodTarget {
    /// Keep at most this many faces
    Faces(usize),
    /// Keep this percentage of the original faces, clamped to `[0, 100]`
    Percent(f32),
}

impl LodTarget {
    /// Number of faces allowed for a mesh with `face_count` faces
    pub fn face_budget(&self, face_count: usize) -> usize {
        match *self {
            LodTarget::Faces(faces) => faces,
            LodTarget::Percent(percent) => {
                let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
                (face_count as f64 * f64::from(percent) / 100.0).round() as usize
            }
        }
    }
}

impl From<usize> for LodTarget {
    fn from(faces: usize) -> Self {
        LodTarget::Faces(faces)
    }
}

/// Result of the greedy collapse pass.
///
/// `permutation[v]` is the position at which original vertex `v` was removed,
/// counting down from the vertex count, so keeping the first `n` positions
/// keeps the `n` vertices removed last. `map[i]` is the position of the vertex
/// that position `i` collapsed onto; it is always lower than `i` except at
/// position 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseOperations {
    pub permutation: Vec<u32>,
    pub map: Vec<u32>,
}

impl CollapseOperations {
    pub fn vertex_count(&self) -> usize {
        self.permutation.len()
    }

    /// Position of original vertex `index` in a LOD keeping
    /// `target_vertex_count` vertices, following collapses as needed.
    ///
    /// Returns `None` for an out-of-range index, an empty LOD, or a map that
    /// does not lead below the budget.
    pub fn resolve(&self, index: usize, target_vertex_count: usize) -> Option<usize> {
        let mut current = *self.permutation.get(index)? as usize;
        let mut steps = 0;
        while current >= target_vertex_count {
            current = *self.map.get(current)? as usize;
            steps += 1;
            if steps > self.map.len() {
                return None;
            }
        }
        Some(current)
    }

    /// Resolved corners of a triangle, or `None` once it has degenerated
    fn resolve_face(&self, corners: [u32; 3], target_vertex_count: usize) -> Option<[usize; 3]> {
        let mut resolved = [0usize; 3];
        for (slot, &corner) in resolved.iter_mut().zip(&corners) {
            *slot = self.resolve(corner as usize, target_vertex_count)?;
        }
        resolved.iter().all_unique().then_some(resolved)
    }

    /// Number of faces of `mesh` that stay non-degenerate when only
    /// `target_vertex_count` vertices are kept
    pub fn surviving_face_count(&self, mesh: &ProgressiveMesh, target_vertex_count: usize) -> usize {
        mesh.faces()
            .iter()
            .filter(|face| self.resolve_face(face.vertices, target_vertex_count).is_some())
            .count()
    }

    /// Largest vertex count, at most `3 * target_faces`, whose LOD has no
    /// more than `target_faces` faces.
    ///
    /// The surviving face count never grows as vertices are removed, so the
    /// search is a bisection.
    pub fn lod_vertex_count(&self, mesh: &ProgressiveMesh, target_faces: usize) -> usize {
        let mut low = 0;
        let mut high = self.vertex_count().min(target_faces.saturating_mul(3));
        while low < high {
            let mid = (low + high + 1) / 2;
            if self.surviving_face_count(mesh, mid) <= target_faces {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    /// Replay the ordering on `mesh` down to the face budget of `target`.
    ///
    /// Vertices keep their collapse position as index. Faces are emitted in
    /// their original order with degenerate ones dropped. When `source` is
    /// given, its attributes are copied by original vertex index.
    pub fn generate_lod_mesh(
        &self,
        mesh: &ProgressiveMesh,
        target: LodTarget,
        source: Option<&IndexedMesh>,
    ) -> IndexedMesh {
        let target_faces = target.face_budget(mesh.face_count());
        let vertex_count = self.lod_vertex_count(mesh, target_faces);

        let mut vertices = vec![Point3f::origin(); vertex_count];
        let mut attributes = source
            .map(|s| s.attributes.empty_like(vertex_count))
            .unwrap_or_else(VertexAttributes::default);
        for (original, &slot) in self.permutation.iter().enumerate() {
            let slot = slot as usize;
            if slot >= vertex_count {
                continue;
            }
            if let Some(vertex) = mesh.vertex(original) {
                vertices[slot] = vertex.position;
            }
            if let Some(source) = source {
                attributes.copy_vertex(slot, &source.attributes, original);
            }
        }

        let mut polygons = Vec::with_capacity(target_faces.min(mesh.face_count()));
        for face in mesh.faces() {
            if polygons.len() >= target_faces {
                break;
            }
            if let Some(corners) = self.resolve_face(face.vertices, vertex_count) {
                polygons.push(corners.to_vec());
            }
        }

        log::debug!(
            "generated LOD with {} vertices and {} faces (budget {})",
            vertex_count,
            polygons.len(),
            target_faces
        );
        IndexedMesh {
            vertices,
            polygons,
            attributes,
        }
    }

    /// Generate one LOD per target in parallel, in the order of `targets`
    pub fn generate_lod_chain(
        &self,
        mesh: &ProgressiveMesh,
        targets: &[LodTarget],
        source: Option<&IndexedMesh>,
    ) -> Vec<IndexedMesh> {
        targets
            .par_iter()
            .map(|&target| self.generate_lod_mesh(mesh, target, source))
            .collect()
    }
}

//! Indexed mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Optional per-vertex attributes carried alongside positions.
///
/// Every present attribute array is indexed like `IndexedMesh::vertices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexAttributes {
    pub normals: Option<Vec<Vector3f>>,
    pub tangents: Option<Vec<Vector3f>>,
    pub bitangents: Option<Vec<Vector3f>>,
    pub uv_sets: Vec<Vec<Uv>>,
    pub color_sets: Vec<Vec<Color>>,
    pub bone_weights: Option<Vec<Vec<BoneWeight>>>,
}

impl VertexAttributes {
    /// Check whether no attribute is present
    pub fn is_empty(&self) -> bool {
        self.normals.is_none()
            && self.tangents.is_none()
            && self.bitangents.is_none()
            && self.uv_sets.is_empty()
            && self.color_sets.is_empty()
            && self.bone_weights.is_none()
    }

    /// Create attribute arrays with the same layout as `self`, sized for
    /// `vertex_count` vertices and filled with neutral values.
    pub fn empty_like(&self, vertex_count: usize) -> Self {
        Self {
            normals: self.normals.as_ref().map(|_| vec![Vector3f::zeros(); vertex_count]),
            tangents: self.tangents.as_ref().map(|_| vec![Vector3f::zeros(); vertex_count]),
            bitangents: self
                .bitangents
                .as_ref()
                .map(|_| vec![Vector3f::zeros(); vertex_count]),
            uv_sets: self.uv_sets.iter().map(|_| vec![[0.0; 2]; vertex_count]).collect(),
            color_sets: self
                .color_sets
                .iter()
                .map(|_| vec![[0.0; 4]; vertex_count])
                .collect(),
            bone_weights: self.bone_weights.as_ref().map(|_| vec![Vec::new(); vertex_count]),
        }
    }

    /// Copy every attribute of `src[src_index]` into slot `dst_index`.
    ///
    /// Both attribute sets must share the same layout (see [`Self::empty_like`]).
    /// Arrays of `src` that are too short for `src_index` are skipped.
    pub fn copy_vertex(&mut self, dst_index: usize, src: &VertexAttributes, src_index: usize) {
        fn copy<T: Clone>(dst: &mut [T], src: &[T], dst_index: usize, src_index: usize) {
            if let (Some(d), Some(s)) = (dst.get_mut(dst_index), src.get(src_index)) {
                *d = s.clone();
            }
        }

        if let (Some(d), Some(s)) = (self.normals.as_mut(), src.normals.as_ref()) {
            copy(d, s, dst_index, src_index);
        }
        if let (Some(d), Some(s)) = (self.tangents.as_mut(), src.tangents.as_ref()) {
            copy(d, s, dst_index, src_index);
        }
        if let (Some(d), Some(s)) = (self.bitangents.as_mut(), src.bitangents.as_ref()) {
            copy(d, s, dst_index, src_index);
        }
        for (d, s) in self.uv_sets.iter_mut().zip(&src.uv_sets) {
            copy(d, s, dst_index, src_index);
        }
        for (d, s) in self.color_sets.iter_mut().zip(&src.color_sets) {
            copy(d, s, dst_index, src_index);
        }
        if let (Some(d), Some(s)) = (self.bone_weights.as_mut(), src.bone_weights.as_ref()) {
            copy(d, s, dst_index, src_index);
        }
    }
}

/// A polygon mesh with shared vertices and index lists.
///
/// This is the interchange shape consumed and produced by the topology and
/// simplification crates. Polygons with three indices are triangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub vertices: Vec<Point3f>,
    pub polygons: Vec<Vec<usize>>,
    pub attributes: VertexAttributes,
}

impl IndexedMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and polygons
    pub fn from_vertices_and_polygons(vertices: Vec<Point3f>, polygons: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            polygons,
            attributes: VertexAttributes::default(),
        }
    }

    /// Create a mesh from vertices and triangles
    pub fn from_triangles(vertices: Vec<Point3f>, triangles: &[[usize; 3]]) -> Self {
        let polygons = triangles.iter().map(|t| t.to_vec()).collect();
        Self::from_vertices_and_polygons(vertices, polygons)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of polygons
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Number of triangles produced by fan-triangulating every polygon
    pub fn triangle_count(&self) -> usize {
        self.polygons.iter().map(|p| p.len().saturating_sub(2)).sum()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.polygons.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a polygon to the mesh
    pub fn add_polygon(&mut self, polygon: Vec<usize>) {
        self.polygons.push(polygon);
    }

    /// Whether every polygon is a triangle
    pub fn is_triangulated(&self) -> bool {
        self.polygons.iter().all(|p| p.len() == 3)
    }

    /// Fan-triangulate every polygon from its first corner
    pub fn triangulated(&self) -> IndexedMesh {
        let polygons = self
            .polygons
            .iter()
            .flat_map(|p| (1..p.len().saturating_sub(1)).map(move |i| vec![p[0], p[i], p[i + 1]]))
            .collect();
        IndexedMesh {
            vertices: self.vertices.clone(),
            polygons,
            attributes: self.attributes.clone(),
        }
    }

    /// Check index ranges and repeated corners of every polygon
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (polygon, corners) in self.polygons.iter().enumerate() {
            if corners.len() < 3 {
                return Err(Error::InvalidData(format!(
                    "Polygon {} has only {} corners",
                    polygon,
                    corners.len()
                )));
            }
            if let Some(&index) = corners.iter().find(|&&i| i >= vertex_count) {
                return Err(Error::InvalidIndex {
                    polygon,
                    index,
                    vertex_count,
                });
            }
            if !corners.iter().all_unique() {
                return Err(Error::DegenerateFace { polygon });
            }
        }
        Ok(())
    }

    /// Calculate normalized face normals from the first three corners of each
    /// polygon. Degenerate polygons get a zero normal.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.polygons
            .iter()
            .map(|p| {
                if p.len() < 3 {
                    return Vector3f::zeros();
                }
                let v0 = self.vertices[p[0]];
                let v1 = self.vertices[p[1]];
                let v2 = self.vertices[p[2]];
                (v1 - v0)
                    .cross(&(v2 - v0))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.attributes.normals = Some(normals);
        }
    }

    /// Append a texture coordinate set
    pub fn add_uv_set(&mut self, uvs: Vec<Uv>) {
        if uvs.len() == self.vertices.len() {
            self.attributes.uv_sets.push(uvs);
        }
    }

    /// Append a vertex color set
    pub fn add_color_set(&mut self, colors: Vec<Color>) {
        if colors.len() == self.vertices.len() {
            self.attributes.color_sets.push(colors);
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.polygons.clear();
        self.attributes = VertexAttributes::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_quad() -> IndexedMesh {
        IndexedMesh::from_vertices_and_polygons(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_counts() {
        let mesh = make_quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_triangulated());
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_triangulated() {
        let tri = make_quad().triangulated();
        assert_eq!(tri.polygons, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert!(tri.is_triangulated());
    }

    #[test]
    fn test_validate() {
        let mut mesh = make_quad();
        assert!(mesh.validate().is_ok());

        mesh.add_polygon(vec![0, 1, 7]);
        assert_eq!(
            mesh.validate(),
            Err(Error::InvalidIndex {
                polygon: 1,
                index: 7,
                vertex_count: 4
            })
        );

        mesh.polygons[1] = vec![0, 1, 1];
        assert_eq!(mesh.validate(), Err(Error::DegenerateFace { polygon: 1 }));

        mesh.polygons[1] = vec![0, 1];
        assert!(matches!(mesh.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_face_normals() {
        let normals = make_quad().calculate_face_normals();
        assert_eq!(normals.len(), 1);
        assert_relative_eq!(normals[0], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_attribute_copy() {
        let mut mesh = make_quad();
        mesh.set_normals(vec![Vector3f::z(); 4]);
        mesh.add_uv_set(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        mesh.add_uv_set(vec![[0.5, 0.5]; 3]); // wrong length, ignored
        assert_eq!(mesh.attributes.uv_sets.len(), 1);

        let mut dst = mesh.attributes.empty_like(2);
        dst.copy_vertex(1, &mesh.attributes, 2);
        assert_eq!(dst.uv_sets[0][1], [1.0, 1.0]);
        assert_eq!(dst.uv_sets[0][0], [0.0, 0.0]);
        assert_eq!(dst.normals.as_ref().unwrap()[1], Vector3f::z());
        assert!(dst.tangents.is_none());
    }
}

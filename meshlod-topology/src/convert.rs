//! Conversion between indexed meshes and half-edge meshes

use crate::half_edge::HalfEdgeMesh;
use crate::ids::*;
use itertools::Itertools;
use meshlod_core::{Error, IndexedMesh, Point3f, Result};
use std::collections::{HashMap, HashSet};

/// Which faces of a half-edge mesh are written back to an indexed mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconstructionStrategy {
    /// Real faces only, the geometry of the mesh
    #[default]
    TopologyFirst,
    /// Synthetic boundary faces only, one polygon fan per open border loop
    BoundaryOnly,
}

impl HalfEdgeMesh {
    /// Build a half-edge mesh from positions and polygon index lists.
    ///
    /// Allocates one vertex per position, one edge per distinct vertex pair
    /// used by a polygon, one face per polygon and one boundary face per open
    /// border loop. Polygons keep their input order as face ids.
    pub fn from_indexed_faces<P>(vertices: &[Point3f], polygons: &[P]) -> Result<Self>
    where
        P: AsRef<[usize]>,
    {
        let vertex_count = vertices.len();
        for (polygon, corners) in polygons.iter().enumerate() {
            let corners = corners.as_ref();
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

        let corner_count: usize = polygons.iter().map(|p| p.as_ref().len()).sum();
        let mut mesh = HalfEdgeMesh::with_capacity(vertex_count, corner_count, polygons.len() + 1);
        for p in vertices {
            mesh.add_vertex(*p);
        }

        let mut directed: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(corner_count * 2);
        for (polygon, corners) in polygons.iter().enumerate() {
            let mut cycle = Vec::with_capacity(corners.as_ref().len());
            for (&u, &v) in corners.as_ref().iter().circular_tuple_windows() {
                let h = match directed.get(&(u, v)) {
                    Some(&h) => h,
                    None => {
                        let edge = mesh
                            .add_edge(VertexId::new(u), VertexId::new(v))
                            .ok_or_else(|| Error::InvalidData(format!("Cannot connect {} and {}", u, v)))?;
                        let h = mesh[edge].halfedge;
                        directed.insert((u, v), h);
                        directed.insert((v, u), mesh.twin(h));
                        h
                    }
                };
                cycle.push(h);
            }
            if mesh.add_face(&cycle).is_none() {
                return Err(Error::NonManifold(format!(
                    "Polygon {} reuses an oriented edge of an earlier polygon",
                    polygon
                )));
            }
        }

        mesh.close_boundary_loops()?;

        log::debug!(
            "built half-edge mesh: {} vertices, {} edges, {} faces ({} boundary)",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces(),
            mesh.num_faces() - polygons.len()
        );
        Ok(mesh)
    }

    /// Build a half-edge mesh from an indexed mesh, carrying normals and the
    /// first uv set onto the vertices
    pub fn from_mesh(mesh: &IndexedMesh) -> Result<Self> {
        let mut hem = Self::from_indexed_faces(&mesh.vertices, &mesh.polygons)?;
        let normals = mesh
            .attributes
            .normals
            .as_ref()
            .filter(|n| n.len() == mesh.vertices.len());
        let uvs = mesh
            .attributes
            .uv_sets
            .first()
            .filter(|uv| uv.len() == mesh.vertices.len());
        for i in 0..mesh.vertices.len() {
            let vertex = hem.vertex_mut(VertexId::new(i));
            vertex.normal = normals.map(|n| n[i]);
            vertex.uv = uvs.map(|uv| uv[i]);
        }
        Ok(hem)
    }

    /// Give every face-less half-edge a synthetic boundary face, one per loop
    fn close_boundary_loops(&mut self) -> Result<()> {
        let mut outgoing: HashMap<VertexId, HalfEdgeId> = HashMap::new();
        let open: Vec<HalfEdgeId> = self
            .halfedges
            .iter()
            .filter(|(_, he)| !he.face.is_valid())
            .map(|(i, _)| HalfEdgeId::new(i))
            .collect();
        for &h in &open {
            if outgoing.insert(self.origin(h), h).is_some() {
                return Err(Error::NonManifold(format!(
                    "Vertex {} starts more than one boundary loop",
                    self.origin(h).index()
                )));
            }
        }

        let mut visited: HashSet<HalfEdgeId> = HashSet::with_capacity(open.len());
        for &start in &open {
            if visited.contains(&start) {
                continue;
            }
            let mut cycle = Vec::new();
            let mut cur = start;
            loop {
                cycle.push(cur);
                visited.insert(cur);
                let end = self.destination(cur);
                cur = *outgoing.get(&end).ok_or_else(|| {
                    Error::NonManifold(format!("Boundary loop breaks at vertex {}", end.index()))
                })?;
                if cur == start {
                    break;
                }
                if cycle.len() > open.len() {
                    return Err(Error::NonManifold("Boundary loop does not close".to_string()));
                }
            }
            self.add_boundary_face(&cycle).ok_or_else(|| {
                Error::NonManifold(format!("Boundary loop of {} half-edges is too short", cycle.len()))
            })?;
        }
        Ok(())
    }

    /// Fan-triangulate the selected faces into an indexed mesh.
    ///
    /// Every live vertex is written once, compacted in id order, so the
    /// vertex count is preserved. Normals and uvs are written when every
    /// vertex carries one.
    pub fn to_indexed_mesh(&self, strategy: ReconstructionStrategy) -> IndexedMesh {
        let mut remap = vec![usize::MAX; self.vertices.capacity()];
        let mut out = IndexedMesh::new();
        for (i, vertex) in self.vertices.iter() {
            remap[i] = out.add_vertex(vertex.position);
        }

        let normals: Option<Vec<_>> = self.vertices.iter().map(|(_, v)| v.normal).collect();
        if let Some(normals) = normals.filter(|n| !n.is_empty()) {
            out.set_normals(normals);
        }
        let uvs: Option<Vec<_>> = self.vertices.iter().map(|(_, v)| v.uv).collect();
        if let Some(uvs) = uvs.filter(|uv| !uv.is_empty()) {
            out.add_uv_set(uvs);
        }

        let want_boundary = strategy == ReconstructionStrategy::BoundaryOnly;
        for (i, face) in self.faces.iter() {
            if face.is_boundary != want_boundary {
                continue;
            }
            let corners: Vec<usize> = self
                .face_vertices(FaceId::new(i))
                .into_iter()
                .map(|v| remap[v.index()])
                .collect();
            for k in 1..corners.len().saturating_sub(1) {
                out.add_polygon(vec![corners[0], corners[k], corners[k + 1]]);
            }
        }
        out
    }
}

/// Rebuild an indexed mesh from the faces of `mesh` selected by `strategy`
pub fn mesh_from_half_edge_mesh(mesh: &HalfEdgeMesh, strategy: ReconstructionStrategy) -> IndexedMesh {
    mesh.to_indexed_mesh(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlod_core::Vector3f;

    fn make_tetrahedron() -> (Vec<Point3f>, Vec<[usize; 3]>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
                Point3f::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    #[test]
    fn test_closed_mesh_has_no_boundary_faces() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_halfedges(), 12);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_real_faces(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_open_mesh_gets_one_boundary_face_per_loop() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &faces[1..]).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_real_faces(), 3);
        let boundary = mesh.face_ids().find(|&f| mesh[f].is_boundary).unwrap();
        assert_eq!(mesh.face_degree(boundary), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_two_boundary_loops() {
        // annulus: square ring made of 8 triangles
        let mut vertices = Vec::new();
        for &s in &[2.0f32, 1.0] {
            vertices.push(Point3f::new(-s, -s, 0.0));
            vertices.push(Point3f::new(s, -s, 0.0));
            vertices.push(Point3f::new(s, s, 0.0));
            vertices.push(Point3f::new(-s, s, 0.0));
        }
        let mut faces = Vec::new();
        for i in 0..4 {
            let (o0, o1) = (i, (i + 1) % 4);
            let (i0, i1) = (4 + i, 4 + (i + 1) % 4);
            faces.push([o0, o1, i1]);
            faces.push([o0, i1, i0]);
        }
        let mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_faces() - mesh.num_real_faces(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_rejects_malformed_input() {
        let (vertices, _) = make_tetrahedron();
        assert_eq!(
            HalfEdgeMesh::from_indexed_faces(&vertices, &[[0, 1, 1]]).unwrap_err(),
            Error::DegenerateFace { polygon: 0 }
        );
        assert!(matches!(
            HalfEdgeMesh::from_indexed_faces(&vertices, &[[0, 1, 4]]),
            Err(Error::InvalidIndex { index: 4, .. })
        ));
        assert!(matches!(
            HalfEdgeMesh::from_indexed_faces(&vertices, &[vec![0, 1]]),
            Err(Error::InvalidData(_))
        ));
        // same orientation twice
        assert!(matches!(
            HalfEdgeMesh::from_indexed_faces(&vertices, &[[0, 1, 2], [0, 1, 3]]),
            Err(Error::NonManifold(_))
        ));
    }

    #[test]
    fn test_round_trip_preserves_counts() {
        let (vertices, faces) = make_tetrahedron();
        let mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &faces).unwrap();
        let out = mesh_from_half_edge_mesh(&mesh, ReconstructionStrategy::TopologyFirst);
        assert_eq!(out.vertex_count(), 4);
        assert_eq!(out.polygon_count(), 4);
        assert_eq!(out.vertices, vertices);
        assert_eq!(out.polygons[0], vec![0, 2, 1]);
        assert!(out.validate().is_ok());

        let boundary = mesh.to_indexed_mesh(ReconstructionStrategy::BoundaryOnly);
        assert_eq!(boundary.polygon_count(), 0);
    }

    #[test]
    fn test_quad_polygons_are_fan_triangulated() {
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
        let out = mesh.to_indexed_mesh(ReconstructionStrategy::TopologyFirst);
        assert_eq!(out.polygons, vec![vec![0, 1, 2], vec![0, 2, 3]]);

        let border = mesh.to_indexed_mesh(ReconstructionStrategy::BoundaryOnly);
        assert_eq!(border.polygon_count(), 2);
    }

    #[test]
    fn test_attributes_carried_through() {
        let (vertices, faces) = make_tetrahedron();
        let mut input = IndexedMesh::from_triangles(vertices, &faces);
        input.set_normals(vec![Vector3f::z(); 4]);
        input.add_uv_set(vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0], [0.5, 0.5]]);

        let mesh = HalfEdgeMesh::from_mesh(&input).unwrap();
        assert_eq!(mesh[VertexId::new(2)].uv, Some([0.5, 1.0]));

        let out = mesh.to_indexed_mesh(ReconstructionStrategy::TopologyFirst);
        assert_eq!(out.attributes.normals, input.attributes.normals);
        assert_eq!(out.attributes.uv_sets, input.attributes.uv_sets);
    }
}

//! Progressive mesh construction
//!
//! Computes a greedy ordering in which the vertices of a triangle mesh can be
//! removed one at a time. Every vertex is collapsed onto the neighbour whose
//! connecting edge is cheapest to remove, where the cost of an edge is its
//! length weighted by the curvature of the surface around it. Collapsing the
//! cheapest vertex changes the neighbourhood of its neighbours, so their costs
//! are recomputed before the next vertex is picked.

use crate::lod::{CollapseOperations, LodTarget};
use meshlod_core::{Error, IndexedMesh, Point3f, Result, Vector3f};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;

/// Collapse target of a vertex that has none
pub const INVALID_INDEX: u32 = u32::MAX;

/// A vertex together with its current adjacency
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3f,
    /// Vertices sharing an edge with this one
    pub neighbors: Vec<u32>,
    /// Faces using this vertex
    pub faces: Vec<usize>,
    /// Cost of collapsing onto `target`, `-1` for a vertex without neighbours
    pub cost: f32,
    pub target: Option<u32>,
    removed: bool,
}

impl Vertex {
    fn new(position: Point3f) -> Self {
        Self {
            position,
            neighbors: Vec::new(),
            faces: Vec::new(),
            cost: -1.0,
            target: None,
            removed: false,
        }
    }

    /// Whether the vertex has been collapsed away
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    fn add_neighbor(&mut self, v: u32) {
        if !self.neighbors.contains(&v) {
            self.neighbors.push(v);
        }
    }
}

/// A triangle with its cached unit normal
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: [u32; 3],
    pub normal: Vector3f,
}

impl Face {
    pub fn contains(&self, v: u32) -> bool {
        self.vertices.contains(&v)
    }
}

/// Triangle mesh with vertex/face adjacency, used to build a collapse ordering.
///
/// The mesh itself is never modified by [`Self::build_collapse_operations`];
/// the greedy pass runs on a private copy.
#[derive(Debug, Clone, Default)]
pub struct ProgressiveMesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl ProgressiveMesh {
    /// Build adjacency for a triangle mesh.
    ///
    /// Every polygon must be a triangle of three distinct, in-range indices.
    pub fn from_indexed_faces<P>(positions: &[Point3f], polygons: &[P]) -> Result<Self>
    where
        P: AsRef<[usize]>,
    {
        if positions.len() >= INVALID_INDEX as usize {
            return Err(Error::Unsupported(format!(
                "{} vertices exceed the 32-bit index range",
                positions.len()
            )));
        }

        let mut vertices: Vec<Vertex> = positions.iter().map(|&p| Vertex::new(p)).collect();
        let mut faces = Vec::with_capacity(polygons.len());
        for (polygon, corners) in polygons.iter().enumerate() {
            let corners = corners.as_ref();
            let &[a, b, c] = corners else {
                return Err(Error::NonTriangle {
                    polygon,
                    len: corners.len(),
                });
            };
            if let Some(&index) = corners.iter().find(|&&i| i >= positions.len()) {
                return Err(Error::InvalidIndex {
                    polygon,
                    index,
                    vertex_count: positions.len(),
                });
            }
            if a == b || b == c || a == c {
                return Err(Error::DegenerateFace { polygon });
            }

            let ids = [a as u32, b as u32, c as u32];
            let face = faces.len();
            faces.push(Face {
                vertices: ids,
                normal: triangle_normal(positions, ids),
            });
            for &v in &ids {
                let vertex = &mut vertices[v as usize];
                vertex.faces.push(face);
                for &other in ids.iter().filter(|&&o| o != v) {
                    vertex.add_neighbor(other);
                }
            }
        }

        log::debug!(
            "built progressive mesh with {} vertices and {} faces",
            vertices.len(),
            faces.len()
        );
        Ok(Self { vertices, faces })
    }

    /// Build from the positions and polygons of an indexed mesh
    pub fn from_mesh(mesh: &IndexedMesh) -> Result<Self> {
        Self::from_indexed_faces(&mesh.vertices, &mesh.polygons)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Faces in their original order
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Cost of collapsing `u` onto `v`.
    ///
    /// The edge length is weighted by the largest angle between any face
    /// around `u` and the nearest of the faces shared by `u` and `v`. A vertex
    /// without faces gets curvature 1.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range.
    pub fn compute_edge_collapse_cost(&self, u: u32, v: u32) -> f32 {
        let from = &self.vertices[u as usize];
        let to = &self.vertices[v as usize];
        let length = nalgebra::distance(&from.position, &to.position);

        let sides: Vec<&Face> = from
            .faces
            .iter()
            .map(|&f| &self.faces[f])
            .filter(|face| face.contains(v))
            .collect();

        let mut curvature: f32 = if from.faces.is_empty() { 1.0 } else { 0.0 };
        for &f in &from.faces {
            let normal = self.faces[f].normal;
            let nearest = sides
                .iter()
                .map(|side| (1.0 - normal.dot(&side.normal)) / 2.0)
                .fold(1.0, f32::min);
            curvature = curvature.max(nearest);
        }
        length * curvature
    }

    /// Recompute the cheapest collapse of `v` over all its neighbours.
    ///
    /// Ties keep the first neighbour in adjacency order. A vertex without
    /// neighbours gets cost `-1` and no target.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    pub fn compute_vertex_collapse_cost(&mut self, v: u32) {
        let best = self.vertices[v as usize]
            .neighbors
            .iter()
            .map(|&n| (self.compute_edge_collapse_cost(v, n), n))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let vertex = &mut self.vertices[v as usize];
        match best {
            Some((cost, target)) => {
                vertex.cost = cost;
                vertex.target = Some(target);
            }
            None => {
                vertex.cost = -1.0;
                vertex.target = None;
            }
        }
    }

    /// Collapse `u` onto `target` and refresh the costs of its old neighbours.
    ///
    /// Faces containing both vertices disappear, the remaining faces of `u`
    /// are re-pointed to `target`, and `u` is removed. Without a target the
    /// vertex and its faces are simply dropped.
    ///
    /// # Panics
    ///
    /// Panics if `u` is out of range, or if `target` is out of range while `u`
    /// still has faces.
    pub fn collapse(&mut self, u: u32, target: Option<u32>) {
        let ui = u as usize;
        if self.vertices[ui].removed {
            return;
        }
        let neighbors = self.vertices[ui].neighbors.clone();

        match target {
            Some(v) if v != u => {
                let shared: Vec<usize> = self.vertices[ui]
                    .faces
                    .iter()
                    .copied()
                    .filter(|&f| self.faces[f].contains(v))
                    .collect();
                for f in shared {
                    self.remove_face(f);
                }
                let remaining = self.vertices[ui].faces.clone();
                for f in remaining {
                    self.replace_vertex(f, u, v);
                }
            }
            _ => {
                let faces = self.vertices[ui].faces.clone();
                for f in faces {
                    self.remove_face(f);
                }
            }
        }

        self.delete_vertex(u);
        for n in neighbors {
            self.compute_vertex_collapse_cost(n);
        }
    }

    /// Run the greedy collapse pass over a copy of the mesh.
    ///
    /// Vertex `c` removed in step `i` (counting down from the vertex count)
    /// gets `permutation[c] = i`, and `map[i]` holds the new index of the
    /// vertex it collapsed onto (`0` when it had none).
    pub fn build_collapse_operations(&self) -> CollapseOperations {
        let n = self.vertices.len();
        let mut work = self.clone();
        let mut queue: PriorityQueue<u32, CollapseKey> = PriorityQueue::with_capacity(n);
        for v in 0..n as u32 {
            work.compute_vertex_collapse_cost(v);
            queue.push(v, CollapseKey::of(&work, v));
        }

        let mut permutation = vec![0u32; n];
        let mut map = vec![INVALID_INDEX; n];
        for i in (0..n).rev() {
            let Some((c, key)) = queue.pop() else {
                break;
            };
            let target = work.vertices[c as usize].target;
            log::trace!("step {}: collapse v{} onto {:?} at cost {}", i, c, target, key.cost);

            permutation[c as usize] = i as u32;
            map[i] = target.unwrap_or(INVALID_INDEX);

            let neighbors = work.vertices[c as usize].neighbors.clone();
            work.collapse(c, target);
            for nb in neighbors {
                queue.push(nb, CollapseKey::of(&work, nb));
            }
        }

        for slot in map.iter_mut() {
            *slot = if *slot == INVALID_INDEX {
                0
            } else {
                permutation[*slot as usize]
            };
        }

        log::debug!("computed collapse ordering for {} vertices", n);
        CollapseOperations { permutation, map }
    }

    /// Compute a fresh collapse ordering and replay it down to `target`.
    ///
    /// When `source` is given, its per-vertex attributes are copied from the
    /// original vertex indices.
    pub fn generate_lod_mesh(&self, target: LodTarget, source: Option<&IndexedMesh>) -> IndexedMesh {
        self.build_collapse_operations()
            .generate_lod_mesh(self, target, source)
    }

    fn remove_face(&mut self, f: usize) {
        let corners = self.faces[f].vertices;
        for &c in &corners {
            self.vertices[c as usize].faces.retain(|&x| x != f);
        }
        for &a in &corners {
            for &b in corners.iter().filter(|&&b| b != a) {
                self.remove_if_non_neighbor(a, b);
            }
        }
    }

    fn replace_vertex(&mut self, f: usize, u: u32, v: u32) {
        let face = &mut self.faces[f];
        for corner in face.vertices.iter_mut().filter(|c| **c == u) {
            *corner = v;
        }
        let corners = face.vertices;

        self.vertices[u as usize].faces.retain(|&x| x != f);
        self.vertices[v as usize].faces.push(f);
        for &c in &corners {
            self.remove_if_non_neighbor(u, c);
            self.remove_if_non_neighbor(c, u);
        }
        for &a in &corners {
            for &b in corners.iter().filter(|&&b| b != a) {
                self.vertices[a as usize].add_neighbor(b);
            }
        }

        let positions: Vec<Point3f> = corners
            .iter()
            .map(|&c| self.vertices[c as usize].position)
            .collect();
        self.faces[f].normal = triangle_normal(&positions, [0, 1, 2]);
    }

    /// Drop `n` from the neighbours of `v` unless a face still joins them
    fn remove_if_non_neighbor(&mut self, v: u32, n: u32) {
        let vertex = &self.vertices[v as usize];
        if !vertex.neighbors.contains(&n) {
            return;
        }
        if vertex.faces.iter().any(|&f| self.faces[f].contains(n)) {
            return;
        }
        self.vertices[v as usize].neighbors.retain(|&x| x != n);
    }

    fn delete_vertex(&mut self, u: u32) {
        let vertex = &mut self.vertices[u as usize];
        let neighbors = std::mem::take(&mut vertex.neighbors);
        vertex.faces.clear();
        vertex.removed = true;
        vertex.cost = -1.0;
        vertex.target = None;
        for n in neighbors {
            self.vertices[n as usize].neighbors.retain(|&x| x != u);
        }
    }
}

fn triangle_normal(positions: &[Point3f], ids: [u32; 3]) -> Vector3f {
    let p0 = positions[ids[0] as usize];
    let p1 = positions[ids[1] as usize];
    let p2 = positions[ids[2] as usize];
    (p1 - p0)
        .cross(&(p2 - p0))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3f::zeros)
}

/// Queue key: lowest cost first, then lowest id
#[derive(Debug, Clone, Copy)]
struct CollapseKey {
    cost: f32,
    id: u32,
}

impl CollapseKey {
    fn of(mesh: &ProgressiveMesh, id: u32) -> Self {
        Self {
            cost: mesh.vertices[id as usize].cost,
            id,
        }
    }
}

impl PartialEq for CollapseKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for CollapseKey {}

impl PartialOrd for CollapseKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollapseKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

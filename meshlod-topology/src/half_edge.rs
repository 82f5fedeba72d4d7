//! Half-edge mesh records, primitive mutators and adjacency queries

use crate::ids::*;
use crate::pool::Pool;
use meshlod_core::{bounding_box_of, Bounded, Point3f, Uv, Vector3f};
use std::ops::Index;

/// A vertex with one representative outgoing half-edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3f,
    /// Outgoing half-edge, `INVALID` for an isolated vertex
    pub halfedge: HalfEdgeId,
    pub normal: Option<Vector3f>,
    pub uv: Option<Uv>,
}

/// An undirected edge referencing one of its two half-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub halfedge: HalfEdgeId,
}

/// One directed side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Oppositely directed half-edge of the same edge
    pub twin: HalfEdgeId,
    /// Next half-edge counter-clockwise around `face`
    pub next: HalfEdgeId,
    /// Origin vertex
    pub vertex: VertexId,
    pub edge: EdgeId,
    /// Owning face, `INVALID` while the half-edge is not part of a loop
    pub face: FaceId,
}

/// A closed loop of half-edges.
///
/// Boundary faces are synthetic: they close the loops of open mesh borders and
/// carry no geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub is_boundary: bool,
    pub halfedge: HalfEdgeId,
}

/// Half-edge mesh with pooled, reusable element ids.
///
/// Elements live in per-kind pools; removal returns the id to the pool's free
/// list. Compound edits (`flip_edge`, `split_edge`, `collapse_edge`) either
/// succeed and leave every connectivity invariant intact, or return `None`
/// without touching the mesh.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Pool<Vertex>,
    pub(crate) edges: Pool<Edge>,
    pub(crate) halfedges: Pool<HalfEdge>,
    pub(crate) faces: Pool<Face>,
}

impl Index<VertexId> for HalfEdgeMesh {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }
}

impl Index<EdgeId> for HalfEdgeMesh {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }
}

impl Index<HalfEdgeId> for HalfEdgeMesh {
    type Output = HalfEdge;

    fn index(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }
}

impl Index<FaceId> for HalfEdgeMesh {
    type Output = Face;

    fn index(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }
}

impl HalfEdgeMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize, faces: usize) -> Self {
        Self {
            vertices: Pool::with_capacity(vertices),
            edges: Pool::with_capacity(edges),
            halfedges: Pool::with_capacity(edges * 2),
            faces: Pool::with_capacity(faces),
        }
    }

    // ------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn halfedge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.halfedges.get(id.index())
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index())
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of faces, boundary faces included
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of non-boundary faces
    pub fn num_real_faces(&self) -> usize {
        self.faces.iter().filter(|(_, f)| !f.is_boundary).count()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.indices().map(VertexId::new)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.indices().map(EdgeId::new)
    }

    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedges.indices().map(HalfEdgeId::new)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.indices().map(FaceId::new)
    }

    pub fn set_position(&mut self, v: VertexId, position: Point3f) -> bool {
        match self.vertices.get_mut(v.index()) {
            Some(vertex) => {
                vertex.position = position;
                true
            }
            None => false,
        }
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    pub(crate) fn he_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    pub(crate) fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }

    // ------------------------------------------------------------
    // Primitive mutators
    // ------------------------------------------------------------

    /// Allocate a vertex without connectivity
    pub fn add_vertex(&mut self, position: Point3f) -> VertexId {
        VertexId::new(self.vertices.insert(Vertex {
            position,
            halfedge: HalfEdgeId::INVALID,
            normal: None,
            uv: None,
        }))
    }

    /// Allocate an edge and its two half-edges between two existing, distinct
    /// vertices. The half-edges have no face and no `next` yet.
    ///
    /// The edge's representative half-edge runs from `v0` to `v1`.
    pub fn add_edge(&mut self, v0: VertexId, v1: VertexId) -> Option<EdgeId> {
        if v0 == v1 || self.vertex(v0).is_none() || self.vertex(v1).is_none() {
            return None;
        }
        let (edge, h0, h1) = self.alloc_edge(v0, v1);
        if !self[v0].halfedge.is_valid() {
            self.vertex_mut(v0).halfedge = h0;
        }
        if !self[v1].halfedge.is_valid() {
            self.vertex_mut(v1).halfedge = h1;
        }
        Some(edge)
    }

    /// Allocate an edge pair without touching vertex representatives
    pub(crate) fn alloc_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
    ) -> (EdgeId, HalfEdgeId, HalfEdgeId) {
        let edge = EdgeId::new(self.edges.insert(Edge {
            halfedge: HalfEdgeId::INVALID,
        }));
        let h0 = HalfEdgeId::new(self.halfedges.insert(HalfEdge {
            twin: HalfEdgeId::INVALID,
            next: HalfEdgeId::INVALID,
            vertex: from,
            edge,
            face: FaceId::INVALID,
        }));
        let h1 = HalfEdgeId::new(self.halfedges.insert(HalfEdge {
            twin: h0,
            next: HalfEdgeId::INVALID,
            vertex: to,
            edge,
            face: FaceId::INVALID,
        }));
        self.he_mut(h0).twin = h1;
        self.edge_mut(edge).halfedge = h0;
        (edge, h0, h1)
    }

    pub(crate) fn alloc_face(&mut self, is_boundary: bool, halfedge: HalfEdgeId) -> FaceId {
        FaceId::new(self.faces.insert(Face {
            is_boundary,
            halfedge,
        }))
    }

    /// Close an ordered cycle of face-less half-edges into a new face.
    ///
    /// Each half-edge must end where the following one starts, the last one
    /// wrapping around to the first. Returns `None` for fewer than three
    /// half-edges or when any of them is missing, repeated, already owned by a
    /// face, or out of sequence.
    pub fn add_face(&mut self, halfedges: &[HalfEdgeId]) -> Option<FaceId> {
        self.add_face_of_kind(halfedges, false)
    }

    /// Same as [`Self::add_face`] but marks the face as a boundary face
    pub fn add_boundary_face(&mut self, halfedges: &[HalfEdgeId]) -> Option<FaceId> {
        self.add_face_of_kind(halfedges, true)
    }

    fn add_face_of_kind(&mut self, halfedges: &[HalfEdgeId], is_boundary: bool) -> Option<FaceId> {
        if halfedges.len() < 3 {
            return None;
        }
        for (i, &h) in halfedges.iter().enumerate() {
            let he = self.halfedge(h)?;
            if he.face.is_valid() || halfedges[..i].contains(&h) {
                return None;
            }
            let next = halfedges[(i + 1) % halfedges.len()];
            if self.destination(h) != self.halfedge(next)?.vertex {
                return None;
            }
        }

        let face = self.alloc_face(is_boundary, halfedges[0]);
        for (i, &h) in halfedges.iter().enumerate() {
            let next = halfedges[(i + 1) % halfedges.len()];
            let he = self.he_mut(h);
            he.face = face;
            he.next = next;
        }
        Some(face)
    }

    /// Return a vertex to the free list. References to it are not cleared.
    pub fn remove_vertex(&mut self, v: VertexId) -> bool {
        self.vertices.remove(v.index()).is_some()
    }

    /// Return an edge and both of its half-edges to their free lists.
    /// References to them are not cleared.
    pub fn remove_edge(&mut self, e: EdgeId) -> bool {
        let Some(edge) = self.edges.remove(e.index()) else {
            return false;
        };
        if let Some(he) = self.halfedges.remove(edge.halfedge.index()) {
            self.halfedges.remove(he.twin.index());
        }
        true
    }

    /// Return a face to the free list. Its half-edges keep pointing at it.
    pub fn remove_face(&mut self, f: FaceId) -> bool {
        self.faces.remove(f.index()).is_some()
    }

    pub(crate) fn release_halfedge(&mut self, h: HalfEdgeId) {
        self.halfedges.remove(h.index());
    }

    pub(crate) fn release_edge(&mut self, e: EdgeId) {
        self.edges.remove(e.index());
    }

    // ------------------------------------------------------------
    // Adjacency queries
    // ------------------------------------------------------------

    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self[h].vertex
    }

    #[inline]
    pub fn destination(&self, h: HalfEdgeId) -> VertexId {
        self[self[h].twin].vertex
    }

    #[inline]
    pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self[h].twin
    }

    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self[h].next
    }

    /// Half-edge whose `next` is `h`, found by walking `h`'s face loop
    pub fn prev(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        let mut cur = h;
        for _ in 0..self.halfedges.len() {
            let next = self.halfedge(cur)?.next;
            if next == h {
                return Some(cur);
            }
            cur = next;
        }
        None
    }

    /// Whether `f` exists and is not a boundary face
    pub fn is_real_face(&self, f: FaceId) -> bool {
        self.face(f).is_some_and(|face| !face.is_boundary)
    }

    /// Half-edges of a face loop starting at its representative.
    ///
    /// Returns an empty list for a removed face or a broken loop.
    pub fn face_halfedges(&self, f: FaceId) -> Vec<HalfEdgeId> {
        let Some(face) = self.face(f) else {
            return Vec::new();
        };
        let start = face.halfedge;
        let mut result = Vec::new();
        let mut cur = start;
        loop {
            result.push(cur);
            cur = match self.halfedge(cur) {
                Some(he) => he.next,
                None => return Vec::new(),
            };
            if cur == start {
                return result;
            }
            if result.len() > self.halfedges.len() {
                return Vec::new();
            }
        }
    }

    pub fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        self.face_halfedges(f)
            .into_iter()
            .map(|h| self.origin(h))
            .collect()
    }

    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_halfedges(f).len()
    }

    /// Outgoing half-edges of `v`, rotating through `twin.next`.
    ///
    /// Falls back to a full scan when the fan is interrupted by half-edges
    /// that are not yet part of a face loop.
    pub fn vertex_outgoing(&self, v: VertexId) -> Vec<HalfEdgeId> {
        let Some(vertex) = self.vertex(v) else {
            return Vec::new();
        };
        let start = vertex.halfedge;
        if !start.is_valid() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut cur = start;
        loop {
            result.push(cur);
            let next = self.next(self.twin(cur));
            if !next.is_valid() || result.len() > self.halfedges.len() {
                return self.scan_outgoing(v);
            }
            if next == start {
                return result;
            }
            cur = next;
        }
    }

    fn scan_outgoing(&self, v: VertexId) -> Vec<HalfEdgeId> {
        self.halfedges
            .iter()
            .filter(|(_, he)| he.vertex == v)
            .map(|(i, _)| HalfEdgeId::new(i))
            .collect()
    }

    /// Distinct vertices connected to `v` by an edge
    pub fn vertex_neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let mut result: Vec<VertexId> = Vec::new();
        for h in self.vertex_outgoing(v) {
            let n = self.destination(h);
            if !result.contains(&n) {
                result.push(n);
            }
        }
        result
    }

    pub fn vertex_valence(&self, v: VertexId) -> usize {
        self.vertex_neighbors(v).len()
    }

    /// Half-edge running from `from` to `to`, if the two are connected
    pub fn find_halfedge(&self, from: VertexId, to: VertexId) -> Option<HalfEdgeId> {
        self.vertex_outgoing(from)
            .into_iter()
            .find(|&h| self.destination(h) == to)
    }

    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.find_halfedge(a, b).map(|h| self[h].edge)
    }

    /// An edge is on the boundary if either side is not a real face
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        let Some(edge) = self.edge(e) else {
            return false;
        };
        let h = edge.halfedge;
        !self.is_real_face(self[h].face) || !self.is_real_face(self[self.twin(h)].face)
    }

    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex_outgoing(v)
            .into_iter()
            .any(|h| self.is_boundary_edge(self[h].edge))
    }

    /// Vertex opposite `h` when `h` lies in a triangle (boundary or real)
    pub(crate) fn triangle_apex(&self, h: HalfEdgeId) -> Option<VertexId> {
        let he = self.halfedge(h)?;
        if !he.face.is_valid() || self.face_degree(he.face) != 3 {
            return None;
        }
        Some(self.origin(self.next(he.next)))
    }
}

impl Bounded for HalfEdgeMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounding_box_of(self.vertices.iter().map(|(_, v)| &v.position))
    }
}

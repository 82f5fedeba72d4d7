//! Local topological edits: edge flip, split and collapse
//!
//! Every edit gathers and checks all the elements it touches before writing
//! anything, so a rejected edit leaves the mesh exactly as it was.

use crate::half_edge::HalfEdgeMesh;
use crate::ids::*;
use meshlod_core::{lerp_point, lerp_uv, Uv, Vector3f};

/// Half-edges of one side of an edge about to be collapsed
#[derive(Debug, Clone, Copy)]
enum CollapseSide {
    /// The side is a triangle that degenerates: its two other edges merge
    Merge {
        /// Half-edge following the collapsed one
        next: HalfEdgeId,
        /// Half-edge preceding the collapsed one
        prev: HalfEdgeId,
        apex: VertexId,
    },
    /// The side has more than three corners and only loses the collapsed half-edge
    Shrink { prev: HalfEdgeId },
}

impl HalfEdgeMesh {
    /// Rotate an interior edge inside the quad formed by its two triangles.
    ///
    /// The edge stops connecting its endpoints and instead connects the two
    /// apex vertices. Returns `None` if either side is a boundary face or not a
    /// triangle, or if both apexes are the same vertex. Apexes that are already
    /// connected end up joined by a second edge.
    pub fn flip_edge(&mut self, edge: EdgeId) -> Option<EdgeId> {
        let h = self.edge(edge)?.halfedge;
        let t = self.twin(h);
        let (fa, fb) = (self[h].face, self[t].face);
        if !self.is_real_face(fa) || !self.is_real_face(fb) || fa == fb {
            log::debug!("flip of {} rejected: boundary edge", edge);
            return None;
        }
        if self.face_degree(fa) != 3 || self.face_degree(fb) != 3 {
            log::debug!("flip of {} rejected: adjacent face is not a triangle", edge);
            return None;
        }

        // a -h-> b -h1-> c -h2-> a  and  b -t-> a -t1-> d -t2-> b
        let h1 = self.next(h);
        let h2 = self.next(h1);
        let t1 = self.next(t);
        let t2 = self.next(t1);
        let (a, b) = (self.origin(h), self.origin(t));
        let (c, d) = (self.origin(h2), self.origin(t2));
        if c == d {
            log::debug!("flip of {} rejected: both apexes are {}", edge, c);
            return None;
        }

        // d -h-> c -h2-> a -t1-> d  and  c -t-> d -t2-> b -h1-> c
        {
            let he = self.he_mut(h);
            he.vertex = d;
            he.next = h2;
        }
        self.he_mut(h2).next = t1;
        let he = self.he_mut(t1);
        he.next = h;
        he.face = fa;

        {
            let he = self.he_mut(t);
            he.vertex = c;
            he.next = t2;
        }
        self.he_mut(t2).next = h1;
        let he = self.he_mut(h1);
        he.next = t;
        he.face = fb;

        self.face_mut(fa).halfedge = h;
        self.face_mut(fb).halfedge = t;
        if self[a].halfedge == h {
            self.vertex_mut(a).halfedge = t1;
        }
        if self[b].halfedge == t {
            self.vertex_mut(b).halfedge = h1;
        }

        debug_assert!(self.is_valid());
        Some(edge)
    }

    /// Insert a vertex at parameter `t` along `edge` (0 at the representative
    /// half-edge's origin) and re-triangulate the adjacent triangles.
    ///
    /// A triangle side becomes two triangles; a boundary side just gains the
    /// new vertex. Returns `None` if a real side is not a triangle or if both
    /// sides are the same face.
    pub fn split_edge(&mut self, edge: EdgeId, t: f32) -> Option<VertexId> {
        let h = self.edge(edge)?.halfedge;
        let tw = self.twin(h);
        let (fa, fb) = (self[h].face, self[tw].face);
        if !fa.is_valid() || !fb.is_valid() || fa == fb {
            log::debug!("split of {} rejected: edge is not between two faces", edge);
            return None;
        }
        let a_is_tri = self.is_real_face(fa);
        let b_is_tri = self.is_real_face(fb);
        if (a_is_tri && self.face_degree(fa) != 3) || (b_is_tri && self.face_degree(fb) != 3) {
            log::debug!("split of {} rejected: adjacent face is not a triangle", edge);
            return None;
        }

        let (a, b) = (self.origin(h), self.origin(tw));
        let h_next = self.next(h);
        let tw_prev = self.prev(tw)?;
        let tw_next = self.next(tw);

        let m = self.add_interpolated_vertex(a, b, t);
        // a -h-> m -hb-> b   and   b -tb-> m -tw-> a
        let (_, hb, tb) = self.alloc_edge(m, b);
        self.he_mut(tw).vertex = m;
        self.vertex_mut(m).halfedge = hb;
        if self[b].halfedge == tw {
            self.vertex_mut(b).halfedge = tb;
        }

        if a_is_tri {
            // a -h-> m -n-> c -h2-> a   and   m -hb-> b -h1-> c -n_twin-> m
            let h1 = h_next;
            let h2 = self.next(h1);
            let c = self.origin(h2);
            let (_, n, n_twin) = self.alloc_edge(m, c);
            let fa2 = self.alloc_face(false, hb);
            self.link(&[h, n, h2], fa);
            self.link(&[hb, h1, n_twin], fa2);
            self.face_mut(fa).halfedge = h;
        } else {
            self.he_mut(h).next = hb;
            let he = self.he_mut(hb);
            he.next = h_next;
            he.face = fa;
        }

        if b_is_tri {
            // m -tw-> a -t1-> d -k_twin-> m   and   b -tb-> m -k-> d -t2-> b
            let t1 = tw_next;
            let t2 = tw_prev;
            let d = self.origin(t2);
            let (_, k, k_twin) = self.alloc_edge(m, d);
            let fb2 = self.alloc_face(false, tb);
            self.link(&[tw, t1, k_twin], fb);
            self.link(&[tb, k, t2], fb2);
            self.face_mut(fb).halfedge = tw;
        } else {
            self.he_mut(tw_prev).next = tb;
            let he = self.he_mut(tb);
            he.next = tw;
            he.face = fb;
        }

        debug_assert!(self.is_valid());
        Some(m)
    }

    /// Merge the endpoints of `edge` into the representative half-edge's
    /// origin, moved to parameter `t` along the edge.
    ///
    /// Triangles on either side collapse to a line and are removed along with
    /// one of their two remaining edges; larger faces just lose a corner.
    /// Returns the surviving vertex, or `None` when the collapse would break
    /// the link condition (the endpoints share a neighbour other than the
    /// apexes of the removed triangles, or the collapse folds two triangles
    /// onto each other).
    pub fn collapse_edge(&mut self, edge: EdgeId, t: f32) -> Option<VertexId> {
        let h = self.edge(edge)?.halfedge;
        let tw = self.twin(h);
        let (fa, fb) = (self[h].face, self[tw].face);
        if !fa.is_valid() || !fb.is_valid() || fa == fb {
            log::debug!("collapse of {} rejected: edge is not between two faces", edge);
            return None;
        }
        let (a, b) = (self.origin(h), self.origin(tw));
        if !self.is_boundary_edge(edge) && self.is_boundary_vertex(a) && self.is_boundary_vertex(b) {
            log::debug!("collapse of {} rejected: it would pinch the boundary", edge);
            return None;
        }
        let parallel = self
            .vertex_outgoing(a)
            .into_iter()
            .filter(|&out| self.destination(out) == b)
            .count();
        if parallel > 1 {
            log::debug!("collapse of {} rejected: {} and {} share {} edges", edge, a, b, parallel);
            return None;
        }

        let side_a = self.collapse_side(h)?;
        let side_b = self.collapse_side(tw)?;
        if !self.satisfies_link_condition(a, b, side_a, side_b) {
            log::debug!("collapse of {} rejected: link condition fails for {} and {}", edge, a, b);
            return None;
        }

        let b_outgoing = self.vertex_outgoing(b);
        let h_next = self.next(h);
        let tw_next = self.next(tw);

        let position = lerp_point(&self[a].position, &self[b].position, t);
        let (normal, uv) = self.interpolated_attributes(a, b, t);
        {
            let vertex = self.vertex_mut(a);
            vertex.position = position;
            vertex.normal = normal;
            vertex.uv = uv;
        }

        // Side of h: a -h-> b -next-> c -prev-> a
        let survivor_out = match side_a {
            CollapseSide::Merge { next, prev, apex } => {
                // c -x-> b becomes c -x-> a, the twin of a -y-> c
                let x = self.twin(next);
                let y = self.twin(prev);
                self.merge_twins(x, y, apex, prev);
                self.remove_triangle(fa, next, prev);
                y
            }
            CollapseSide::Shrink { prev } => {
                self.he_mut(prev).next = h_next;
                if self[fa].halfedge == h {
                    self.face_mut(fa).halfedge = h_next;
                }
                h_next
            }
        };

        // Side of tw: b -tw-> a -next-> d -prev-> b
        match side_b {
            CollapseSide::Merge { next, prev, apex } => {
                // d -u-> a stays, b -w-> d becomes a -w-> d
                let u = self.twin(next);
                let w = self.twin(prev);
                self.merge_twins(w, u, apex, prev);
                self.remove_triangle(fb, next, prev);
            }
            CollapseSide::Shrink { prev } => {
                self.he_mut(prev).next = tw_next;
                if self[fb].halfedge == tw {
                    self.face_mut(fb).halfedge = tw_next;
                }
            }
        }

        for out in b_outgoing {
            if out != tw && self.halfedges.contains(out.index()) {
                self.he_mut(out).vertex = a;
            }
        }
        self.release_halfedge(h);
        self.release_halfedge(tw);
        self.release_edge(edge);
        self.remove_vertex(b);
        self.vertex_mut(a).halfedge = survivor_out;

        debug_assert!(self.is_valid());
        Some(a)
    }

    fn collapse_side(&self, h: HalfEdgeId) -> Option<CollapseSide> {
        let face = self[h].face;
        match self.face_degree(face) {
            0..=2 => None,
            3 => {
                let next = self.next(h);
                let prev = self.next(next);
                Some(CollapseSide::Merge {
                    next,
                    prev,
                    apex: self.origin(prev),
                })
            }
            _ => Some(CollapseSide::Shrink { prev: self.prev(h)? }),
        }
    }

    fn satisfies_link_condition(
        &self,
        a: VertexId,
        b: VertexId,
        side_a: CollapseSide,
        side_b: CollapseSide,
    ) -> bool {
        let apex = |side: CollapseSide| match side {
            CollapseSide::Merge { apex, .. } => Some(apex),
            CollapseSide::Shrink { .. } => None,
        };
        let mut expected: Vec<VertexId> = [apex(side_a), apex(side_b)].into_iter().flatten().collect();
        if expected.len() == 2 && expected[0] == expected[1] {
            return false;
        }
        expected.sort();

        // the merged edges must end up in two different faces
        for side in [side_a, side_b] {
            if let CollapseSide::Merge { next, prev, .. } = side {
                if self[self.twin(next)].face == self[self.twin(prev)].face {
                    return false;
                }
            }
        }

        let neighbors_b = self.vertex_neighbors(b);
        let mut common: Vec<VertexId> = self
            .vertex_neighbors(a)
            .into_iter()
            .filter(|v| neighbors_b.contains(v))
            .collect();
        common.sort();
        if common != expected {
            return false;
        }

        // tetrahedron-like fold: both apexes span an edge whose two triangles
        // contain a and b
        if let [c, d] = expected[..] {
            if let Some(cd) = self.find_halfedge(c, d) {
                let apexes = [self.triangle_apex(cd), self.triangle_apex(self.twin(cd))];
                if apexes.contains(&Some(a)) && apexes.contains(&Some(b)) {
                    return false;
                }
            }
        }
        true
    }

    /// Make `x` and `y` twins on the edge of `y`, dropping the edge of `x`.
    /// `apex` gets a new representative if it was `removed_from_apex`.
    fn merge_twins(&mut self, x: HalfEdgeId, y: HalfEdgeId, apex: VertexId, removed_from_apex: HalfEdgeId) {
        let dropped_edge = self[x].edge;
        let kept_edge = self[y].edge;
        {
            let he = self.he_mut(x);
            he.twin = y;
            he.edge = kept_edge;
        }
        self.he_mut(y).twin = x;
        self.edge_mut(kept_edge).halfedge = y;
        self.release_edge(dropped_edge);
        if self[apex].halfedge == removed_from_apex {
            self.vertex_mut(apex).halfedge = if self.origin(x) == apex { x } else { y };
        }
    }

    fn remove_triangle(&mut self, face: FaceId, next: HalfEdgeId, prev: HalfEdgeId) {
        self.release_halfedge(next);
        self.release_halfedge(prev);
        self.remove_face(face);
    }

    /// Close `halfedges` into the loop of `face`
    fn link(&mut self, halfedges: &[HalfEdgeId], face: FaceId) {
        for (i, &h) in halfedges.iter().enumerate() {
            let next = halfedges[(i + 1) % halfedges.len()];
            let he = self.he_mut(h);
            he.next = next;
            he.face = face;
        }
    }

    fn add_interpolated_vertex(&mut self, a: VertexId, b: VertexId, t: f32) -> VertexId {
        let position = lerp_point(&self[a].position, &self[b].position, t);
        let (normal, uv) = self.interpolated_attributes(a, b, t);
        let m = self.add_vertex(position);
        let vertex = self.vertex_mut(m);
        vertex.normal = normal;
        vertex.uv = uv;
        m
    }

    fn interpolated_attributes(
        &self,
        a: VertexId,
        b: VertexId,
        t: f32,
    ) -> (Option<Vector3f>, Option<Uv>) {
        let (va, vb) = (&self[a], &self[b]);
        let normal = match (va.normal, vb.normal) {
            (Some(na), Some(nb)) => Some(
                (na + (nb - na) * t)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or(na),
            ),
            (n, None) | (None, n) => n,
        };
        let uv = match (va.uv, vb.uv) {
            (Some(ua), Some(ub)) => Some(lerp_uv(ua, ub, t)),
            (u, None) | (None, u) => u,
        };
        (normal, uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlod_core::Point3f;

    /// Unit square split along the 0-2 diagonal: 4 vertices, 2 triangles and
    /// one boundary face
    fn make_quad() -> HalfEdgeMesh {
        HalfEdgeMesh::from_indexed_faces(
            &[
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    #[test]
    fn test_flip_diagonal() {
        let mut mesh = make_quad();
        let diagonal = mesh.find_edge(v(0), v(2)).unwrap();
        let flipped = mesh.flip_edge(diagonal).unwrap();
        assert_eq!(flipped, diagonal);
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 3);
        assert!(mesh.find_edge(v(0), v(2)).is_none());
        assert_eq!(mesh.find_edge(v(1), v(3)), Some(diagonal));

        // flipping back restores the original diagonal
        mesh.flip_edge(diagonal).unwrap();
        assert_eq!(mesh.find_edge(v(0), v(2)), Some(diagonal));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_boundary_edge_fails() {
        let mut mesh = make_quad();
        let border = mesh.find_edge(v(0), v(1)).unwrap();
        let before = format!("{:?}", mesh);
        assert!(mesh.flip_edge(border).is_none());
        assert_eq!(format!("{:?}", mesh), before);
    }

    #[test]
    fn test_split_interior_edge() {
        let mut mesh = make_quad();
        let diagonal = mesh.find_edge(v(0), v(2)).unwrap();
        let m = mesh.split_edge(diagonal, 0.5).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_real_faces(), 4);
        assert_eq!(mesh.num_edges(), 8);
        assert_eq!(mesh[m].position, Point3f::new(0.5, 0.5, 0.0));
        assert_eq!(mesh.vertex_valence(m), 4);
    }

    #[test]
    fn test_split_boundary_edge() {
        let mut mesh = make_quad();
        let border = mesh.find_edge(v(0), v(1)).unwrap();
        let m = mesh.split_edge(border, 0.25).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_real_faces(), 3);
        assert!(mesh.is_boundary_vertex(m));
        let boundary = mesh.face_ids().find(|&f| mesh[f].is_boundary).unwrap();
        assert_eq!(mesh.face_degree(boundary), 5);
        assert_eq!(mesh[m].position, Point3f::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn test_split_rejects_quads() {
        let mut mesh = HalfEdgeMesh::from_indexed_faces(
            &[
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 2, 3]],
        )
        .unwrap();
        let e = mesh.find_edge(v(0), v(1)).unwrap();
        assert!(mesh.split_edge(e, 0.5).is_none());
        assert_eq!(mesh.num_vertices(), 4);
    }

    #[test]
    fn test_split_then_collapse() {
        let mut mesh = make_quad();
        let diagonal = mesh.find_edge(v(0), v(2)).unwrap();
        let m0 = mesh.split_edge(diagonal, 0.5).unwrap();
        let spoke = mesh.find_edge(m0, v(1)).unwrap();
        let m1 = mesh.split_edge(spoke, 0.5).unwrap();
        assert_eq!(mesh.num_vertices(), 6);
        assert!(mesh.is_valid());

        let e = mesh.find_edge(m0, m1).unwrap();
        let survivor = mesh.collapse_edge(e, 0.5).unwrap();
        assert_eq!(mesh.num_vertices(), 5);
        assert!(mesh.is_valid());
        assert!(survivor == m0 || survivor == m1);
        assert_eq!(mesh.num_real_faces(), 4);
    }

    #[test]
    fn test_collapse_boundary_edge_of_quad() {
        let mut mesh = make_quad();
        let border = mesh.find_edge(v(0), v(1)).unwrap();
        let survivor = mesh.collapse_edge(border, 0.0).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_real_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
        let boundary = mesh.face_ids().find(|&f| mesh[f].is_boundary).unwrap();
        assert_eq!(mesh.face_degree(boundary), 3);
        assert!(survivor == v(0) || survivor == v(1));
    }

    #[test]
    fn test_collapse_diagonal_violates_link_condition() {
        // both triangles have their two other edges on the boundary loop, so
        // the collapse would leave a dangling edge
        let mut mesh = make_quad();
        let diagonal = mesh.find_edge(v(0), v(2)).unwrap();
        let before = format!("{:?}", mesh);
        assert!(mesh.collapse_edge(diagonal, 0.5).is_none());
        assert_eq!(format!("{:?}", mesh), before);
    }

    #[test]
    fn test_collapse_tetrahedron_is_rejected() {
        let mut mesh = HalfEdgeMesh::from_indexed_faces(
            &[
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
                Point3f::new(0.5, 0.5, 1.0),
            ],
            &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap();
        let e = mesh.find_edge(v(0), v(1)).unwrap();
        assert!(mesh.collapse_edge(e, 0.5).is_none());
        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_onto_existing_edge_then_collapse_is_rejected() {
        let mut mesh = HalfEdgeMesh::from_indexed_faces(
            &[
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
                Point3f::new(0.5, 0.5, 1.0),
            ],
            &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap();
        let e = mesh.find_edge(v(0), v(1)).unwrap();
        let existing = mesh.find_edge(v(2), v(3)).unwrap();
        assert_eq!(mesh.flip_edge(e), Some(e));
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.find_edge(v(0), v(1)).is_none());
        assert_eq!(mesh.vertex_valence(v(0)), 2);

        // both edges between 2 and 3 would become self-loops
        let before = format!("{:?}", mesh);
        assert!(mesh.collapse_edge(e, 0.5).is_none());
        assert!(mesh.collapse_edge(existing, 0.5).is_none());
        assert_eq!(format!("{:?}", mesh), before);
    }

    #[test]
    fn test_removed_ids_are_reused() {
        let mut mesh = make_quad();
        let diagonal = mesh.find_edge(v(0), v(2)).unwrap();
        let m0 = mesh.split_edge(diagonal, 0.5).unwrap();
        let spoke = mesh.find_edge(m0, v(1)).unwrap();
        let m1 = mesh.split_edge(spoke, 0.5).unwrap();
        let e = mesh.find_edge(m0, m1).unwrap();
        let survivor = mesh.collapse_edge(e, 0.5).unwrap();
        let removed = if survivor == m0 { m1 } else { m0 };
        assert!(mesh.vertex(removed).is_none());

        let edge = mesh.find_edge(survivor, v(3)).unwrap();
        let fresh = mesh.split_edge(edge, 0.5).unwrap();
        assert_eq!(fresh, removed);
        assert!(mesh.is_valid());
    }
}

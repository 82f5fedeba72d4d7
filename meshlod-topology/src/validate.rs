//! Connectivity consistency checks

use crate::half_edge::HalfEdgeMesh;
use crate::ids::*;
use meshlod_core::{Error, Result};

impl HalfEdgeMesh {
    /// Whether every connectivity invariant holds.
    ///
    /// The first violated invariant is logged at `debug` level.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("half-edge mesh failed validation: {}", err);
                false
            }
        }
    }

    /// Check twin symmetry, face loops and all back-references.
    pub fn validate(&self) -> Result<()> {
        for (i, he) in self.halfedges.iter() {
            let h = HalfEdgeId::new(i);
            let twin = self
                .halfedge(he.twin)
                .ok_or_else(|| invalid(format!("{} has no live twin", h)))?;
            if he.twin == h || twin.twin != h {
                return Err(invalid(format!("{} and {} are not mutual twins", h, he.twin)));
            }
            if twin.edge != he.edge {
                return Err(invalid(format!("{} and its twin reference different edges", h)));
            }
            let edge = self
                .edge(he.edge)
                .ok_or_else(|| invalid(format!("{} references removed {}", h, he.edge)))?;
            if edge.halfedge != h && edge.halfedge != he.twin {
                return Err(invalid(format!("{} does not reference {}", he.edge, h)));
            }
            if self.vertex(he.vertex).is_none() {
                return Err(invalid(format!("{} references removed {}", h, he.vertex)));
            }
            if he.vertex == twin.vertex {
                return Err(invalid(format!("{} starts and ends at {}", h, he.vertex)));
            }

            if !he.face.is_valid() {
                continue;
            }
            if self.face(he.face).is_none() {
                return Err(invalid(format!("{} references removed {}", h, he.face)));
            }
            let next = self
                .halfedge(he.next)
                .ok_or_else(|| invalid(format!("{} has no live next", h)))?;
            if next.face != he.face {
                return Err(invalid(format!("{} and its next lie in different faces", h)));
            }
            if next.vertex != twin.vertex {
                return Err(invalid(format!("{} does not end where its next starts", h)));
            }
        }

        for (i, face) in self.faces.iter() {
            let f = FaceId::new(i);
            let mut cur = face.halfedge;
            let mut steps = 0;
            loop {
                let he = self
                    .halfedge(cur)
                    .ok_or_else(|| invalid(format!("loop of {} reaches removed {}", f, cur)))?;
                if he.face != f {
                    return Err(invalid(format!("{} in loop of {} belongs to {}", cur, f, he.face)));
                }
                steps += 1;
                cur = he.next;
                if cur == face.halfedge {
                    break;
                }
                if steps > self.halfedges.len() {
                    return Err(invalid(format!("loop of {} does not close", f)));
                }
            }
            if steps < 3 {
                return Err(invalid(format!("{} has only {} sides", f, steps)));
            }
        }

        for (i, vertex) in self.vertices.iter() {
            let v = VertexId::new(i);
            if !vertex.halfedge.is_valid() {
                continue;
            }
            match self.halfedge(vertex.halfedge) {
                Some(he) if he.vertex == v => {}
                _ => {
                    return Err(invalid(format!(
                        "{} has representative {} that does not start at it",
                        v, vertex.halfedge
                    )))
                }
            }
        }

        for (i, edge) in self.edges.iter() {
            let e = EdgeId::new(i);
            match self.halfedge(edge.halfedge) {
                Some(he) if he.edge == e => {}
                _ => return Err(invalid(format!("{} has a stale half-edge", e))),
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidData(message)
}

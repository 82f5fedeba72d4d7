//! Half-edge mesh topology for meshlod
//!
//! This crate provides [`HalfEdgeMesh`], a half-edge connectivity structure
//! whose vertices, edges, half-edges and faces live in pooled arenas with
//! reusable ids. It supports:
//! - Primitive mutators (`add_vertex`, `add_edge`, `add_face`, `remove_*`)
//! - Local edits that keep the mesh manifold (`flip_edge`, `split_edge`,
//!   `collapse_edge`)
//! - Conversion from and to [`meshlod_core::IndexedMesh`]
//!
//! ```
//! use meshlod_core::Point3f;
//! use meshlod_topology::{HalfEdgeMesh, ReconstructionStrategy, VertexId};
//!
//! let vertices = [
//!     Point3f::new(0.0, 0.0, 0.0),
//!     Point3f::new(1.0, 0.0, 0.0),
//!     Point3f::new(1.0, 1.0, 0.0),
//!     Point3f::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let diagonal = mesh.find_edge(VertexId::new(0), VertexId::new(2)).unwrap();
//! let center = mesh.split_edge(diagonal, 0.5).unwrap();
//! assert_eq!(mesh.vertex_valence(center), 4);
//! assert!(mesh.is_valid());
//!
//! let out = mesh.to_indexed_mesh(ReconstructionStrategy::TopologyFirst);
//! assert_eq!(out.polygon_count(), 4);
//! ```

pub mod convert;
pub mod edit;
pub mod half_edge;
pub mod ids;
pub mod pool;
pub mod validate;

pub use convert::*;
pub use half_edge::*;
pub use ids::*;
pub use pool::Pool;

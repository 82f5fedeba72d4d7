//! # meshlod
//!
//! Mesh topology editing and progressive-mesh level-of-detail generation for Rust.
//!
//! This is the umbrella crate that provides convenient access to all meshlod functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Indexed meshes, vertex attributes and the shared error type
//! - **Topology**: Half-edge meshes with edge flip, split and collapse
//! - **Simplification**: Progressive-mesh collapse ordering and LOD generation
//!
//! ## Quick Start
//!
//! ```rust
//! use meshlod::prelude::*;
//!
//! let mesh = IndexedMesh::from_triangles(
//!     vec![
//!         Point3f::new(0.0, 0.0, 0.0),
//!         Point3f::new(1.0, 0.0, 0.0),
//!         Point3f::new(1.0, 1.0, 0.0),
//!         Point3f::new(0.0, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//!
//! // Edit the topology
//! let mut hem = HalfEdgeMesh::from_mesh(&mesh).unwrap();
//! let diagonal = hem.find_edge(VertexId::new(0), VertexId::new(2)).unwrap();
//! hem.split_edge(diagonal, 0.5).unwrap();
//! assert_eq!(hem.num_real_faces(), 4);
//!
//! // Generate a level of detail
//! let pm = ProgressiveMesh::from_mesh(&mesh).unwrap();
//! let lod = pm.generate_lod_mesh(LodTarget::Faces(1), Some(&mesh));
//! assert!(lod.polygon_count() <= 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables topology and simplification
//! - `topology`: Half-edge mesh editing
//! - `simplification`: Progressive-mesh LOD generation
//! - `all`: Enables all features

// Re-export core functionality
pub use meshlod_core::*;

// Re-export sub-crates
#[cfg(feature = "topology")]
pub use meshlod_topology as topology;

#[cfg(feature = "simplification")]
pub use meshlod_simplification as simplification;

/// Convenient imports for common use cases
pub mod prelude {
    pub use meshlod_core::*;

    #[cfg(feature = "topology")]
    pub use meshlod_topology::{
        mesh_from_half_edge_mesh, EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, ReconstructionStrategy,
        VertexId,
    };

    #[cfg(feature = "simplification")]
    pub use meshlod_simplification::{
        CollapseOperations, LodTarget, MeshSimplifier, ProgressiveMesh, ProgressiveMeshSimplifier,
    };
}

//! Core data structures and traits for meshlod
//!
//! This crate provides the indexed-mesh interchange type shared by the
//! half-edge topology and progressive-mesh simplification crates, together
//! with point aliases, per-vertex attribute sets and the common error type.

pub mod error;
pub mod mesh;
pub mod point;
pub mod traits;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

// Type aliases for easier imports
pub type Point = Point3f;
pub type Mesh = IndexedMesh;

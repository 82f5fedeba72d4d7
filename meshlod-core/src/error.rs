//! Error types for meshlod

use thiserror::Error;

/// Main error type for meshlod operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Polygon {polygon} references vertex {index}, but the mesh has {vertex_count} vertices")]
    InvalidIndex {
        polygon: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("Polygon {polygon} is degenerate (repeated vertex index)")]
    DegenerateFace { polygon: usize },

    #[error("Polygon {polygon} has {len} corners, expected a triangle")]
    NonTriangle { polygon: usize, len: usize },

    #[error("Non-manifold topology: {0}")]
    NonManifold(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for meshlod operations
pub type Result<T> = std::result::Result<T, Error>;
